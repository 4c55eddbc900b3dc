//! Domain types shared by the search engine, the datastores and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type EpicNumber = String;

/// An administrative ward. Searches are always scoped to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ward(pub u32);

impl fmt::Display for Ward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ward {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Ward)
            .map_err(|_| Error::InvalidWard(s.trim().to_string()))
    }
}

/// One row of the electoral roll.
///
/// - `epic_number`: voter-ID issued by the electoral authority, unique
/// - `relation_name`: spouse/parent name, searched alongside `full_name`
/// - `ward_no`: the ward the row was looked up in (rows carry a part number,
///   the ward comes from the part-to-ward mapping)
/// - `part_no`/`sr_no`: booth and serial number inside the booth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub epic_number: EpicNumber,
    pub full_name: String,
    #[serde(default)]
    pub relation_name: Option<String>,
    #[serde(default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ward_no: Option<Ward>,
    #[serde(default)]
    pub part_no: Option<String>,
    #[serde(default)]
    pub sr_no: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub ac_no: Option<String>,
}

/// A record paired with its ranking signals. Only the ranking code sees
/// these; search results are plain `VoterRecord`s.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub record: VoterRecord,
    pub match_score: f64,
    pub words_matched: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Name,
    Epic,
    Booth,
    House,
}

impl FromStr for SearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "name" => Ok(SearchMethod::Name),
            "2" | "epic" => Ok(SearchMethod::Epic),
            "3" | "booth" | "part" => Ok(SearchMethod::Booth),
            "4" | "house" => Ok(SearchMethod::House),
            other => Err(Error::InvalidSearchMethod(other.to_string())),
        }
    }
}

/// What a caller (HTTP route, chat bot, CLI) asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub method: SearchMethod,
    pub query: String,
    pub ward: Ward,
}

/// Polling booth metadata from the part-number table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingStation {
    pub booth_name: Option<String>,
    pub english_booth_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoterDetails {
    pub record: VoterRecord,
    pub ward: Ward,
    pub polling_station: String,
    pub polling_address: String,
}

impl VoterDetails {
    pub fn resolve(record: VoterRecord, ward: Ward, station: Option<PollingStation>) -> Self {
        let station = station.unwrap_or_default();
        let booth_name = non_blank(station.booth_name.as_deref());
        let polling_station = booth_name.clone().unwrap_or_else(|| {
            format!("Part {}", record.part_no.as_deref().unwrap_or("-"))
        });
        let polling_address = non_blank(station.english_booth_address.as_deref())
            .or(booth_name)
            .or_else(|| non_blank(record.address.as_deref()))
            .unwrap_or_else(|| "Address not available".to_string());
        Self { record, ward, polling_station, polling_address }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Roll exports store age as free text; anything that is not a plausible
/// number becomes `None`.
pub fn parse_age(raw: Option<&str>) -> Option<u16> {
    raw.and_then(|s| s.trim().parse::<u16>().ok()).filter(|age| *age > 0)
}
