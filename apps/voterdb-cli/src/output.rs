//! Presenters: the JSON bodies the web front end consumes, the numbered chat
//! list, a plain table and the text voter slip.

use serde::Serialize;

use voterdb_core::error::Error;
use voterdb_core::types::{VoterDetails, VoterRecord, Ward};

use crate::cli::Lang;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// 1-based position, used by callers to pick a result.
    pub id: usize,
    pub name: String,
    pub age: Option<u16>,
    pub epic: String,
    /// Booth (part number); the front end labels it as the ward column.
    pub ward: Option<String>,
    pub sr_no: Option<String>,
    pub address: Option<String>,
    pub house_number: Option<String>,
    pub gender: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub matches: Vec<Match>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(records: &[VoterRecord]) -> Self {
        let matches: Vec<Match> = records
            .iter()
            .enumerate()
            .map(|(i, r)| Match {
                id: i + 1,
                name: r.full_name.clone(),
                age: r.age,
                epic: r.epic_number.clone(),
                ward: r.part_no.clone(),
                sr_no: r.sr_no.clone(),
                address: present(r.address.as_ref()),
                house_number: present(r.house_number.as_ref()),
                gender: present(r.gender.as_ref()),
                pincode: present(r.pincode.as_ref()),
            })
            .collect();
        Self { success: true, count: matches.len(), matches }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterBody {
    pub epic: String,
    pub name: String,
    pub age: Option<u16>,
    pub ward: Ward,
    #[serde(rename = "sr_no")]
    pub sr_no: Option<String>,
    pub part_booth: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "house_number")]
    pub house_number: Option<String>,
    pub pincode: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "ac_no")]
    pub ac_no: Option<String>,
    #[serde(rename = "relation_name")]
    pub relation_name: Option<String>,
    #[serde(rename = "relation_type")]
    pub relation_type: Option<String>,
    pub polling_station: String,
    pub polling_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailsResponse {
    pub success: bool,
    pub voter: VoterBody,
}

impl DetailsResponse {
    pub fn new(details: &VoterDetails) -> Self {
        let r = &details.record;
        let voter = VoterBody {
            epic: r.epic_number.clone(),
            name: r.full_name.clone(),
            age: r.age,
            ward: details.ward,
            sr_no: present(r.sr_no.as_ref()),
            part_booth: r.part_no.clone(),
            address: present(r.address.as_ref()),
            house_number: present(r.house_number.as_ref()),
            pincode: present(r.pincode.as_ref()),
            gender: present(r.gender.as_ref()),
            ac_no: present(r.ac_no.as_ref()),
            relation_name: present(r.relation_name.as_ref()),
            relation_type: present(r.relation_type.as_ref()),
            polling_station: details.polling_station.clone(),
            polling_address: details.polling_address.clone(),
        };
        Self { success: true, voter }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(err: &anyhow::Error) -> Self {
        let error = match err.downcast_ref::<Error>() {
            Some(Error::InvalidWard(_)) => "Invalid ward number",
            Some(Error::InvalidSearchMethod(_)) => "Invalid search method",
            Some(Error::NotFound(_)) => "Voter not found",
            Some(Error::InvalidConfig(_)) => "Invalid configuration",
            _ => "Internal server error",
        };
        Self { error: error.to_string(), message: format!("{err:#}") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WardsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    pub wards: Vec<Ward>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<String>,
}

fn present(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

struct Labels {
    age: &'static str,
    gender: &'static str,
    footer: &'static str,
}

fn labels(lang: Lang) -> Labels {
    match lang {
        Lang::En => Labels { age: "Age", gender: "Gender", footer: "Reply with the number to select" },
        Lang::Hi => Labels { age: "आयु", gender: "लिंग", footer: "क्रमांक उत्तर के रूप में भेजें" },
        Lang::Mr => Labels { age: "वय", gender: "लिंग", footer: "क्रमांक उत्तर म्हणून पाठवा" },
    }
}

fn header(lang: Lang, ward: Ward) -> String {
    match lang {
        Lang::En => format!("Voters found in Ward {ward}"),
        Lang::Hi => format!("वार्ड {ward} में पाए गए मतदाता"),
        Lang::Mr => format!("प्रभाग {ward} मध्ये आढळलेले मतदार"),
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

/// Numbered top-`top` list for chat replies.
pub fn chat_list(records: &[VoterRecord], ward: Ward, lang: Lang, top: usize) -> String {
    let l = labels(lang);
    let mut lines = vec![header(lang, ward), String::new()];
    for (i, r) in records.iter().take(top).enumerate() {
        lines.push(format!(
            "{}. {} | {}: {} | {}: {}",
            i + 1,
            r.full_name,
            l.age,
            or_na(r.age.map(|a| a.to_string())),
            l.gender,
            or_na(present(r.gender.as_ref())),
        ));
    }
    lines.push(String::new());
    lines.push(l.footer.to_string());
    lines.join("\n")
}

pub fn table(records: &[VoterRecord]) -> String {
    let name_width = records
        .iter()
        .map(|r| r.full_name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let mut out = format!("{:<3} {:<12} {:<name_width$} {:>3} {:<6} {:>5} {:>5}\n", "#", "EPIC", "NAME", "AGE", "GENDER", "PART", "SR");
    for (i, r) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:<3} {:<12} {:<name_width$} {:>3} {:<6} {:>5} {:>5}\n",
            i + 1,
            r.epic_number,
            r.full_name,
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            r.gender.as_deref().unwrap_or(""),
            r.part_no.as_deref().unwrap_or(""),
            r.sr_no.as_deref().unwrap_or(""),
        ));
    }
    out.push_str(&format!("{} match(es)", records.len()));
    out
}

/// Plain-text voter slip.
pub fn slip(details: &VoterDetails) -> String {
    let r = &details.record;
    let na = |v: Option<&String>| v.cloned().unwrap_or_else(|| "N/A".to_string());
    [
        "VOTER SLIP".to_string(),
        String::new(),
        format!("Name: {}", r.full_name),
        format!("EPIC: {}", r.epic_number),
        format!("Ward: {}", details.ward),
        format!("Part/Booth: {}", na(r.part_no.as_ref())),
        format!("Sr. No: {}", na(r.sr_no.as_ref())),
        format!("Age: {}", or_na(r.age.map(|a| a.to_string()))),
        format!("Polling Station: {}", details.polling_station),
        format!("Address: {}", details.polling_address),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epic: &str, name: &str, age: Option<u16>) -> VoterRecord {
        VoterRecord {
            epic_number: epic.to_string(),
            full_name: name.to_string(),
            relation_name: None,
            relation_type: None,
            age,
            gender: Some("M".to_string()),
            ward_no: Some(Ward(146)),
            part_no: Some("163".to_string()),
            sr_no: Some("12".to_string()),
            address: Some("  ".to_string()),
            house_number: None,
            pincode: None,
            ac_no: None,
        }
    }

    #[test]
    fn search_body_numbers_matches_from_one() {
        let body = SearchResponse::new(&[record("A1", "Ram", Some(30)), record("A2", "Sita", None)]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert_eq!(json["matches"][0]["id"], 1);
        assert_eq!(json["matches"][1]["epic"], "A2");
        assert_eq!(json["matches"][1]["ward"], "163");
        assert!(json["matches"][1]["age"].is_null());
        // blank address is reported as null
        assert!(json["matches"][0]["address"].is_null());
    }

    #[test]
    fn details_body_uses_front_end_field_names() {
        let details = VoterDetails::resolve(record("A1", "Ram", Some(30)), Ward(146), None);
        let json = serde_json::to_value(DetailsResponse::new(&details)).unwrap();
        assert_eq!(json["voter"]["partBooth"], "163");
        assert_eq!(json["voter"]["pollingStation"], "Part 163");
        assert_eq!(json["voter"]["pollingAddress"], "Address not available");
        assert_eq!(json["voter"]["sr_no"], "12");
        assert_eq!(json["voter"]["ward"], 146);
    }

    #[test]
    fn errors_map_to_stable_labels() {
        let err = anyhow::Error::new(Error::InvalidWard("999".into()));
        assert_eq!(ErrorResponse::new(&err).error, "Invalid ward number");
        let err = anyhow::Error::new(Error::Connection("refused".into())).context("searching");
        let body = ErrorResponse::new(&err);
        assert_eq!(body.error, "Internal server error");
        assert!(body.message.contains("refused"));
    }

    #[test]
    fn chat_list_shows_top_entries_with_localized_labels() {
        let records: Vec<_> = (1..=7).map(|i| record(&format!("E{i}"), &format!("Voter {i}"), Some(20 + i))).collect();
        let text = chat_list(&records, Ward(146), Lang::En, 5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Voters found in Ward 146");
        assert_eq!(lines[2], "1. Voter 1 | Age: 21 | Gender: M");
        assert_eq!(lines[6], "5. Voter 5 | Age: 25 | Gender: M");
        assert_eq!(lines.last(), Some(&"Reply with the number to select"));

        let hindi = chat_list(&records[..1], Ward(146), Lang::Hi, 5);
        assert!(hindi.starts_with("वार्ड 146 में पाए गए मतदाता"));
        assert!(hindi.contains("आयु: 21 | लिंग: M"));

        let marathi = chat_list(&[record("E0", "Ram", None)], Ward(147), Lang::Mr, 5);
        assert!(marathi.contains("1. Ram | वय: N/A | लिंग: M"));
        assert!(marathi.ends_with("क्रमांक उत्तर म्हणून पाठवा"));
    }

    #[test]
    fn slip_lists_polling_station() {
        let details = VoterDetails::resolve(record("A1", "Ram", Some(30)), Ward(146), None);
        let text = slip(&details);
        assert!(text.starts_with("VOTER SLIP\n\nName: Ram"));
        assert!(text.contains("Polling Station: Part 163"));
    }
}
