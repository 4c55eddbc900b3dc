//! Ward validation and named ward sets.
//!
//! A deployment serves either a single ward or a group of wards. Callers
//! resolve the group by name (`?wardSet=165`, `ward-170`, `all`, ...) and
//! must validate every ward a user picks before searching.

use std::collections::BTreeMap;

use crate::config::WardSettings;
use crate::error::{Error, Result};
use crate::types::Ward;

#[derive(Debug, Clone)]
pub struct WardRegistry {
    valid: Vec<Ward>,
    sets: BTreeMap<String, Vec<Ward>>,
}

impl WardRegistry {
    pub fn new(settings: &WardSettings) -> Self {
        let mut valid: Vec<Ward> = settings.valid.iter().copied().map(Ward).collect();
        valid.sort_unstable();
        valid.dedup();
        let sets = settings
            .sets
            .iter()
            .map(|(name, wards)| (canonical_set_name(name), wards.iter().copied().map(Ward).collect()))
            .collect();
        Self { valid, sets }
    }

    pub fn valid_wards(&self) -> &[Ward] {
        &self.valid
    }

    pub fn is_valid(&self, ward: Ward) -> bool {
        self.valid.binary_search(&ward).is_ok()
    }

    /// Parses and validates user input such as `"146"`.
    pub fn validate(&self, input: &str) -> Result<Ward> {
        let ward: Ward = input.parse()?;
        if self.is_valid(ward) {
            Ok(ward)
        } else {
            Err(Error::InvalidWard(ward.to_string()))
        }
    }

    /// Resolves a ward-set identifier. Accepts `165`, `ward165`, `ward-165`
    /// and the aliases `all`, `voters`, `multi` for the `multiple` set.
    pub fn resolve_set(&self, name: &str) -> Option<&[Ward]> {
        self.sets.get(&canonical_set_name(name)).map(Vec::as_slice)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

fn canonical_set_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("ward-")
        .or_else(|| lowered.strip_prefix("ward"))
        .unwrap_or(&lowered);
    match stripped {
        "all" | "voters" | "multi" => "multiple".to_string(),
        other => other.to_string(),
    }
}
