//! Named query parameters.
//!
//! Expressions refer to values by role instead of by position. Positions are
//! assigned only when a plan is rendered to SQL, so the number of query words
//! never leaks into placeholder arithmetic.

use std::collections::BTreeMap;
use std::fmt;

use voterdb_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    /// The trimmed query, compared whole by trigram similarity.
    SearchText,
    /// `%query%`
    ExactPattern,
    /// `%first word%`
    FirstWordPattern,
    Word(usize),
    WordPattern(usize),
    Ward,
    Epic,
    Part,
    /// `%house number%`
    HousePattern,
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::SearchText => write!(f, "searchText"),
            ParamKey::ExactPattern => write!(f, "exactPattern"),
            ParamKey::FirstWordPattern => write!(f, "firstWordPattern"),
            ParamKey::Word(i) => write!(f, "word[{}]", i),
            ParamKey::WordPattern(i) => write!(f, "wordPattern[{}]", i),
            ParamKey::Ward => write!(f, "ward"),
            ParamKey::Epic => write!(f, "epic"),
            ParamKey::Part => write!(f, "part"),
            ParamKey::HousePattern => write!(f, "housePattern"),
        }
    }
}

/// All values are bound as text; the SQL side casts where it compares
/// against non-text columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<ParamKey, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ParamKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: ParamKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: ParamKey) -> Result<&str> {
        self.values
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| Error::UnboundParameter(key.to_string()))
    }
}
