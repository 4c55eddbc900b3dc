use voterdb_core::types::Ward;

use crate::like::contains_pattern;
use crate::params::{ParamKey, Params};

/// A name query scoped to one ward.
///
/// `words` keeps whitespace-separated tokens longer than one character, in
/// the order typed. Single letters (initials) carry too little signal to
/// match on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_text: String,
    pub ward: Ward,
    pub words: Vec<String>,
}

impl SearchQuery {
    /// Returns `None` when nothing is left after trimming.
    pub fn new(raw: &str, ward: Ward) -> Option<Self> {
        let raw_text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if raw_text.is_empty() {
            return None;
        }
        let words = tokenize(&raw_text);
        Some(Self { raw_text, ward, words })
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The parameters every name tier can refer to.
    pub fn params(&self) -> Params {
        let mut params = Params::new()
            .with(ParamKey::SearchText, self.raw_text.clone())
            .with(ParamKey::ExactPattern, contains_pattern(&self.raw_text))
            .with(ParamKey::Ward, self.ward.to_string());
        let first = self.words.first().unwrap_or(&self.raw_text);
        params.insert(ParamKey::FirstWordPattern, contains_pattern(first));
        for (i, word) in self.words.iter().enumerate() {
            params.insert(ParamKey::Word(i), word.clone());
            params.insert(ParamKey::WordPattern(i), contains_pattern(word));
        }
        params
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .map(str::to_string)
        .collect()
}
