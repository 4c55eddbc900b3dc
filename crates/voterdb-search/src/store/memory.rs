//! In-memory [`VoterStore`] that evaluates plans with the same expression
//! semantics the Postgres renderer emits. Backs tests and offline use of the
//! CLI (`--data roll.json`).

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use voterdb_core::error::{Error, Result};
use voterdb_core::types::{PollingStation, ScoredCandidate, VoterRecord, Ward};

use crate::expr::{EvalContext, Field, Row};
use crate::params::ParamKey;
use crate::plan::SelectPlan;
use crate::rank;
use crate::similarity::DEFAULT_THRESHOLD;
use crate::store::VoterStore;

/// One row of the part-number table: which ward a booth belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRow {
    pub part_no: String,
    pub ward_no: Ward,
    #[serde(default)]
    pub booth_name: Option<String>,
    #[serde(default)]
    pub english_booth_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub parts: Vec<PartRow>,
    #[serde(default)]
    pub voters: Vec<VoterRecord>,
}

pub struct MemoryStore {
    voters: Vec<VoterRecord>,
    parts: HashMap<String, Vec<PartRow>>,
    trigram: bool,
    similarity_threshold: f64,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        let mut parts: HashMap<String, Vec<PartRow>> = HashMap::new();
        for part in dataset.parts {
            parts.entry(part.part_no.clone()).or_default().push(part);
        }
        Self { voters: dataset.voters, parts, trigram: true, similarity_threshold: DEFAULT_THRESHOLD }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let dataset: Dataset = serde_json::from_str(json).context("parsing voter dataset")?;
        Ok(Self::new(dataset))
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Behaves like a database without the pg_trgm extension.
    pub fn without_trigram(mut self) -> Self {
        self.trigram = false;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    fn evaluate(&self, plan: &SelectPlan) -> Result<Vec<ScoredCandidate>> {
        if plan.uses_similarity() && !self.trigram {
            return Err(Error::Query("function similarity(text, text) does not exist".to_string()));
        }
        let ward = plan.params.get(ParamKey::Ward).ok().and_then(|w| w.parse::<Ward>().ok());
        let cx = EvalContext { params: &plan.params, similarity_threshold: self.similarity_threshold };

        let mut out = Vec::new();
        for record in &self.voters {
            let row = VoterRow { record, parts: self.parts.get(record.part_no.as_deref().unwrap_or_default()) };
            if !plan.filter.eval(&row, &cx)? {
                continue;
            }
            let match_score = match &plan.score {
                Some(score) => score.eval(&row, &cx)?,
                None => 0.0,
            };
            let words_matched = match &plan.words_matched {
                Some(count) => as_count(count.eval(&row, &cx)?),
                None => 0,
            };
            let mut record = record.clone();
            record.ward_no = ward.or(record.ward_no);
            out.push(ScoredCandidate { record, match_score, words_matched });
        }
        out.sort_by(|a, b| rank::compare(&plan.order, a, b));
        out.truncate(plan.limit);
        Ok(out)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

struct VoterRow<'a> {
    record: &'a VoterRecord,
    parts: Option<&'a Vec<PartRow>>,
}

impl Row for VoterRow<'_> {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::FullName => Some(self.record.full_name.as_str()),
            Field::RelationName => self.record.relation_name.as_deref(),
            Field::EpicNumber => Some(self.record.epic_number.as_str()),
            Field::PartNo => self.record.part_no.as_deref(),
            Field::HouseNumber => self.record.house_number.as_deref(),
        }
    }

    fn in_ward(&self, ward: &str) -> bool {
        self.parts
            .is_some_and(|parts| parts.iter().any(|p| p.ward_no.to_string() == ward))
    }
}

impl VoterStore for MemoryStore {
    async fn has_trigram_support(&self) -> Result<bool> {
        Ok(self.trigram)
    }

    async fn fetch(&self, plan: &SelectPlan) -> Result<Vec<ScoredCandidate>> {
        self.evaluate(plan)
    }

    async fn polling_station(&self, part_no: &str) -> Result<Option<PollingStation>> {
        Ok(self.parts.get(part_no).and_then(|parts| parts.first()).map(|p| PollingStation {
            booth_name: p.booth_name.clone(),
            english_booth_address: p.english_booth_address.clone(),
        }))
    }
}
