//! The three name-search strategies, in order of decreasing sophistication.

pub mod pattern;
pub mod substring;
pub mod trigram;

use std::fmt;

use voterdb_core::config::SearchSettings;
use voterdb_core::types::{ScoredCandidate, VoterRecord};

use crate::plan::{OrderTerm, SelectPlan};
use crate::query::SearchQuery;
use crate::rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Trigram,
    Pattern,
    Substring,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Trigram, Tier::Pattern, Tier::Substring];

    /// Whether the datastore can run this tier. The pattern tier only stands
    /// in for a missing trigram extension; a failing trigram query falls
    /// through to the substring tier.
    pub fn applies(self, caps: Capabilities) -> bool {
        match self {
            Tier::Trigram => caps.trigram == Some(true),
            Tier::Pattern => caps.trigram == Some(false),
            Tier::Substring => true,
        }
    }

    pub fn plan(self, query: &SearchQuery, settings: &SearchSettings) -> SelectPlan {
        let plan = match self {
            Tier::Trigram => trigram::plan(query, settings),
            Tier::Pattern => pattern::plan(query, settings),
            Tier::Substring => substring::plan(query),
        };
        plan.ordered(self.order()).limit(settings.limit)
    }

    pub fn order(self) -> &'static [OrderTerm] {
        match self {
            Tier::Trigram => &trigram::ORDER,
            Tier::Pattern => &pattern::ORDER,
            Tier::Substring => &substring::ORDER,
        }
    }

    /// Applies the tier's score cut-off and the shared ranking to fetched
    /// rows. Admission is the plan's filter alone: a row let in by whole-name
    /// similarity stays even when fewer words hit it than the word floor.
    pub fn finalize(self, settings: &SearchSettings, candidates: Vec<ScoredCandidate>) -> Vec<VoterRecord> {
        match self {
            Tier::Trigram => {
                rank::finalize(candidates, self.order(), |c| c.match_score >= settings.min_score, settings.limit)
            }
            Tier::Pattern => rank::finalize(candidates, self.order(), |c| c.match_score > 0.0, settings.limit),
            Tier::Substring => rank::finalize(candidates, self.order(), |_| true, settings.limit),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Trigram => "trigram",
            Tier::Pattern => "pattern",
            Tier::Substring => "substring",
        })
    }
}

/// What the datastore supports. `trigram` is `None` when detection itself
/// failed, which leaves only the substring tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub trigram: Option<bool>,
}

impl Capabilities {
    pub fn with_trigram(available: bool) -> Self {
        Self { trigram: Some(available) }
    }

    pub fn unknown() -> Self {
        Self { trigram: None }
    }
}
