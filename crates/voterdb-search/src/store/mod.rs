//! The datastore seam.

pub mod memory;

use std::future::Future;

use voterdb_core::error::Result;
use voterdb_core::types::{PollingStation, ScoredCandidate};

use crate::plan::SelectPlan;

/// A read-only source of voter rows.
///
/// Errors must be classified: [`voterdb_core::error::Error::Connection`] when
/// the datastore cannot be reached at all, [`voterdb_core::error::Error::Query`]
/// when a single statement failed. Searches recover from the latter only.
pub trait VoterStore: Send + Sync {
    /// Whether `%` and `similarity()` are available.
    fn has_trigram_support(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Runs `plan`, returning at most `plan.limit` rows ordered by `plan.order`.
    fn fetch(&self, plan: &SelectPlan) -> impl Future<Output = Result<Vec<ScoredCandidate>>> + Send;

    fn polling_station(&self, part_no: &str) -> impl Future<Output = Result<Option<PollingStation>>> + Send;
}
