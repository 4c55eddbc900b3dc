//! voterdb-search
//!
//! Ward-scoped voter search: tiered fuzzy name matching, EPIC and booth
//! lookups. Queries are described as [`plan::SelectPlan`]s built from typed
//! expressions and run by any [`store::VoterStore`].
pub mod expr;
pub mod like;
pub mod lookup;
pub mod params;
pub mod plan;
pub mod query;
pub mod rank;
pub mod search;
pub mod similarity;
pub mod store;
pub mod tier;

pub use search::FuzzyVoterSearch;
pub use store::{memory::MemoryStore, VoterStore};
pub use tier::{Capabilities, Tier};
