//! Last-resort tier: plain case-insensitive containment of the whole query.

use crate::expr::Predicate;
use crate::params::ParamKey;
use crate::plan::{OrderTerm, SelectPlan};
use crate::query::SearchQuery;

pub const ORDER: [OrderTerm; 1] = [OrderTerm::FullNameAsc];

pub fn plan(query: &SearchQuery) -> SelectPlan {
    SelectPlan::in_ward(
        "substring",
        query.params(),
        Predicate::either_name(|f| Predicate::ILike(f, ParamKey::ExactPattern)),
    )
}
