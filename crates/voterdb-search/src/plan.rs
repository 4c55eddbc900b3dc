//! A backend-neutral description of one ward-scoped candidate query.

use voterdb_core::error::Result;

use crate::expr::{Predicate, RenderedSql, Score, SqlWriter};
use crate::params::{ParamKey, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTerm {
    WordsMatchedDesc,
    ScoreDesc,
    FullNameAsc,
    /// Serial numbers are text; shorter sorts first so "9" precedes "10".
    SerialAsc,
}

// Text columns are ordered with the "C" collation: byte order, the same as
// `str::cmp` in `rank::compare`, whatever the server's default collation.
fn order_sql(term: OrderTerm) -> &'static str {
    match term {
        OrderTerm::WordsMatchedDesc => "words_matched DESC",
        OrderTerm::ScoreDesc => "match_score DESC",
        OrderTerm::FullNameAsc => "COALESCE(v.full_name::text, '') COLLATE \"C\" ASC",
        OrderTerm::SerialAsc => "LENGTH(v.sr_no::text) ASC, v.sr_no::text COLLATE \"C\" ASC",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub label: &'static str,
    pub filter: Predicate,
    pub score: Option<Score>,
    pub words_matched: Option<Score>,
    pub order: Vec<OrderTerm>,
    pub limit: usize,
    pub params: Params,
}

const SELECT_COLUMNS: &str = "COALESCE(v.epic_number::text, '') AS epic_number, \
COALESCE(v.full_name::text, '') AS full_name, \
v.relation_name::text AS relation_name, \
v.relation_type::text AS relation_type, \
v.age::text AS age, \
v.gender::text AS gender, \
v.part_no::text AS part_no, \
v.sr_no::text AS sr_no, \
v.address::text AS address, \
v.house_number::text AS house_number, \
v.pincode::text AS pincode, \
v.ac_no::text AS ac_no";

impl SelectPlan {
    /// Restricts `filter` to rows of the ward bound to [`ParamKey::Ward`].
    pub fn in_ward(label: &'static str, params: Params, filter: Predicate) -> Self {
        Self {
            label,
            filter: Predicate::all([Predicate::InWard(ParamKey::Ward), filter]),
            score: None,
            words_matched: None,
            order: Vec::new(),
            limit: 50,
            params,
        }
    }

    pub fn scored(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    pub fn counting(mut self, words_matched: Score) -> Self {
        self.words_matched = Some(words_matched);
        self
    }

    pub fn ordered(mut self, order: &[OrderTerm]) -> Self {
        self.order = order.to_vec();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn uses_similarity(&self) -> bool {
        self.filter.uses_similarity()
            || self.score.as_ref().is_some_and(Score::uses_similarity)
            || self.words_matched.as_ref().is_some_and(Score::uses_similarity)
    }

    pub fn to_sql(&self) -> Result<RenderedSql> {
        let mut w = SqlWriter::new(&self.params);
        w.push("SELECT ");
        w.push(SELECT_COLUMNS);
        w.push(", (");
        self.score.as_ref().unwrap_or(&Score::Const(0.0)).render(&mut w)?;
        w.push(")::float8 AS match_score, (");
        self.words_matched.as_ref().unwrap_or(&Score::Const(0.0)).render(&mut w)?;
        w.push(")::int8 AS words_matched FROM public.\"Voter\" v WHERE ");
        self.filter.render(&mut w)?;
        if !self.order.is_empty() {
            w.push(" ORDER BY ");
            let terms: Vec<&str> = self.order.iter().copied().map(order_sql).collect();
            w.push(&terms.join(", "));
        }
        w.push(" LIMIT ");
        w.push(&self.limit.to_string());
        Ok(w.finish())
    }
}
