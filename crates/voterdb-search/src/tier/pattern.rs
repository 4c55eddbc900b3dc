//! Pattern tier: weighted ILIKE hits, for datastores without pg_trgm.

use voterdb_core::config::{PatternWeights, SearchSettings};

use crate::expr::{Field, Predicate, Score};
use crate::params::ParamKey;
use crate::plan::{OrderTerm, SelectPlan};
use crate::query::SearchQuery;

pub const ORDER: [OrderTerm; 2] = [OrderTerm::ScoreDesc, OrderTerm::FullNameAsc];

pub fn plan(query: &SearchQuery, settings: &SearchSettings) -> SelectPlan {
    let n = query.word_count();
    let mut keys = vec![ParamKey::ExactPattern, ParamKey::FirstWordPattern];
    keys.extend((0..n).map(ParamKey::WordPattern));
    let filter = Predicate::any(keys.into_iter().flat_map(|key| Field::NAMES.map(|f| Predicate::ILike(f, key))));

    SelectPlan::in_ward("pattern", query.params(), filter).scored(score(n, &settings.pattern_weights))
}

fn score(n: usize, w: &PatternWeights) -> Score {
    let hit = |field, key, weight| Score::when(Predicate::ILike(field, key), weight);
    let mut parts = vec![
        hit(Field::FullName, ParamKey::ExactPattern, w.whole_full_name),
        hit(Field::FullName, ParamKey::FirstWordPattern, w.first_word_full_name),
        hit(Field::RelationName, ParamKey::ExactPattern, w.whole_relation_name),
        hit(Field::RelationName, ParamKey::FirstWordPattern, w.first_word_relation_name),
    ];
    for i in 0..n {
        #[allow(clippy::cast_precision_loss)]
        let decay = i as f64 * w.word_decay;
        parts.push(hit(Field::FullName, ParamKey::WordPattern(i), (w.word_full_name - decay).max(0.0)));
        parts.push(hit(Field::RelationName, ParamKey::WordPattern(i), (w.word_relation_name - decay).max(0.0)));
    }
    Score::Sum(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voterdb_core::types::Ward;

    #[test]
    fn pattern_plan_never_needs_similarity() {
        let query = SearchQuery::new("Ram Kumar Patil", Ward(146)).unwrap();
        let plan = plan(&query, &SearchSettings::default());
        assert!(!plan.uses_similarity());

        let rendered = plan.to_sql().unwrap();
        assert!(rendered.sql.contains("CASE WHEN v.full_name ILIKE $1 THEN 10 ELSE 0 END"));
        assert!(rendered.sql.contains("CASE WHEN v.relation_name ILIKE $2 THEN 6 ELSE 0 END"));
        // exact, first word, 3 word patterns, ward
        assert_eq!(rendered.binds.len(), 6);
    }

    #[test]
    fn later_words_weigh_less() {
        let Score::Sum(parts) = score(2, &PatternWeights::default()) else { panic!("expected a sum") };
        let weights: Vec<f64> = parts
            .iter()
            .map(|s| match s {
                Score::When(_, weight) => *weight,
                other => panic!("unexpected part {:?}", other),
            })
            .collect();
        assert_eq!(weights, vec![10.0, 8.0, 7.0, 6.0, 5.0, 4.0, 4.0, 3.0]);
    }
}
