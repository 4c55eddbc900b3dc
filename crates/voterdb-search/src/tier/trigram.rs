//! Trigram-similarity tier (needs pg_trgm).
//!
//! A record is a candidate when enough query words hit it, where a word hits
//! if it is trigram-similar to, or contained in, the full name or the
//! relation name. Word order does not matter: "Ram Kumar" finds
//! "Kumar Ram Patil". A misspelt whole name ("Anil Malik" for "Anil Mailk")
//! still gets in through whole-query similarity.

use voterdb_core::config::{SearchSettings, TrigramWeights};

use crate::expr::{Field, Predicate, Score};
use crate::params::ParamKey;
use crate::plan::{OrderTerm, SelectPlan};
use crate::query::SearchQuery;

pub const ORDER: [OrderTerm; 3] = [OrderTerm::WordsMatchedDesc, OrderTerm::ScoreDesc, OrderTerm::FullNameAsc];

/// Word-count fractions behind the partial-match bonuses.
const TWO_THIRDS: f64 = 0.67;
const HALF: f64 = 0.5;

pub fn plan(query: &SearchQuery, settings: &SearchSettings) -> SelectPlan {
    let n = query.word_count();
    SelectPlan::in_ward("trigram", query.params(), filter(n, settings))
        .scored(score(n, &settings.trigram_weights))
        .counting(words_matched(n))
}

/// Word hits that admit a multi-word candidate without a whole-name match.
pub fn word_floor(word_count: usize, settings: &SearchSettings) -> u32 {
    if word_count < 2 {
        return 0;
    }
    settings.word_floor.min(u32::try_from(word_count).unwrap_or(u32::MAX))
}

fn word_hit(i: usize) -> Predicate {
    Predicate::any([
        Predicate::Similar(Field::FullName, ParamKey::Word(i)),
        Predicate::Similar(Field::RelationName, ParamKey::Word(i)),
        Predicate::ILike(Field::FullName, ParamKey::WordPattern(i)),
        Predicate::ILike(Field::RelationName, ParamKey::WordPattern(i)),
    ])
}

pub fn words_matched(word_count: usize) -> Score {
    Score::count((0..word_count).map(word_hit))
}

fn filter(n: usize, settings: &SearchSettings) -> Predicate {
    let whole_query = [
        Predicate::Similar(Field::FullName, ParamKey::SearchText),
        Predicate::Similar(Field::RelationName, ParamKey::SearchText),
        Predicate::ILike(Field::FullName, ParamKey::ExactPattern),
        Predicate::ILike(Field::RelationName, ParamKey::ExactPattern),
    ];
    match n {
        0 => Predicate::any(whole_query),
        1 => Predicate::any(whole_query.into_iter().chain([
            Predicate::Similar(Field::FullName, ParamKey::Word(0)),
            Predicate::Similar(Field::RelationName, ParamKey::Word(0)),
            Predicate::ILike(Field::FullName, ParamKey::WordPattern(0)),
            Predicate::ILike(Field::RelationName, ParamKey::WordPattern(0)),
        ])),
        _ => {
            let threshold = settings.whole_similarity_threshold;
            let floor = f64::from(word_floor(n, settings));
            Predicate::any([
                Predicate::either_name(|f| Predicate::ILike(f, ParamKey::ExactPattern)),
                Predicate::either_name(|f| {
                    Predicate::all([
                        Predicate::Similar(f, ParamKey::SearchText),
                        Predicate::SimilarityAbove(f, ParamKey::SearchText, threshold),
                    ])
                }),
                Predicate::at_least(words_matched(n), floor),
            ])
        }
    }
}

fn score(n: usize, w: &TrigramWeights) -> Score {
    let mut parts = vec![
        Score::Similarity(Field::FullName, ParamKey::SearchText),
        Score::Similarity(Field::RelationName, ParamKey::SearchText),
        Score::when(Predicate::ILike(Field::FullName, ParamKey::ExactPattern), w.exact_full_name),
        Score::when(Predicate::ILike(Field::RelationName, ParamKey::ExactPattern), w.exact_relation_name),
    ];
    for i in 0..n {
        parts.push(Score::Similarity(Field::FullName, ParamKey::Word(i)));
        parts.push(Score::Similarity(Field::RelationName, ParamKey::Word(i)));
    }
    for i in 0..n {
        let base = (w.word_base - position(i) * w.word_decay).max(0.0);
        parts.push(Score::when(Predicate::ILike(Field::FullName, ParamKey::WordPattern(i)), base));
        parts.push(Score::when(
            Predicate::ILike(Field::RelationName, ParamKey::WordPattern(i)),
            (base - w.relation_word_penalty).max(0.0),
        ));
    }
    if n > 1 {
        parts.extend(bonuses(n, w));
    }
    Score::Greatest(parts)
}

/// Categorical boosts for matching many words at once. Matching every word
/// always earns the largest one.
fn bonuses(n: usize, w: &TrigramWeights) -> Vec<Score> {
    let words = position(n);
    let mut out = vec![Score::when(Predicate::at_least(words_matched(n), words), w.all_words)];
    if n == 3 {
        out.push(Score::when(Predicate::exactly(words_matched(n), 3.0), w.three_of_three));
        out.push(Score::when(Predicate::exactly(words_matched(n), 2.0), w.two_of_three));
    } else {
        let two_thirds = (words * TWO_THIRDS).ceil();
        if two_thirds < words {
            out.push(Score::when(Predicate::at_least(words_matched(n), two_thirds), w.two_thirds));
        }
        out.push(Score::when(Predicate::at_least(words_matched(n), (words * HALF).ceil()), w.half));
        if n >= 4 {
            out.push(Score::when(Predicate::at_least(words_matched(n), 2.0), w.at_least_two));
        }
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn position(i: usize) -> f64 {
    i as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use voterdb_core::types::Ward;

    fn query(text: &str) -> SearchQuery {
        SearchQuery::new(text, Ward(146)).unwrap()
    }

    fn bonus_weights(n: usize) -> Vec<f64> {
        bonuses(n, &TrigramWeights::default())
            .into_iter()
            .map(|s| match s {
                Score::When(_, weight) => weight,
                other => panic!("unexpected bonus {:?}", other),
            })
            .collect()
    }

    #[test]
    fn bonus_ladders_depend_on_word_count() {
        assert_eq!(bonus_weights(2), vec![1.0, 0.3]);
        assert_eq!(bonus_weights(3), vec![1.0, 0.9, 0.5]);
        assert_eq!(bonus_weights(4), vec![1.0, 0.5, 0.3, 0.2]);
    }

    #[test]
    fn word_bonuses_decay_with_position_and_never_go_negative() {
        let w = TrigramWeights { word_decay: 0.3, ..TrigramWeights::default() };
        let Score::Greatest(parts) = score(4, &w) else { panic!("expected GREATEST") };
        let word_weights: Vec<f64> = parts
            .iter()
            .filter_map(|s| match s {
                Score::When(p, weight) if matches!(**p, Predicate::ILike(Field::FullName, ParamKey::WordPattern(_))) => {
                    Some(*weight)
                }
                _ => None,
            })
            .collect();
        assert_eq!(word_weights.len(), 4);
        assert!((word_weights[0] - 0.6).abs() < 1e-9);
        assert!((word_weights[1] - 0.3).abs() < 1e-9);
        assert!(word_weights[2].abs() < 1e-9);
        assert!(word_weights[3].abs() < 1e-9);
    }

    #[test]
    fn multi_word_plan_binds_every_word_once() {
        let plan = plan(&query("Ram Kumar Patil"), &SearchSettings::default());
        let rendered = plan.to_sql().unwrap();
        // searchText, exactPattern, 3 words, 3 word patterns, ward
        assert_eq!(rendered.binds.len(), 9);
        assert!(rendered.sql.contains("similarity(v.full_name, $1) > 0.3"));
        assert!(plan.uses_similarity());
    }

    #[test]
    fn word_floor_only_applies_to_multi_word_queries() {
        let settings = SearchSettings::default();
        assert_eq!(word_floor(0, &settings), 0);
        assert_eq!(word_floor(1, &settings), 0);
        assert_eq!(word_floor(2, &settings), 2);
        assert_eq!(word_floor(5, &settings), 2);
    }
}
