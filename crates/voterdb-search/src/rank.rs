//! Final ordering of candidates.
//!
//! The same [`OrderTerm`] list drives the datastore `ORDER BY` (which picks
//! the capped candidate pool) and [`compare`] here, so both layers always
//! agree on what "better" means.

use std::cmp::Ordering;
use std::collections::HashSet;

use voterdb_core::types::{ScoredCandidate, VoterRecord};

use crate::plan::OrderTerm;

pub fn compare(order: &[OrderTerm], a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    for term in order {
        let ord = match term {
            OrderTerm::WordsMatchedDesc => b.words_matched.cmp(&a.words_matched),
            OrderTerm::ScoreDesc => b.match_score.partial_cmp(&a.match_score).unwrap_or(Ordering::Equal),
            OrderTerm::FullNameAsc => a.record.full_name.cmp(&b.record.full_name),
            OrderTerm::SerialAsc => serial_key(&a.record).cmp(&serial_key(&b.record)),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

// NULL serials sort last, as in Postgres ascending order.
fn serial_key(record: &VoterRecord) -> (bool, usize, &str) {
    match record.sr_no.as_deref() {
        Some(sr) => (false, sr.len(), sr),
        None => (true, 0, ""),
    }
}

/// Keeps candidates accepted by `keep`, sorts them by `order`, drops repeated
/// EPIC numbers (first one wins), caps at `limit` and strips the scores.
pub fn finalize(
    candidates: Vec<ScoredCandidate>,
    order: &[OrderTerm],
    keep: impl Fn(&ScoredCandidate) -> bool,
    limit: usize,
) -> Vec<VoterRecord> {
    let mut kept: Vec<ScoredCandidate> = candidates.into_iter().filter(|c| keep(c)).collect();
    kept.sort_by(|a, b| compare(order, a, b));

    let mut seen = HashSet::new();
    kept.into_iter()
        .filter(|c| c.record.epic_number.is_empty() || seen.insert(c.record.epic_number.to_uppercase()))
        .take(limit)
        .map(|c| c.record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(epic: &str, name: &str, score: f64, words: u32) -> ScoredCandidate {
        ScoredCandidate {
            record: VoterRecord {
                epic_number: epic.to_string(),
                full_name: name.to_string(),
                relation_name: None,
                relation_type: None,
                age: None,
                gender: None,
                ward_no: None,
                part_no: None,
                sr_no: None,
                address: None,
                house_number: None,
                pincode: None,
                ac_no: None,
            },
            match_score: score,
            words_matched: words,
        }
    }

    const TRIGRAM_ORDER: [OrderTerm; 3] =
        [OrderTerm::WordsMatchedDesc, OrderTerm::ScoreDesc, OrderTerm::FullNameAsc];

    #[test]
    fn words_matched_outranks_score() {
        let ranked = finalize(
            vec![candidate("A1", "Ram Singh", 0.95, 1), candidate("B2", "Kumar Ram Patil", 0.6, 2)],
            &TRIGRAM_ORDER,
            |_| true,
            50,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["Kumar Ram Patil", "Ram Singh"]);
    }

    #[test]
    fn equal_scores_tie_break_on_name() {
        let ranked = finalize(
            vec![candidate("A1", "Sita Ram", 1.0, 2), candidate("B2", "Ram Lal", 1.0, 2)],
            &TRIGRAM_ORDER,
            |_| true,
            50,
        );
        assert_eq!(ranked[0].full_name, "Ram Lal");
    }

    #[test]
    fn duplicates_filters_and_limit_apply() {
        let ranked = finalize(
            vec![
                candidate("abc1", "Ram", 0.9, 1),
                candidate("ABC1", "Ram", 0.8, 1),
                candidate("C3", "Rama", 0.1, 1),
                candidate("D4", "Ramu", 0.5, 1),
                candidate("E5", "Ramesh", 0.4, 1),
            ],
            &TRIGRAM_ORDER,
            |c| c.match_score >= 0.2,
            2,
        );
        let epics: Vec<&str> = ranked.iter().map(|r| r.epic_number.as_str()).collect();
        assert_eq!(epics, vec!["abc1", "D4"]);
    }

    #[test]
    fn serials_sort_numerically_with_nulls_last() {
        let mut a = candidate("A", "x", 0.0, 0);
        a.record.sr_no = Some("10".to_string());
        let mut b = candidate("B", "x", 0.0, 0);
        b.record.sr_no = Some("9".to_string());
        let c = candidate("C", "x", 0.0, 0);
        let ranked = finalize(vec![c, a, b], &[OrderTerm::SerialAsc], |_| true, 50);
        let epics: Vec<&str> = ranked.iter().map(|r| r.epic_number.as_str()).collect();
        assert_eq!(epics, vec!["B", "A", "C"]);
    }
}
