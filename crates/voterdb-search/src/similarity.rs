//! Trigram similarity with pg_trgm semantics.
//!
//! Text is lowercased and split into words; each word is padded with two
//! leading blanks and one trailing blank and cut into overlapping 3-character
//! windows. Similarity is `|A ∩ B| / |A ∪ B|` over the two trigram sets, which
//! makes it insensitive to word order.

use std::collections::BTreeSet;

pub type Trigram = [char; 3];

/// Default of `pg_trgm.similarity_threshold`, used by the `%` operator.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

pub fn trigrams(text: &str) -> BTreeSet<Trigram> {
    let lowered = text.to_lowercase();
    let mut set = BTreeSet::new();
    for word in lowered.split(|c: char| !is_word_char(c)).filter(|w| !w.is_empty()) {
        let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    #[allow(clippy::cast_precision_loss)]
    let score = shared as f64 / (left.len() + right.len() - shared) as f64;
    score
}

/// The `%` operator.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

// Devanagari vowel signs are combining marks, not alphanumerics, but they
// belong to the word they follow.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || ('\u{0900}'..='\u{097F}').contains(&c)
}
