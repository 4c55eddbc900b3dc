//! `ILIKE` patterns: building them from user text and matching them in memory.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnySequence,
    AnyChar,
    Literal(char),
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%text%` with `text` escaped.
pub fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape(text))
}

/// Case-insensitive LIKE with `\` as the escape character.
pub fn ilike(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.to_lowercase().chars().collect();
    let pattern = tokenize(&pattern.to_lowercase());

    let (mut vi, mut pi) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;
    while vi < value.len() {
        match pattern.get(pi) {
            Some(Token::AnySequence) => {
                backtrack = Some((pi, vi));
                pi += 1;
                continue;
            }
            Some(Token::AnyChar) => {
                vi += 1;
                pi += 1;
                continue;
            }
            Some(Token::Literal(c)) if *c == value[vi] => {
                vi += 1;
                pi += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            Some((star, consumed)) => {
                pi = star + 1;
                vi = consumed + 1;
                backtrack = Some((star, consumed + 1));
            }
            None => return false,
        }
    }
    pattern[pi..].iter().all(|t| *t == Token::AnySequence)
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::AnySequence,
            '_' => Token::AnyChar,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_case_insensitive() {
        assert!(ilike("Kumar Ram Patil", "%ram%"));
        assert!(ilike("kumar ram patil", &contains_pattern("RAM PATIL")));
        assert!(!ilike("Shyam Lal", "%ram%"));
    }

    #[test]
    fn anchored_and_single_char_wildcards() {
        assert!(ilike("Ram", "ram"));
        assert!(!ilike("Ram Singh", "ram"));
        assert!(ilike("Ram", "r_m"));
        assert!(ilike("Ram Singh", "ram%"));
        assert!(ilike("", "%"));
        assert!(!ilike("", "_"));
    }

    #[test]
    fn backtracks_over_partial_matches() {
        assert!(ilike("aaab", "%aab"));
        assert!(ilike("Ramesh Ramdas", "%ramd%"));
    }

    #[test]
    fn escaped_metacharacters_match_literally() {
        assert_eq!(escape("50%_off\\"), "50\\%\\_off\\\\");
        assert!(ilike("50% off", &contains_pattern("50%")));
        assert!(!ilike("500 off", &contains_pattern("50%")));
        assert!(!ilike("Ram", &contains_pattern("_")));
    }
}
