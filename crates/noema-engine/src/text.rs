// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared text utilities: normalization, sentence segmentation, term
//! extraction, and stable hashing.

use sha2::{Digest, Sha256};

/// English stopwords skipped during keyword scoring.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had",
    "her", "was", "one", "our", "out", "day", "get", "has", "him", "his",
    "how", "man", "new", "now", "old", "see", "two", "way", "who", "did",
    "its", "let", "she", "too", "use", "that", "with", "have", "this",
    "will", "your", "from", "they", "been", "were", "said", "each", "which",
    "their", "would", "there", "what", "about", "when", "into", "than",
    "them", "some", "could", "then", "these", "also", "after", "very",
];

/// Collapse all whitespace runs to single spaces and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into sentences on terminal punctuation.
///
/// Punctuation stays attached to its sentence. Text without terminal
/// punctuation yields a single sentence.
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '?' | '!') {
            let s = current.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

/// Extract lowercase alphabetic terms longer than 2 characters.
pub fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Distinct terms divided by total terms. Empty input yields 0.
pub fn lexical_diversity(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let distinct: std::collections::HashSet<&str> =
        words.iter().map(|s| s.as_str()).collect();
    distinct.len() as f64 / words.len() as f64
}

/// Stable 64-bit hash of a term under a salt.
///
/// sha-256 over `salt:term`, first eight bytes little-endian. Deterministic
/// across processes and platforms.
pub fn stable_hash(salt: &str, term: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(term.as_bytes());
    let digest = hasher.finalize();
    u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Strip common English suffixes for the stem hash. Deterministic, makes no
/// linguistic claims.
pub fn stem(term: &str) -> &str {
    for suffix in ["ing", "ed", "es", "ly", "s"] {
        if let Some(stripped) = term.strip_suffix(suffix) {
            if stripped.chars().count() >= 3 {
                return stripped;
            }
        }
    }
    term
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a \t b\n\nc "), "a b c");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let s = sentences("First one. Second? Third! trailing bit");
        assert_eq!(s.len(), 4);
        assert_eq!(s[0], "First one.");
        assert_eq!(s[3], "trailing bit");
    }

    #[test]
    fn sentences_without_punctuation_yield_one() {
        assert_eq!(sentences("just a fragment").len(), 1);
        assert!(sentences("").is_empty());
    }

    #[test]
    fn terms_keep_accented_alphabetics() {
        let t = terms("Réunion demain à 10h, c'est important");
        assert!(t.contains(&"réunion".to_string()));
        assert!(t.contains(&"demain".to_string()));
        // "à" is too short, "10h" is not alphabetic-only.
        assert!(!t.contains(&"à".to_string()));
    }

    #[test]
    fn terms_drop_short_words() {
        let t = terms("an ox is in it");
        assert!(t.is_empty());
    }

    #[test]
    fn lexical_diversity_bounds() {
        let all_same = vec!["word".to_string(); 4];
        assert!((lexical_diversity(&all_same) - 0.25).abs() < f64::EPSILON);
        let distinct = vec!["one".to_string(), "two".to_string()];
        assert!((lexical_diversity(&distinct) - 1.0).abs() < f64::EPSILON);
        assert_eq!(lexical_diversity(&[]), 0.0);
    }

    #[test]
    fn stable_hash_is_deterministic_and_salt_sensitive() {
        assert_eq!(stable_hash("h1", "meeting"), stable_hash("h1", "meeting"));
        assert_ne!(stable_hash("h1", "meeting"), stable_hash("h2", "meeting"));
        assert_ne!(stable_hash("h1", "meeting"), stable_hash("h1", "meetings"));
    }

    #[test]
    fn stem_strips_common_suffixes() {
        assert_eq!(stem("meetings"), "meeting");
        assert_eq!(stem("running"), "runn");
        assert_eq!(stem("walked"), "walk");
        // Too short after stripping: left alone.
        assert_eq!(stem("bed"), "bed");
    }
}
