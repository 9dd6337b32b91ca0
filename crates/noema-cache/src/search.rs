// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TF-IDF corpus search with title and exact-phrase bonuses.

use std::collections::{HashMap, HashSet};

use noema_core::CorpusNote;

/// A note index paired with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNote {
    /// Index into the corpus slice handed to [`search`].
    pub index: usize,
    pub score: f64,
}

/// Lowercase alphabetic tokens longer than 2 characters.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Score `corpus` against `query`, returning matching notes sorted by
/// descending relevance. Notes with zero score are omitted.
///
/// Score = Σ over query terms of tf·idf, plus a per-term title bonus and a
/// whole-phrase bonus when the normalized query appears verbatim.
pub fn search(query: &str, corpus: &[CorpusNote], limit: usize) -> Vec<ScoredNote> {
    let query_terms: Vec<String> = {
        let mut seen = HashSet::new();
        tokens(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    };
    if query_terms.is_empty() || corpus.is_empty() {
        return Vec::new();
    }

    // Document frequency per query term.
    let note_tokens: Vec<Vec<String>> = corpus
        .iter()
        .map(|n| tokens(&format!("{} {}", n.title, n.content)))
        .collect();
    let mut df: HashMap<&str, usize> = HashMap::new();
    for toks in &note_tokens {
        let set: HashSet<&str> = toks.iter().map(|t| t.as_str()).collect();
        for term in &query_terms {
            if set.contains(term.as_str()) {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }
    }

    let n = corpus.len() as f64;
    let idf = |term: &str| -> f64 {
        let d = df.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n) / (1.0 + d)).ln() + 1.0
    };

    let phrase = normalize_phrase(query);

    let mut scored: Vec<ScoredNote> = corpus
        .iter()
        .enumerate()
        .filter_map(|(index, note)| {
            let toks = &note_tokens[index];
            if toks.is_empty() {
                return None;
            }
            let mut tf: HashMap<&str, usize> = HashMap::new();
            for t in toks {
                *tf.entry(t.as_str()).or_insert(0) += 1;
            }
            let title_tokens: HashSet<String> = tokens(&note.title).into_iter().collect();

            let mut score = 0.0;
            for term in &query_terms {
                let count = tf.get(term.as_str()).copied().unwrap_or(0);
                if count == 0 {
                    continue;
                }
                let weight = idf(term);
                score += (1.0 + (count as f64).ln()) * weight;
                if title_tokens.contains(term) {
                    score += 0.5 * weight;
                }
            }
            if score > 0.0 && !phrase.is_empty() {
                let haystack = normalize_phrase(&format!("{} {}", note.title, note.content));
                if haystack.contains(&phrase) {
                    score += 1.0;
                }
            }
            (score > 0.0).then_some(ScoredNote { index, score })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    scored.truncate(limit);
    scored
}

/// Lowercased, whitespace-collapsed rendering for exact-phrase matching.
fn normalize_phrase(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
