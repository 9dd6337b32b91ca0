// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval pipeline: search, dedup, re-rank, clean, truncate.
//!
//! Assembles a ranked, deduplicated, size-bounded set of chunks for a
//! retrieval-augmented answer, and reports which optimizations fired so the
//! caller can log or skip the remote call entirely.

use std::collections::HashSet;

use noema_config::RetrievalConfig;
use noema_core::{Chunk, CorpusNote};
use tracing::debug;

use crate::search::{search, tokens};

/// Result of a retrieval run.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    /// Top-K chunks, best first.
    pub chunks: Vec<Chunk>,
    /// Which optimizations were applied: "no-results", "dedup", "rerank",
    /// "truncated".
    pub optimizations: Vec<&'static str>,
}

/// Filler words dropped when a chunk is over its token budget.
const FILLERS: &[&str] = &[
    "very", "really", "just", "quite", "basically", "actually", "literally",
    "simply", "totally", "somewhat",
];

/// Two query terms within this many tokens count as proximate.
const PROXIMITY_WINDOW: usize = 5;

/// Retrieve the best chunks for `query` from `corpus`.
///
/// An empty corpus (or a query matching nothing) returns no chunks and the
/// "no-results" tag; the caller must not invoke a remote model on it.
pub fn retrieve(query: &str, corpus: &[CorpusNote], options: &RetrievalConfig) -> Retrieval {
    let mut optimizations = Vec::new();

    let candidates = search(query, corpus, options.top_k * 2);
    if candidates.is_empty() {
        return Retrieval {
            chunks: Vec::new(),
            optimizations: vec!["no-results"],
        };
    }

    let mut chunks: Vec<Chunk> = candidates
        .iter()
        .map(|scored| {
            let note = &corpus[scored.index];
            Chunk {
                id: format!("{}#0", note.id),
                content: note.content.clone(),
                score: scored.score,
                source_id: note.id.clone(),
            }
        })
        .collect();

    // Dedup near-identical chunks, keeping the higher-scored one.
    let before = chunks.len();
    chunks = dedup_chunks(chunks, options.dedup_threshold);
    if chunks.len() < before {
        optimizations.push("dedup");
        debug!(dropped = before - chunks.len(), "near-duplicate chunks dropped");
    }

    if options.rerank {
        rerank(query, &mut chunks);
        optimizations.push("rerank");
    }

    // Clean and bound every surviving chunk.
    let mut any_truncated = false;
    for chunk in &mut chunks {
        let (cleaned, truncated) = clean_chunk(&chunk.content, options.chunk_token_budget);
        chunk.content = cleaned;
        any_truncated |= truncated;
    }
    if any_truncated {
        optimizations.push("truncated");
    }

    chunks.truncate(options.top_k);

    Retrieval {
        chunks,
        optimizations,
    }
}

/// Token-set Jaccard similarity.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Drop chunks whose token-Jaccard similarity with an already kept chunk
/// exceeds the threshold. Input arrives sorted best-first, so the kept one
/// is always the better-scored of the pair.
fn dedup_chunks(chunks: Vec<Chunk>, threshold: f64) -> Vec<Chunk> {
    let mut kept: Vec<Chunk> = Vec::new();
    let mut kept_tokens: Vec<HashSet<String>> = Vec::new();
    for chunk in chunks {
        let toks: HashSet<String> = tokens(&chunk.content).into_iter().collect();
        let duplicate = kept_tokens.iter().any(|k| jaccard(k, &toks) > threshold);
        if !duplicate {
            kept.push(chunk);
            kept_tokens.push(toks);
        }
    }
    kept
}

/// Boost chunks by exact query-term count and term proximity, then re-sort.
fn rerank(query: &str, chunks: &mut [Chunk]) {
    let query_terms: HashSet<String> = tokens(query).into_iter().collect();
    if query_terms.is_empty() {
        return;
    }
    for chunk in chunks.iter_mut() {
        let toks = tokens(&chunk.content);
        let exact = toks
            .iter()
            .collect::<HashSet<_>>()
            .iter()
            .filter(|t| query_terms.contains(**t))
            .count();
        let proximate = toks
            .windows(PROXIMITY_WINDOW.min(toks.len().max(1)))
            .any(|w| {
                let present: HashSet<&String> =
                    w.iter().filter(|t| query_terms.contains(*t)).collect();
                present.len() >= 2
            });
        chunk.score += 0.1 * exact as f64 + if proximate { 0.3 } else { 0.0 };
    }
    chunks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
}

/// Clean a chunk and bound it to `token_budget` whitespace tokens.
///
/// Order of attack: drop repeated lines, drop filler words, cut on sentence
/// boundaries, hard cut with ellipsis as the last resort. Returns the
/// cleaned text and whether anything lossy happened.
fn clean_chunk(content: &str, token_budget: usize) -> (String, bool) {
    let budget = token_budget.max(1);

    // Drop repeated lines, preserving first occurrences.
    let mut seen_lines: HashSet<&str> = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut dropped_lines = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || seen_lines.insert(trimmed) {
            lines.push(line);
        } else {
            dropped_lines = true;
        }
    }
    let joined = lines.join("\n");

    let count = joined.split_whitespace().count();
    if count <= budget {
        return (joined, dropped_lines);
    }

    // Over budget: drop filler words first.
    let without_fillers: String = joined
        .split_whitespace()
        .filter(|w| {
            let bare = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            !FILLERS.contains(&bare.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ");
    if without_fillers.split_whitespace().count() <= budget {
        return (without_fillers, true);
    }

    // Cut on sentence boundaries.
    let mut out = String::new();
    let mut used = 0usize;
    for sentence in split_sentences(&without_fillers) {
        let tokens_in_sentence = sentence.split_whitespace().count();
        if used + tokens_in_sentence > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(sentence.trim());
        used += tokens_in_sentence;
    }
    if !out.is_empty() {
        return (out, true);
    }

    // Ellipsis fallback: hard cut at the token budget.
    let mut cut: String = without_fillers
        .split_whitespace()
        .take(budget)
        .collect::<Vec<_>>()
        .join(" ");
    cut.push('…');
    (cut, true)
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '?' | '!') {
            let end = i + c.len_utf8();
            let s = text[start..end].trim();
            if !s.is_empty() {
                out.push(s);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str, content: &str) -> CorpusNote {
        CorpusNote {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    fn options() -> RetrievalConfig {
        RetrievalConfig::default()
    }

    #[test]
    fn empty_corpus_returns_no_results_tag() {
        let result = retrieve("anything at all", &[], &options());
        assert!(result.chunks.is_empty());
        assert_eq!(result.optimizations, vec!["no-results"]);
    }

    #[test]
    fn unmatched_query_returns_no_results_tag() {
        let corpus = vec![note("1", "Groceries", "milk and eggs")];
        let result = retrieve("telescope calibration", &corpus, &options());
        assert!(result.chunks.is_empty());
        assert_eq!(result.optimizations, vec!["no-results"]);
    }

    #[test]
    fn reunion_scenario_returns_the_note_with_positive_score() {
        let corpus = vec![
            note("n1", "Réunion client", "Préparer les slides, demain à 10h."),
            note("n2", "Groceries", "milk, eggs, bread"),
        ];
        let result = retrieve("réunion demain", &corpus, &options());
        assert!(!result.chunks.is_empty());
        assert_eq!(result.chunks[0].source_id, "n1");
        assert!(result.chunks[0].score > 0.0);
    }

    #[test]
    fn near_duplicate_chunks_collapse_to_one() {
        let corpus = vec![
            note("a", "Meeting", "the quarterly planning meeting is on tuesday morning"),
            note("b", "Meeting copy", "the quarterly planning meeting is on tuesday morning"),
            note("c", "Other", "dentist appointment moved to friday afternoon"),
        ];
        let result = retrieve("quarterly planning meeting", &corpus, &options());
        let from_meeting_notes = result
            .chunks
            .iter()
            .filter(|c| c.content.contains("quarterly"))
            .count();
        assert_eq!(from_meeting_notes, 1, "duplicates must collapse");
        assert!(result.optimizations.contains(&"dedup"));
    }

    #[test]
    fn chunks_are_bounded_by_token_budget() {
        let long_content = "meeting detail ".repeat(400);
        let corpus = vec![note("1", "Meeting", &long_content)];
        let opts = RetrievalConfig {
            chunk_token_budget: 50,
            ..options()
        };
        let result = retrieve("meeting", &corpus, &opts);
        assert_eq!(result.chunks.len(), 1);
        assert!(result.chunks[0].content.split_whitespace().count() <= 50);
        assert!(result.optimizations.contains(&"truncated"));
    }

    #[test]
    fn repeated_lines_are_dropped() {
        let content = "unique first line\nrepeated line here\nrepeated line here\nlast line";
        let (cleaned, changed) = clean_chunk(content, 100);
        assert!(changed);
        assert_eq!(cleaned.matches("repeated line here").count(), 1);
    }

    #[test]
    fn filler_words_are_dropped_before_cutting() {
        let content = "this is really very just a quite basically simple note about the meeting agenda";
        let (cleaned, _) = clean_chunk(content, 9);
        assert!(!cleaned.contains("really"));
        assert!(!cleaned.contains("basically"));
        assert!(cleaned.contains("meeting"));
    }

    #[test]
    fn ellipsis_fallback_on_unbreakable_text() {
        let content = "word ".repeat(100);
        let (cleaned, changed) = clean_chunk(content.trim(), 10);
        assert!(changed);
        assert!(cleaned.ends_with('…'));
        assert!(cleaned.split_whitespace().count() <= 10);
    }

    #[test]
    fn top_k_caps_the_result() {
        let corpus: Vec<CorpusNote> = (0..20)
            .map(|i| {
                note(
                    &format!("n{i}"),
                    &format!("Meeting {i}"),
                    &format!("meeting notes number {i} with distinct content token{i}"),
                )
            })
            .collect();
        let opts = RetrievalConfig {
            top_k: 3,
            ..options()
        };
        let result = retrieve("meeting notes", &corpus, &opts);
        assert!(result.chunks.len() <= 3);
    }

    #[test]
    fn rerank_prefers_proximate_terms() {
        let corpus = vec![
            note(
                "scattered",
                "A",
                "budget is one thing that comes early here and far far away down the \
                 line a review shows then even further along after that meeting",
            ),
            note("tight", "B", "the budget review meeting happens tomorrow"),
        ];
        let result = retrieve("budget review meeting", &corpus, &options());
        assert_eq!(result.chunks[0].source_id, "tight");
        assert!(result.optimizations.contains(&"rerank"));
    }

    #[test]
    fn jaccard_basics() {
        let a: HashSet<String> = ["one", "two", "three"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let b: HashSet<String> = ["one", "two", "four"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // 2 shared / 4 union
        assert!((jaccard(&a, &b) - 0.5).abs() < f64::EPSILON);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
    }
}
