// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local assessment of whether retrieved chunks can answer a query,
//! gating the decision to spend money on a remote model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use noema_core::Chunk;

use crate::text::terms;

/// Result of an answerability assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answerability {
    /// Whether the chunks are judged sufficient to answer locally.
    pub can_answer: bool,
    /// Reliability of the judgment, in [0, 1].
    pub confidence: f64,
    /// Human-readable explanation, observability only.
    pub reasoning: String,
    /// Mean per-chunk evidence strength, in [0, 1].
    pub evidence_score: f64,
    /// Fraction of distinct query terms present anywhere, in [0, 1].
    pub coverage_score: f64,
    /// Query terms absent from every chunk.
    pub missing_concepts: Vec<String>,
}

/// Overall score at or above this answers locally.
const ANSWER_THRESHOLD: f64 = 0.6;

/// Tokens that flip a shared-vocabulary chunk pair into a contradiction.
const NEGATIONS: &[&str] = &["not", "no", "never", "without", "none"];

/// Assess whether `chunks` suffice to answer `query`.
///
/// Zero chunks is a confident no: there is nothing to answer from.
pub fn assess_answerability(query: &str, chunks: &[Chunk]) -> Answerability {
    let query_terms: Vec<String> = {
        let mut seen = HashSet::new();
        terms(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    };

    if chunks.is_empty() {
        return Answerability {
            can_answer: false,
            confidence: 0.9,
            reasoning: "no evidence chunks retrieved".to_string(),
            evidence_score: 0.0,
            coverage_score: 0.0,
            missing_concepts: query_terms,
        };
    }

    if query_terms.is_empty() {
        return Answerability {
            can_answer: false,
            confidence: 0.9,
            reasoning: "query has no content terms".to_string(),
            evidence_score: 0.0,
            coverage_score: 0.0,
            missing_concepts: Vec::new(),
        };
    }

    let chunk_terms: Vec<HashSet<String>> = chunks
        .iter()
        .map(|c| terms(&c.content).into_iter().collect())
        .collect();

    // Chunk scores arrive on an arbitrary retrieval scale; normalize by the max.
    let max_score = chunks
        .iter()
        .map(|c| c.score)
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    let evidence_score = chunks
        .iter()
        .zip(&chunk_terms)
        .map(|(chunk, terms_in_chunk)| {
            let present = query_terms
                .iter()
                .filter(|t| terms_in_chunk.contains(*t))
                .count();
            let fraction = present as f64 / query_terms.len() as f64;
            fraction * (chunk.score / max_score)
        })
        .sum::<f64>()
        / chunks.len() as f64;

    let mut missing_concepts = Vec::new();
    let mut covered = 0usize;
    for term in &query_terms {
        if chunk_terms.iter().any(|set| set.contains(term)) {
            covered += 1;
        } else {
            missing_concepts.push(term.clone());
        }
    }
    let coverage_score = covered as f64 / query_terms.len() as f64;

    let coherence_score = coherence(chunks, &chunk_terms);

    let overall =
        0.5 * evidence_score + 0.3 * coverage_score + 0.2 * coherence_score;
    let can_answer = overall >= ANSWER_THRESHOLD;
    let confidence = (0.5 + (overall - ANSWER_THRESHOLD).abs()).min(0.95);

    let reasoning = format!(
        "evidence {evidence_score:.2}, coverage {coverage_score:.2}, coherence {coherence_score:.2} -> overall {overall:.2} ({} threshold {ANSWER_THRESHOLD})",
        if can_answer { "meets" } else { "below" },
    );

    Answerability {
        can_answer,
        confidence,
        reasoning,
        evidence_score,
        coverage_score,
        missing_concepts,
    }
}

/// 1.0 minus the fraction of chunk pairs that look lexically contradictory:
/// substantial shared vocabulary where exactly one side negates.
fn coherence(chunks: &[Chunk], chunk_terms: &[HashSet<String>]) -> f64 {
    if chunks.len() < 2 {
        return 1.0;
    }
    let negated: Vec<bool> = chunks.iter().map(|c| has_negation(&c.content)).collect();
    let mut pairs = 0usize;
    let mut contradictory = 0usize;
    for i in 0..chunks.len() {
        for j in (i + 1)..chunks.len() {
            pairs += 1;
            let shared = chunk_terms[i].intersection(&chunk_terms[j]).count();
            if shared >= 2 && negated[i] != negated[j] {
                contradictory += 1;
            }
        }
    }
    1.0 - contradictory as f64 / pairs as f64
}

fn has_negation(text: &str) -> bool {
    text.to_lowercase()
        .split_whitespace()
        .any(|w| {
            let w = w.trim_matches(|c: char| !c.is_alphanumeric());
            NEGATIONS.contains(&w) || w.ends_with("n't")
        })
}
