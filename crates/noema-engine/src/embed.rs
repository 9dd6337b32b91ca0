// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic local embeddings via multi-hash term projection.
//!
//! Not a learned model: each term is projected into the target
//! dimensionality through three independent stable hashes (plus a stem
//! hash for longer terms) and the result is L2-normalized. The point is a
//! zero-cost, fully deterministic vector with a fixed dimensionality
//! contract; hashing internals are free to vary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text::{stable_hash, stem, terms};

/// Options for a local embedding call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    /// Target dimensionality of the output vector.
    pub dimensions: usize,
    /// Model label recorded alongside the vector (cache key material).
    pub model: String,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            dimensions: 256,
            model: "noema-local-hash-v1".to_string(),
        }
    }
}

/// A locally produced embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEmbedding {
    pub vector: Vec<f32>,
    /// Reliability estimate, in [0, 1].
    pub confidence: f64,
    pub dimensions: usize,
}

/// Projection weights for the three independent hashes. Spreading one term
/// over three slots reduces collision bias between unrelated terms.
const HASH_WEIGHTS: [(&str, f32); 3] = [("h1", 0.6), ("h2", 0.3), ("h3", 0.1)];

/// Weight of the stem hash applied to terms longer than four characters.
const STEM_WEIGHT: f32 = 0.15;

/// Embed `text` into a deterministic unit vector.
///
/// Empty or term-free input yields a zero vector with zero confidence.
pub fn embed(text: &str, options: &EmbedOptions) -> LocalEmbedding {
    let dims = options.dimensions.max(1);
    let mut vector = vec![0.0f32; dims];

    let term_list = terms(text);
    if term_list.is_empty() {
        return LocalEmbedding {
            vector,
            confidence: 0.0,
            dimensions: dims,
        };
    }

    let mut freq: HashMap<&str, usize> = HashMap::new();
    for term in &term_list {
        *freq.entry(term.as_str()).or_insert(0) += 1;
    }

    for (term, count) in &freq {
        let tf = *count as f32;
        for (salt, weight) in HASH_WEIGHTS {
            let h = stable_hash(salt, term);
            let slot = (h % dims as u64) as usize;
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign * weight * tf;
        }
        if term.chars().count() > 4 {
            let h = stable_hash("stem", stem(term));
            let slot = (h % dims as u64) as usize;
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign * STEM_WEIGHT * tf;
        }
    }

    let magnitude = l2_normalize(&mut vector);

    LocalEmbedding {
        confidence: confidence(&term_list, text, magnitude),
        vector,
        dimensions: dims,
    }
}

/// L2-normalize in place, returning the pre-normalization magnitude.
fn l2_normalize(vector: &mut [f32]) -> f32 {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    norm
}

/// Confidence rises with term diversity, appropriate text length, and a
/// non-trivial pre-normalization magnitude.
fn confidence(term_list: &[String], text: &str, magnitude: f32) -> f64 {
    let distinct: std::collections::HashSet<&str> =
        term_list.iter().map(|s| s.as_str()).collect();
    let diversity = distinct.len() as f64 / term_list.len() as f64;

    let chars = text.chars().count();
    let length_fit = if (20..=1000).contains(&chars) {
        1.0
    } else if chars < 20 {
        chars as f64 / 20.0
    } else {
        (1000.0 / chars as f64).max(0.3)
    };

    let magnitude_fit = if magnitude > 1.0 { 1.0 } else { f64::from(magnitude) };

    (0.5 * diversity + 0.3 * length_fit + 0.2 * magnitude_fit).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn embedding_is_deterministic() {
        let options = EmbedOptions::default();
        let a = embed("meeting notes about the garden project", &options);
        let b = embed("meeting notes about the garden project", &options);
        assert_eq!(a, b);
    }

    #[test]
    fn embedding_has_requested_dimensions_and_unit_norm() {
        let options = EmbedOptions {
            dimensions: 64,
            ..Default::default()
        };
        let e = embed("tomatoes beans squash harvest compost seedlings", &options);
        assert_eq!(e.vector.len(), 64);
        assert_eq!(e.dimensions, 64);
        let norm: f32 = e.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn empty_text_yields_zero_vector_zero_confidence() {
        let e = embed("", &EmbedOptions::default());
        assert_eq!(e.confidence, 0.0);
        assert!(e.vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn similar_texts_are_closer_than_unrelated() {
        let options = EmbedOptions::default();
        let a = embed("planting tomato seedlings in the garden beds", &options);
        let b = embed("tomato seedlings planted in garden beds today", &options);
        let c = embed("mortgage refinancing interest rate paperwork", &options);
        assert!(
            cosine(&a.vector, &b.vector) > cosine(&a.vector, &c.vector),
            "related texts should be closer"
        );
    }

    #[test]
    fn diverse_text_scores_higher_confidence_than_repetition() {
        let options = EmbedOptions::default();
        let diverse = embed(
            "gardening compost harvest trellis seedlings watering sunlight",
            &options,
        );
        let repetitive = embed(
            "word word word word word word word word word word word",
            &options,
        );
        assert!(diverse.confidence > repetitive.confidence);
    }

    #[test]
    fn very_short_text_has_reduced_confidence() {
        let options = EmbedOptions::default();
        let short = embed("cat", &options);
        let normal = embed(
            "the cat slept on the warm windowsill all afternoon yesterday",
            &options,
        );
        assert!(short.confidence < normal.confidence);
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let options = EmbedOptions::default();
        for text in ["", "a", "hello world", &"lexicon ".repeat(500)] {
            let e = embed(text, &options);
            assert!((0.0..=1.0).contains(&e.confidence), "text {text:?}");
        }
    }
}
