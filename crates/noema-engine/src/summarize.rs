// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extractive summarization with quality validation and a truncation
//! fallback. Pure, no network, never fails to return text.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::text::{lexical_diversity, normalize, sentences, terms, STOPWORDS};

/// Output formatting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// Selected sentences joined on one line.
    #[default]
    Concise,
    /// One sentence per line.
    Detailed,
    /// Markdown bullet list.
    Bulleted,
}

/// Options for a summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeOptions {
    /// Maximum summary length in characters.
    pub max_length: usize,
    /// Output style.
    pub style: SummaryStyle,
    /// Validation score below which the literal-truncation fallback kicks in.
    pub min_quality: f64,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            max_length: 400,
            style: SummaryStyle::Concise,
            min_quality: 0.45,
        }
    }
}

/// A summarization result. `fallback_reason` is set when the extractive
/// path was abandoned for literal truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    /// Reliability of the summary, in [0, 1].
    pub confidence: f64,
    /// Vocabulary-coverage and compression-fitness score, in [0, 1].
    pub validation_score: f64,
    /// Why the fallback was taken, when it was.
    pub fallback_reason: Option<String>,
}

/// Transition words that mark a sentence as discourse-connected.
const TRANSITIONS: &[&str] = &[
    "however", "therefore", "because", "moreover", "furthermore", "instead",
    "meanwhile", "consequently", "finally", "overall",
];

/// How many top-frequency terms count as document keywords.
const KEYWORD_COUNT: usize = 8;

/// Summarize `text` under the given options.
///
/// Empty input returns an empty, zero-confidence summary; it is a decision,
/// not an error. Any other input returns non-empty text no longer than
/// `max_length` plus formatting overhead.
pub fn summarize(text: &str, options: &SummarizeOptions) -> Summary {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Summary {
            text: String::new(),
            confidence: 0.0,
            validation_score: 0.0,
            fallback_reason: Some("empty-input".to_string()),
        };
    }

    let max_length = options.max_length.max(8);

    // Already short enough: hand it back untouched.
    if normalized.chars().count() <= max_length {
        return Summary {
            text: format_sentences(&sentences(&normalized), options.style),
            confidence: 0.9,
            validation_score: 1.0,
            fallback_reason: None,
        };
    }

    let sents = sentences(&normalized);
    let keywords = document_keywords(&normalized);

    let mut scored: Vec<(usize, f64)> = sents
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score_sentence(s, i, sents.len(), &sents, &keywords)))
        .collect();
    // Stable order for equal scores keeps the function deterministic.
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    // Greedy selection under the length budget, accounting for the
    // per-sentence formatting overhead of the requested style.
    let overhead = match options.style {
        SummaryStyle::Bulleted => 3,
        _ => 1,
    };
    let mut selected: Vec<usize> = Vec::new();
    let mut used = 0usize;
    for (i, _) in &scored {
        let len = sents[*i].chars().count() + overhead;
        if used + len <= max_length {
            selected.push(*i);
            used += len;
        }
    }

    if selected.is_empty() {
        return truncation_fallback(&normalized, max_length, "no-sentence-fits");
    }

    // Restore original document order.
    selected.sort_unstable();
    let chosen: Vec<String> = selected.iter().map(|i| sents[*i].clone()).collect();
    let summary_text = format_sentences(&chosen, options.style);

    let validation_score = validate(&normalized, &summary_text, &keywords);
    if validation_score < options.min_quality {
        tracing::debug!(
            validation_score,
            min_quality = options.min_quality,
            "summary below quality threshold, falling back to truncation"
        );
        return truncation_fallback(&normalized, max_length, "quality-below-threshold");
    }

    Summary {
        text: summary_text,
        confidence: 0.5 + 0.5 * validation_score,
        validation_score,
        fallback_reason: None,
    }
}

/// The document's top-frequency non-stopword terms.
fn document_keywords(text: &str) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for term in terms(text) {
        if !STOPWORDS.contains(&term.as_str()) {
            *freq.entry(term).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(KEYWORD_COUNT)
        .map(|(term, _)| term)
        .collect()
}

fn score_sentence(
    sentence: &str,
    index: usize,
    count: usize,
    all: &[String],
    keywords: &[String],
) -> f64 {
    let sentence_terms = terms(sentence);
    let chars = sentence.chars().count() as f64;

    // Position: openers weigh most, closers still matter.
    let position = if index == 0 {
        1.0
    } else if index + 1 == count {
        0.7
    } else {
        1.0 - 0.5 * (index as f64 / count as f64)
    };

    // Length ratio to the document average; best near 1.0.
    let avg_len = all
        .iter()
        .map(|s| s.chars().count())
        .sum::<usize>() as f64
        / count.max(1) as f64;
    let ratio = if avg_len > 0.0 { chars / avg_len } else { 0.0 };
    let length = (1.0 - (1.0 - ratio).abs()).clamp(0.0, 1.0);

    // Keyword density.
    let keyword_hits = sentence_terms
        .iter()
        .filter(|t| keywords.contains(t))
        .count();
    let keyword = if sentence_terms.is_empty() {
        0.0
    } else {
        (keyword_hits as f64 / sentence_terms.len() as f64 * 3.0).min(1.0)
    };

    // Informativeness via lexical diversity.
    let informativeness = lexical_diversity(&sentence_terms);

    // Coherence: transition opener plus balanced punctuation.
    let first_word = sentence_terms.first().map(|s| s.as_str()).unwrap_or("");
    let transition = if TRANSITIONS.contains(&first_word) { 1.0 } else { 0.0 };
    let balanced = {
        let opens = sentence.matches(['(', '[', '"']).count();
        let closes = sentence.matches([')', ']', '"']).count();
        if opens == closes { 1.0 } else { 0.0 }
    };
    let coherence = 0.3 * transition + 0.7 * balanced;

    // Complexity penalty for run-on or jargon-dense sentences.
    let avg_term_len = if sentence_terms.is_empty() {
        0.0
    } else {
        sentence_terms.iter().map(|t| t.chars().count()).sum::<usize>() as f64
            / sentence_terms.len() as f64
    };
    let mut penalty = 0.0;
    if avg_term_len > 7.0 {
        penalty += (0.1 * (avg_term_len - 7.0)).min(0.3);
    }
    if chars > 200.0 {
        penalty += 0.1;
    }

    0.25 * position + 0.15 * length + 0.30 * keyword + 0.15 * informativeness
        + 0.15 * coherence
        - penalty
}

/// Validation: keyword coverage plus compression-ratio fitness.
fn validate(original: &str, summary: &str, keywords: &[String]) -> f64 {
    let summary_terms: HashSet<String> = terms(summary).into_iter().collect();

    let coverage = if keywords.is_empty() {
        1.0
    } else {
        keywords
            .iter()
            .filter(|k| summary_terms.contains(*k))
            .count() as f64
            / keywords.len() as f64
    };

    let ratio = summary.chars().count() as f64 / original.chars().count().max(1) as f64;
    let fitness = if ratio < 0.02 {
        0.5
    } else if ratio <= 0.6 {
        1.0
    } else {
        (1.0 - (ratio - 0.6) / 0.4).clamp(0.0, 1.0)
    };

    0.6 * coverage + 0.4 * fitness
}

/// Literal truncation on a sentence boundary, hard cut with ellipsis when
/// even the first sentence is too long.
fn truncation_fallback(text: &str, max_length: usize, reason: &str) -> Summary {
    let mut out = String::new();
    for sentence in sentences(text) {
        let len = sentence.chars().count() + usize::from(!out.is_empty());
        if out.chars().count() + len > max_length {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&sentence);
    }
    if out.is_empty() {
        out = text.chars().take(max_length.saturating_sub(1)).collect();
        out.push('…');
    }
    Summary {
        text: out,
        confidence: 0.3,
        validation_score: 0.0,
        fallback_reason: Some(reason.to_string()),
    }
}

fn format_sentences(sentences: &[String], style: SummaryStyle) -> String {
    match style {
        SummaryStyle::Concise => sentences.join(" "),
        SummaryStyle::Detailed => sentences.join("\n"),
        SummaryStyle::Bulleted => sentences
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "The garden project started in early spring with a plan for raised beds. \
        We ordered soil, compost, and seeds for tomatoes, beans, and squash. \
        The first weekend was spent building the bed frames from cedar boards. \
        Rain delayed planting by a week, but the soil settled nicely. \
        By June the tomato seedlings had doubled in height. \
        Squash vines took over the east corner faster than expected. \
        The beans needed a trellis, which we built from leftover cedar. \
        Harvest began in August with more tomatoes than we could eat. \
        Neighbors took home baskets of squash every week. \
        Overall the raised beds produced far more than the old plot ever did.";

    #[test]
    fn empty_input_yields_zero_confidence_not_error() {
        let s = summarize("", &SummarizeOptions::default());
        assert_eq!(s.text, "");
        assert_eq!(s.confidence, 0.0);
        assert_eq!(s.fallback_reason.as_deref(), Some("empty-input"));
    }

    #[test]
    fn short_text_is_returned_whole() {
        let s = summarize("Buy milk. Feed the cat.", &SummarizeOptions::default());
        assert_eq!(s.text, "Buy milk. Feed the cat.");
        assert!(s.fallback_reason.is_none());
        assert!((s.validation_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_respects_max_length() {
        let options = SummarizeOptions {
            max_length: 200,
            ..Default::default()
        };
        let s = summarize(ARTICLE, &options);
        assert!(!s.text.is_empty());
        assert!(
            s.text.chars().count() <= 200 + 16,
            "summary length {} over budget",
            s.text.chars().count()
        );
        assert!((0.0..=1.0).contains(&s.confidence));
    }

    #[test]
    fn summary_length_holds_across_budgets() {
        for max_length in [60, 120, 300, 500] {
            let options = SummarizeOptions {
                max_length,
                ..Default::default()
            };
            let s = summarize(ARTICLE, &options);
            assert!(!s.text.is_empty(), "budget {max_length} produced empty text");
            assert!(
                s.text.chars().count() <= max_length + 16,
                "budget {max_length} exceeded: {}",
                s.text.chars().count()
            );
        }
    }

    #[test]
    fn selected_sentences_keep_document_order() {
        let options = SummarizeOptions {
            max_length: 250,
            ..Default::default()
        };
        let s = summarize(ARTICLE, &options);
        // Whatever was selected, relative order must match the original.
        let mut last_pos = 0;
        for sentence in sentences(&s.text) {
            let pos = ARTICLE.find(sentence.trim()).unwrap_or_else(|| {
                panic!("summary sentence not found verbatim: {sentence}")
            });
            assert!(pos >= last_pos, "sentences out of document order");
            last_pos = pos;
        }
    }

    #[test]
    fn bulleted_style_prefixes_each_sentence() {
        let options = SummarizeOptions {
            max_length: 200,
            style: SummaryStyle::Bulleted,
            ..Default::default()
        };
        let s = summarize(ARTICLE, &options);
        for line in s.text.lines() {
            assert!(line.starts_with("- "), "line not bulleted: {line}");
        }
    }

    #[test]
    fn impossible_quality_bar_triggers_fallback() {
        let options = SummarizeOptions {
            max_length: 120,
            min_quality: 1.1,
            ..Default::default()
        };
        let s = summarize(ARTICLE, &options);
        assert_eq!(
            s.fallback_reason.as_deref(),
            Some("quality-below-threshold")
        );
        assert!(!s.text.is_empty(), "fallback must still return text");
        assert!(s.text.chars().count() <= 120 + 16);
    }

    #[test]
    fn single_oversized_sentence_gets_hard_cut() {
        let long = format!("word {}", "detail ".repeat(100));
        let options = SummarizeOptions {
            max_length: 50,
            ..Default::default()
        };
        let s = summarize(&long, &options);
        assert!(!s.text.is_empty());
        assert!(s.text.ends_with('…'));
        assert!(s.text.chars().count() <= 50);
    }

    #[test]
    fn summarize_is_deterministic() {
        let options = SummarizeOptions::default();
        let a = summarize(ARTICLE, &options);
        let b = summarize(ARTICLE, &options);
        assert_eq!(a, b);
    }
}
