// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic complexity classification.
//!
//! Scores text into a 0..1 complexity score and a suggested execution tier
//! using zero-cost heuristic signals. No LLM pre-call, no network, no latency.

use noema_config::ClassifierConfig;
use noema_core::{ModelTier, Origin, TextUnit};

/// Subscription plan of the requesting user.
///
/// Paying users get a lower remote threshold: their traffic escalates to the
/// paid tier sooner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserPlan {
    #[default]
    Free,
    Paid,
}

/// Request-side context consulted by the classifier.
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext {
    /// Duration of the source audio when the text is a transcript.
    pub audio_duration_secs: Option<f64>,
    /// Number of turns in the surrounding conversation.
    pub turn_count: usize,
    /// The requesting user's plan.
    pub plan: UserPlan,
}

/// The five normalized factors feeding the weighted complexity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexityFactors {
    /// Text length relative to the saturation length, capped at 1.0.
    pub length: f64,
    /// Density of domain-vocabulary terms.
    pub domain_term_density: f64,
    /// Density of affect-vocabulary terms.
    pub affect_density: f64,
    /// 1.0 when non-primary-language script is present, else 0.0.
    pub multilingual: f64,
    /// Bonus from long audio or multi-turn context.
    pub context_weight: f64,
}

/// Result of classifying a text's complexity. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityScore {
    /// Weighted complexity score in [0, 1].
    pub score: f64,
    /// The individual factors behind the score.
    pub factors: ComplexityFactors,
    /// Suggested execution tier.
    pub suggested_tier: ModelTier,
    /// Human-readable explanation. Observability only -- never consulted
    /// for control flow.
    pub reasoning: String,
}

/// Domain vocabulary: professional/technical terms that push work remote.
const DOMAIN_TERMS: &[&str] = &[
    "contract", "invoice", "deadline", "quarterly", "budget", "revenue",
    "diagnosis", "prescription", "symptom", "treatment", "insurance",
    "mortgage", "portfolio", "dividend", "liability", "compliance",
    "architecture", "deployment", "migration", "refactor", "algorithm",
    "negotiation", "stakeholder", "milestone", "retrospective", "roadmap",
];

/// Affect vocabulary: emotionally loaded terms that deserve a careful model.
const AFFECT_TERMS: &[&str] = &[
    "worried", "anxious", "stressed", "overwhelmed", "frustrated", "angry",
    "sad", "grief", "scared", "afraid", "excited", "thrilled", "proud",
    "ashamed", "guilty", "lonely", "hopeless", "desperate", "furious",
    "devastated", "heartbroken",
];

/// Factor weights. Sum to 1.0 so the score stays within [0, 1].
const W_LENGTH: f64 = 0.30;
const W_DOMAIN: f64 = 0.25;
const W_AFFECT: f64 = 0.15;
const W_MULTILINGUAL: f64 = 0.10;
const W_CONTEXT: f64 = 0.20;

/// Audio longer than this marks the context factor.
const LONG_AUDIO_SECS: f64 = 120.0;

/// Conversations at or beyond this many turns mark the context factor.
const MULTI_TURN_COUNT: usize = 4;

/// Pure, synchronous, deterministic complexity classifier.
///
/// Construct one per process/session and inject it; it holds only
/// configuration, no hidden state.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a text's complexity.
    ///
    /// Empty (or whitespace-only) text scores 0 and stays local. Identical
    /// (text, context) inputs produce bit-identical results.
    pub fn classify(&self, text: &str, context: &ClassifyContext) -> ComplexityScore {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ComplexityScore {
                score: 0.0,
                factors: ComplexityFactors {
                    length: 0.0,
                    domain_term_density: 0.0,
                    affect_density: 0.0,
                    multilingual: 0.0,
                    context_weight: 0.0,
                },
                suggested_tier: ModelTier::Local,
                reasoning: "empty input".to_string(),
            };
        }

        let factors = ComplexityFactors {
            length: self.length_factor(trimmed),
            domain_term_density: density_factor(trimmed, DOMAIN_TERMS),
            affect_density: density_factor(trimmed, AFFECT_TERMS),
            multilingual: multilingual_factor(trimmed),
            context_weight: context_factor(context),
        };

        let score = (W_LENGTH * factors.length
            + W_DOMAIN * factors.domain_term_density
            + W_AFFECT * factors.affect_density
            + W_MULTILINGUAL * factors.multilingual
            + W_CONTEXT * factors.context_weight)
            .clamp(0.0, 1.0);

        let threshold = match context.plan {
            UserPlan::Paid => self.config.paid_remote_threshold,
            UserPlan::Free => self.config.free_remote_threshold,
        };

        let suggested_tier = if score > threshold {
            ModelTier::Remote
        } else {
            ModelTier::Local
        };

        let reasoning = format!(
            "score {score:.2} vs threshold {threshold:.2} ({}): length {:.2}, domain {:.2}, affect {:.2}, multilingual {:.0}, context {:.2}",
            match context.plan {
                UserPlan::Paid => "paid",
                UserPlan::Free => "free",
            },
            factors.length,
            factors.domain_term_density,
            factors.affect_density,
            factors.multilingual,
            factors.context_weight,
        );

        ComplexityScore {
            score,
            factors,
            suggested_tier,
            reasoning,
        }
    }

    /// Classify a [`TextUnit`], folding its origin into the context factor:
    /// transcripts are voice-derived and noisier, so they lean remote
    /// slightly sooner than typed queries or documents.
    pub fn classify_unit(&self, unit: &TextUnit, context: &ClassifyContext) -> ComplexityScore {
        let mut score = self.classify(unit.text(), context);
        if unit.origin() == Origin::Transcript && !unit.text().trim().is_empty() {
            let boosted = (score.factors.context_weight + 0.25).min(1.0);
            let delta = W_CONTEXT * (boosted - score.factors.context_weight);
            score.factors.context_weight = boosted;
            score.score = (score.score + delta).clamp(0.0, 1.0);
            let threshold = match context.plan {
                UserPlan::Paid => self.config.paid_remote_threshold,
                UserPlan::Free => self.config.free_remote_threshold,
            };
            score.suggested_tier = if score.score > threshold {
                ModelTier::Remote
            } else {
                ModelTier::Local
            };
            score.reasoning.push_str("; transcript origin");
        }
        score
    }

    fn length_factor(&self, text: &str) -> f64 {
        let saturation = self.config.length_saturation_chars.max(1) as f64;
        (text.chars().count() as f64 / saturation).min(1.0)
    }
}

/// Fraction of words matching a vocabulary list, scaled so that one match in
/// ten words already registers strongly. Capped at 1.0.
fn density_factor(text: &str, vocabulary: &[&str]) -> f64 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let hits = words
        .iter()
        .filter(|w| {
            let w = w.trim_matches(|c: char| !c.is_alphanumeric());
            vocabulary.contains(&w)
        })
        .count();
    (hits as f64 / words.len() as f64 * 10.0).min(1.0)
}

/// 1.0 when the text contains alphabetic characters outside the Latin
/// Extended range (CJK, Cyrillic, Arabic, ...). Accented Latin does not
/// trip this factor.
fn multilingual_factor(text: &str) -> f64 {
    let non_latin = text
        .chars()
        .any(|c| c.is_alphabetic() && c as u32 > 0x024F);
    if non_latin { 1.0 } else { 0.0 }
}

/// Bonus for long source audio and multi-turn conversations, capped at 1.0.
fn context_factor(context: &ClassifyContext) -> f64 {
    let mut weight: f64 = 0.0;
    if context
        .audio_duration_secs
        .is_some_and(|secs| secs > LONG_AUDIO_SECS)
    {
        weight += 0.5;
    }
    if context.turn_count >= MULTI_TURN_COUNT {
        weight += 0.5;
    }
    weight.min(1.0)
}
