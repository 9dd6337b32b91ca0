// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost estimation.
//!
//! The governor needs estimates before a call and realized cost after one;
//! both come from the same per-model table. Unknown models fall back to the
//! middle tier so cost tracking never silently drops records.

use noema_core::TokenUsage;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Cost per million input tokens.
    pub input_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_per_mtok: f64,
}

/// Look up pricing for a given model identifier.
///
/// Matches on substrings: "opus", "haiku", "sonnet", "embed". Falls back to
/// Sonnet pricing for unknown models.
pub fn get_pricing(model: &str) -> ModelPricing {
    let lower = model.to_lowercase();

    if lower.contains("opus") {
        ModelPricing {
            input_per_mtok: 15.0,
            output_per_mtok: 75.0,
        }
    } else if lower.contains("haiku") {
        ModelPricing {
            input_per_mtok: 0.80,
            output_per_mtok: 4.0,
        }
    } else if lower.contains("embed") {
        // Embeddings bill input only.
        ModelPricing {
            input_per_mtok: 0.10,
            output_per_mtok: 0.0,
        }
    } else {
        // Default to Sonnet pricing (including unknown models).
        ModelPricing {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        }
    }
}

/// Realized cost in USD for a token usage under a pricing entry.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let input = (usage.input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (usage.output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    input + output
}

/// Estimate the token count of a text: chars / 4, rounded up, minimum 1
/// for non-empty text.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    chars.div_ceil(4) as u32
}

/// Estimated cost of a call before it happens.
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    calculate_cost(
        &TokenUsage::new(input_tokens, output_tokens),
        &get_pricing(model),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haiku_pricing() {
        let p = get_pricing("claude-haiku-4-5-20250901");
        assert!((p.input_per_mtok - 0.80).abs() < f64::EPSILON);
        assert!((p.output_per_mtok - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sonnet_pricing() {
        let p = get_pricing("claude-sonnet-4-20250514");
        assert!((p.input_per_mtok - 3.0).abs() < f64::EPSILON);
        assert!((p.output_per_mtok - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn opus_pricing() {
        let p = get_pricing("claude-opus-4-20250514");
        assert!((p.input_per_mtok - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn embedding_models_bill_input_only() {
        let p = get_pricing("noema-embed-v1");
        assert!(p.output_per_mtok.abs() < f64::EPSILON);
        assert!(p.input_per_mtok > 0.0);
    }

    #[test]
    fn unknown_model_falls_back_to_sonnet() {
        let p = get_pricing("mystery-model-9");
        assert_eq!(p, get_pricing("claude-sonnet-4-20250514"));
    }

    #[test]
    fn calculate_cost_sums_both_sides() {
        let pricing = get_pricing("claude-sonnet-4-20250514");
        let usage = TokenUsage::new(1000, 500);
        let cost = calculate_cost(&usage, &pricing);
        let expected = 0.003 + 0.0075;
        assert!((cost - expected).abs() < 1e-10, "expected {expected}, got {cost}");
    }

    #[test]
    fn zero_tokens_zero_cost() {
        let cost = calculate_cost(&TokenUsage::default(), &get_pricing("claude-haiku-4-5-20250901"));
        assert!(cost.abs() < f64::EPSILON);
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
