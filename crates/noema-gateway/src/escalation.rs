// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded escalation policy.
//!
//! The "retry once on a stronger model when confidence is low" rule,
//! factored into a policy object so the bounds (attempt count, confidence
//! floor, budget fit) are testable without a gateway.
//!
//! The confidence feeding this policy is the remote model's self-report,
//! trusted without independent verification. A model that under-reports
//! causes spurious escalation; one that over-reports suppresses it. That
//! fidelity gap is inherent to the contract and intentionally not patched
//! here.

use noema_config::GatewayConfig;

/// When an additional, costlier attempt is permitted.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    /// Total attempts allowed, including the first call.
    pub max_attempts: u32,
    /// Self-reported confidence below which escalation triggers.
    pub confidence_floor: f64,
    /// Master switch.
    pub enabled: bool,
}

impl EscalationPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_attempts: 2,
            confidence_floor: config.confidence_floor,
            enabled: config.escalation_enabled,
        }
    }

    /// Decide whether one more attempt is allowed.
    ///
    /// `attempts_made` counts completed calls; `extra_cost_usd` is the
    /// estimate for the stronger model; `remaining_budget_usd` is what the
    /// user's daily budget still holds. No unbounded backoff: once
    /// `max_attempts` is reached the answer is final.
    pub fn should_escalate(
        &self,
        attempts_made: u32,
        confidence: f64,
        extra_cost_usd: f64,
        remaining_budget_usd: f64,
    ) -> bool {
        self.enabled
            && attempts_made < self.max_attempts
            && confidence < self.confidence_floor
            && extra_cost_usd <= remaining_budget_usd
    }
}
