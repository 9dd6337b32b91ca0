// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cost governor: pre-flight budget decisions and post-flight
//! settlement.
//!
//! Budget exhaustion is a typed decision, never an error: callers branch on
//! [`SuggestedAction`], they do not catch exceptions.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{info, warn};

use noema_config::CostConfig;
use noema_core::{NoemaError, Operation, Priority, TokenUsage};

use crate::ledger::{BudgetLedger, SpendRecord};
use crate::pricing::{calculate_cost, get_pricing};

/// What the caller should do with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SuggestedAction {
    /// Budget allows the call.
    Proceed,
    /// Budget is exhausted but the work is low priority: retry later.
    Defer,
    /// Budget is exhausted; fail loudly.
    Deny,
}

/// The governor's verdict on a proposed remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    /// Present when the request is not allowed.
    pub reason: Option<String>,
    pub suggested_action: SuggestedAction,
}

/// Pre-flight budget gate and post-flight spend settlement.
pub struct CostGovernor {
    ledger: BudgetLedger,
    config: CostConfig,
}

impl CostGovernor {
    pub fn new(ledger: BudgetLedger, config: CostConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &BudgetLedger {
        &self.ledger
    }

    /// Decide whether an operation estimated at `est_cost_usd` may proceed
    /// for `user_id` today.
    ///
    /// A request is pre-emptively rejected when its estimate would push the
    /// day's spend past the limit -- before any remote call is made.
    pub async fn should_proceed(
        &self,
        user_id: &str,
        operation: Operation,
        est_tokens: u32,
        est_cost_usd: f64,
        priority: Priority,
    ) -> Result<Decision, NoemaError> {
        let entry = self.ledger.entry(user_id, &BudgetLedger::today()).await?;
        let remaining = entry.daily_limit_usd - entry.spent_usd;

        if est_cost_usd <= remaining {
            let utilization = entry.utilization();
            if utilization >= self.config.warn_fraction {
                warn!(
                    user_id,
                    %operation,
                    utilization = format!("{:.0}%", utilization * 100.0),
                    remaining_usd = remaining,
                    "approaching daily budget cap"
                );
            }
            return Ok(Decision {
                allowed: true,
                reason: None,
                suggested_action: SuggestedAction::Proceed,
            });
        }

        let suggested_action = if priority == Priority::Low {
            SuggestedAction::Defer
        } else {
            SuggestedAction::Deny
        };
        let reason = format!(
            "estimated ${est_cost_usd:.4} ({est_tokens} tokens) exceeds remaining ${:.4} of daily ${:.2} limit",
            remaining.max(0.0),
            entry.daily_limit_usd,
        );
        info!(user_id, %operation, %suggested_action, "budget gate rejected request");

        Ok(Decision {
            allowed: false,
            reason: Some(reason),
            suggested_action,
        })
    }

    /// Realized cost of a completed call.
    pub fn realized_cost(model: &str, usage: &TokenUsage) -> f64 {
        calculate_cost(usage, &get_pricing(model))
    }

    /// Settle a completed remote call directly against the ledger.
    ///
    /// The gateway settles through its own transaction (spend and audit row
    /// together); this entry point serves callers without one.
    pub async fn settle(
        &self,
        user_id: &str,
        model: &str,
        usage: &TokenUsage,
    ) -> Result<f64, NoemaError> {
        let cost_usd = Self::realized_cost(model, usage);
        self.ledger
            .apply_spend(SpendRecord {
                user_id: user_id.to_string(),
                date: BudgetLedger::today(),
                cost_usd,
                tokens_in: u64::from(usage.input_tokens),
                tokens_out: u64::from(usage.output_tokens),
            })
            .await?;
        Ok(cost_usd)
    }
}
