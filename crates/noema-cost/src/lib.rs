// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost governance for the Noema orchestration layer.
//!
//! This crate provides:
//! - **Pricing**: per-model cost tables and token/cost estimation
//! - **Budget ledger**: one additive SQLite row per user per day
//! - **Cost governor**: typed proceed/defer/deny decisions before a remote
//!   call, settlement of realized spend after one

pub mod governor;
pub mod ledger;
pub mod pricing;

pub use governor::{CostGovernor, Decision, SuggestedAction};
pub use ledger::{BudgetLedger, BudgetLedgerEntry, SpendRecord};
pub use pricing::{calculate_cost, estimate_cost, estimate_tokens, get_pricing, ModelPricing};
