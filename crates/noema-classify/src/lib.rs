// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complexity classification for the Noema orchestration layer.
//!
//! [`Classifier`] scores text plus request context into a 0..1 complexity
//! score and suggests a local or remote execution tier. Zero cost, zero
//! latency, fully deterministic.

pub mod classifier;

pub use classifier::{
    Classifier, ClassifyContext, ComplexityFactors, ComplexityScore, UserPlan,
};
