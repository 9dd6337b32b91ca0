// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Noema hybrid inference orchestration layer.
//!
//! This crate provides the error type, the shared domain types, and the
//! [`RemoteModel`] trait implemented by LLM provider integrations. All other
//! Noema crates build on these definitions.

pub mod error;
pub mod remote;
pub mod types;

pub use error::NoemaError;
pub use remote::{ModelRequest, ModelResponse, RemoteModel, ResponseFormat};
pub use types::{
    Chunk, CorpusNote, ModelTier, Operation, Origin, Priority, TextUnit, TokenUsage,
};
