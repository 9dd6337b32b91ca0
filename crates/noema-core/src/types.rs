// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Noema workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a piece of text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum Origin {
    /// A user query to be answered.
    Query,
    /// A note or document from the corpus.
    Document,
    /// Text produced by voice transcription.
    Transcript,
}

/// An input string with its origin tag. Immutable once scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    text: String,
    origin: Origin,
}

impl TextUnit {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// The text operations the orchestration layer supports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Condense text into a shorter form.
    Summarize,
    /// Assign a life-domain category, tags, emotion, and sentiment.
    Categorize,
    /// Produce a vector embedding.
    Embed,
    /// Retrieval-augmented answer to a query.
    Answer,
}

/// Execution path for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// On-device heuristics, zero marginal cost.
    Local,
    /// Paid remote model.
    Remote,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Local => write!(f, "local"),
            ModelTier::Remote => write!(f, "remote"),
        }
    }
}

/// Request priority, consulted by the cost governor when budget runs low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work (proactive briefs, re-indexing). Deferred under pressure.
    Low,
    /// Interactive requests.
    #[default]
    Normal,
    /// User-facing requests that should fail loudly rather than silently wait.
    High,
}

/// Token counts reported by a remote model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request (prompt side).
    pub input_tokens: u32,
    /// Tokens in the response.
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// A bounded excerpt of corpus content assembled for retrieval-augmented answering.
///
/// Transient: built per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk identifier, unique within one retrieval result.
    pub id: String,
    /// Cleaned, truncated excerpt text.
    pub content: String,
    /// Retrieval relevance score.
    pub score: f64,
    /// Identifier of the corpus note this chunk came from.
    pub source_id: String,
}

/// A note yielded by the corpus reader.
///
/// No ordering guarantee beyond per-call stability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusNote {
    pub id: String,
    pub title: String,
    pub content: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}
