// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote model trait -- the seam between the gateway and a paid LLM endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NoemaError;
use crate::types::TokenUsage;

/// Requested response shape for a chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// The model is asked to return a single JSON object.
    Json,
}

/// A chat completion request to a remote model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Model identifier (e.g., "claude-haiku-4-5-20250901").
    pub model: String,
    /// System prompt, if any.
    pub system_prompt: Option<String>,
    /// User-turn prompt.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Requested response shape.
    pub response_format: ResponseFormat,
}

/// A chat completion response from a remote model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Generated content.
    pub content: String,
    /// Token usage reported by the provider.
    pub usage: TokenUsage,
}

/// The remote LLM endpoint the gateway calls.
///
/// One implementation per provider; tests use a scripted mock.
#[async_trait]
pub trait RemoteModel: Send + Sync {
    /// Sends a chat completion request and returns the full response.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, NoemaError>;

    /// Embeds a batch of inputs, returning one vector per input in order.
    async fn embed_batch(
        &self,
        model: &str,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>, NoemaError>;
}
