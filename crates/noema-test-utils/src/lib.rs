// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the Noema workspace.
//!
//! [`ScriptedModel`] implements [`RemoteModel`] against a queue of canned
//! responses and records every request it receives, so tests can assert on
//! exactly which calls were (or were not) made.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use noema_core::{ModelRequest, ModelResponse, NoemaError, RemoteModel, TokenUsage};

/// A scripted response step.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Return this response.
    Respond(ModelResponse),
    /// Fail with a provider error carrying this message.
    Fail(String),
}

/// Mock remote model: pops scripted steps, records calls.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<ModelRequest>>,
    embed_calls: Mutex<Vec<(String, Vec<String>)>>,
    embed_dimensions: usize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            embed_dimensions: 8,
            ..Default::default()
        }
    }

    /// Queue a plain-text response with the given usage.
    pub fn push_response(&self, content: &str, input_tokens: u32, output_tokens: u32) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Scripted::Respond(ModelResponse {
                content: content.to_string(),
                usage: TokenUsage::new(input_tokens, output_tokens),
            }));
    }

    /// Queue a JSON response that self-reports `confidence`.
    pub fn push_confident_response(
        &self,
        answer: &str,
        confidence: f64,
        input_tokens: u32,
        output_tokens: u32,
    ) {
        let content = serde_json::json!({
            "answer": answer,
            "confidence": confidence,
        })
        .to_string();
        self.push_response(&content, input_tokens, output_tokens);
    }

    /// Queue a provider failure.
    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Number of chat completions requested.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }

    /// Batch embedding calls received so far.
    pub fn embed_calls(&self) -> Vec<(String, Vec<String>)> {
        self.embed_calls
            .lock()
            .expect("embed calls lock poisoned")
            .clone()
    }
}

#[async_trait]
impl RemoteModel for ScriptedModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, NoemaError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(request);
        let step = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(Scripted::Fail("script exhausted".to_string()));
        match step {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(message) => Err(NoemaError::provider(message)),
        }
    }

    async fn embed_batch(
        &self,
        model: &str,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>, NoemaError> {
        self.embed_calls
            .lock()
            .expect("embed calls lock poisoned")
            .push((model.to_string(), inputs.to_vec()));
        // Deterministic per-input vectors: seeded by input length.
        Ok(inputs
            .iter()
            .map(|input| {
                let seed = input.len() as f32;
                (0..self.embed_dimensions)
                    .map(|i| ((seed + i as f32) % 7.0) / 7.0)
                    .collect()
            })
            .collect())
    }
}
