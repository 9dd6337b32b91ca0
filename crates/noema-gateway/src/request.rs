// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The gateway's JSON request/response contract.
//!
//! One shape for everything: a single task or a batched task array, in and
//! out. Batches are processed in order and answered positionally.

use serde::{Deserialize, Serialize};

use noema_core::{Operation, Priority, ResponseFormat};

/// How the gateway may move between model tiers for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Start cheap, escalate once on low confidence.
    #[default]
    Auto,
    /// Stay on the initial model; never escalate.
    PinInitial,
    /// Start directly on the escalation model.
    PinEscalation,
}

/// Model call parameters. Part of the fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Default for TaskParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            response_format: ResponseFormat::Text,
        }
    }
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

/// One task submitted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub user_id: String,
    pub operation: Operation,
    pub input: String,
    #[serde(default)]
    pub system_instructions: Option<String>,
    #[serde(default)]
    pub routing_mode: RoutingMode,
    #[serde(default)]
    pub params: TaskParams,
    #[serde(default)]
    pub priority: Priority,
}

/// Terminal status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Completed; `result` is populated.
    Ok,
    /// Budget gate rejected the request outright.
    Denied,
    /// Budget gate rejected a low-priority request; retry later.
    Deferred,
    /// The remote call failed; `reason` carries the provider message.
    Failed,
}

/// One task's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub status: TaskStatus,
    pub operation: Operation,
    /// Model that produced the result (the superseding one if escalated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Text content for chat-style operations, vector for embeddings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub cache_hit: bool,
    pub escalated: bool,
    /// Realized cost of this request (0 for hits and rejections).
    pub cost_usd: f64,
    /// Model-reported confidence, when the operation carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub fingerprint: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A single task or a batch -- same wire shape either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskEnvelope {
    Single(Box<TaskRequest>),
    Batch(Vec<TaskRequest>),
}

/// Response envelope mirroring the request shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Single(Box<TaskResponse>),
    Batch(Vec<TaskResponse>),
}
