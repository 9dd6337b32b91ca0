// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request fingerprinting.
//!
//! The fingerprint is a pure function of the logically relevant request
//! fields: operation, normalized input, system instructions, routing mode,
//! and parameters. Identical logical requests always collide -- that is what
//! makes the result cache and crash-retry idempotency work.

use sha2::{Digest, Sha256};

use crate::request::TaskRequest;

/// Whitespace-normalize an input: trim and collapse internal runs.
///
/// Case is preserved: a differently cased prompt is a different request.
pub fn normalize_input(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable sha-256 fingerprint over a request's logically relevant fields.
pub fn fingerprint(request: &TaskRequest) -> String {
    let fields = [
        request.operation.to_string(),
        normalize_input(&request.input),
        request.system_instructions.clone().unwrap_or_default(),
        format!("{:?}", request.routing_mode),
        format!(
            "{:.3}|{}|{:?}",
            request.params.temperature, request.params.max_tokens, request.params.response_format
        ),
    ];
    let mut hasher = Sha256::new();
    for field in &fields {
        hasher.update(field.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}
