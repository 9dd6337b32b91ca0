// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The gateway request sequence.
//!
//! Every task walks: fingerprint → cache check → budget check → model call
//! (→ one bounded escalation) → cache write → ledger+audit settlement.
//! The cache write lands before the ledger write on purpose: it is
//! idempotent by fingerprint, so a crash between the two leaves a cached
//! result and no charge, and the retried request becomes a hit instead of a
//! second bill.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use noema_config::{CostConfig, GatewayConfig};
use noema_core::{
    ModelRequest, NoemaError, Operation, RemoteModel, TokenUsage,
};
use noema_cost::{estimate_cost, estimate_tokens, BudgetLedger, CostGovernor, SpendRecord, SuggestedAction};

use crate::escalation::EscalationPolicy;
use crate::fingerprint::fingerprint;
use crate::request::{
    ResponseEnvelope, RoutingMode, TaskEnvelope, TaskRequest, TaskResponse, TaskStatus,
};
use crate::store::{AuditLogEntry, CacheEntry, GatewayStore};

/// Assumed self-confidence when a chat response does not report one.
///
/// The self-report is trusted as-is either way; see [`EscalationPolicy`]
/// for the fidelity gap this implies.
const DEFAULT_SELF_CONFIDENCE: f64 = 0.8;

/// The server-side request gateway.
pub struct Gateway {
    store: GatewayStore,
    governor: CostGovernor,
    model: Arc<dyn RemoteModel>,
    policy: EscalationPolicy,
    config: GatewayConfig,
}

impl Gateway {
    /// Build a gateway over one SQLite connection (cache, audit, and ledger
    /// share it so settlements are transactional).
    pub async fn open(
        conn: tokio_rusqlite::Connection,
        model: Arc<dyn RemoteModel>,
        config: GatewayConfig,
        cost_config: CostConfig,
    ) -> Result<Self, NoemaError> {
        let ledger =
            BudgetLedger::open(conn.clone(), cost_config.default_daily_limit_usd).await?;
        let governor = CostGovernor::new(ledger, cost_config);
        let store = GatewayStore::open(conn).await?;
        let policy = EscalationPolicy::from_config(&config);
        Ok(Self {
            store,
            governor,
            model,
            policy,
            config,
        })
    }

    pub fn governor(&self) -> &CostGovernor {
        &self.governor
    }

    pub fn store(&self) -> &GatewayStore {
        &self.store
    }

    /// Process one task to a terminal state, writing exactly one audit row
    /// for every path that reaches one. Remote failures propagate; the
    /// batch entry points translate them into failed task responses.
    pub async fn handle(&self, request: TaskRequest) -> Result<TaskResponse, NoemaError> {
        let started = Instant::now();
        let fp = fingerprint(&request);

        // Cache check. A read failure is a warning and a miss, never a
        // request failure.
        match self.store.cache_get(&fp).await {
            Ok(Some(hit)) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                self.store
                    .insert_audit(AuditLogEntry::new(
                        &request.user_id,
                        &request.operation.to_string(),
                        &hit.model,
                        0,
                        0,
                        0.0,
                        latency_ms,
                        true,
                        &fp,
                    ))
                    .await?;
                info!(fingerprint = %fp, user_id = %request.user_id, "cache hit");
                return Ok(TaskResponse {
                    status: TaskStatus::Ok,
                    operation: request.operation,
                    model: Some(hit.model),
                    result: Some(hit.result),
                    cache_hit: true,
                    escalated: false,
                    cost_usd: 0.0,
                    confidence: None,
                    fingerprint: fp,
                    latency_ms,
                    reason: None,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache read failed, proceeding as a miss"),
        }

        // Budget check, before any remote call.
        let initial_model = self.initial_model(&request);
        let est_in = estimate_tokens(&request.input)
            + estimate_tokens(request.system_instructions.as_deref().unwrap_or(""));
        let est_out = match request.operation {
            Operation::Embed => 0,
            _ => request.params.max_tokens,
        };
        let est_cost = estimate_cost(&initial_model, est_in, est_out);
        let decision = self
            .governor
            .should_proceed(
                &request.user_id,
                request.operation,
                est_in + est_out,
                est_cost,
                request.priority,
            )
            .await?;

        if !decision.allowed {
            let latency_ms = started.elapsed().as_millis() as u64;
            self.store
                .insert_audit(AuditLogEntry::new(
                    &request.user_id,
                    &request.operation.to_string(),
                    &initial_model,
                    0,
                    0,
                    0.0,
                    latency_ms,
                    false,
                    &fp,
                ))
                .await?;
            let status = match decision.suggested_action {
                SuggestedAction::Defer => TaskStatus::Deferred,
                _ => TaskStatus::Denied,
            };
            return Ok(TaskResponse {
                status,
                operation: request.operation,
                model: None,
                result: None,
                cache_hit: false,
                escalated: false,
                cost_usd: 0.0,
                confidence: None,
                fingerprint: fp,
                latency_ms,
                reason: decision.reason,
            });
        }

        // Remote call(s).
        let outcome = match request.operation {
            Operation::Embed => self.run_embed(&request, est_in).await?,
            _ => self.run_chat(&request, &initial_model, est_in, est_out).await?,
        };

        // Cache write first (idempotent), then the transactional settlement.
        let ttl_secs = match request.operation {
            Operation::Embed => self.config.embedding_ttl_secs,
            _ => self.config.result_ttl_secs,
        };
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs as i64;
        if let Err(e) = self
            .store
            .cache_put(CacheEntry {
                fingerprint: fp.clone(),
                result: outcome.result.clone(),
                model: outcome.model.clone(),
                tokens_estimated: est_in + est_out,
                expires_at,
            })
            .await
        {
            warn!(error = %e, "cache write failed, serving result uncached");
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        self.store
            .record_completion(
                SpendRecord {
                    user_id: request.user_id.clone(),
                    date: BudgetLedger::today(),
                    cost_usd: outcome.cost_usd,
                    tokens_in: u64::from(outcome.usage.input_tokens),
                    tokens_out: u64::from(outcome.usage.output_tokens),
                },
                AuditLogEntry::new(
                    &request.user_id,
                    &request.operation.to_string(),
                    &outcome.model,
                    outcome.usage.input_tokens,
                    outcome.usage.output_tokens,
                    outcome.cost_usd,
                    latency_ms,
                    false,
                    &fp,
                ),
            )
            .await?;

        Ok(TaskResponse {
            status: TaskStatus::Ok,
            operation: request.operation,
            model: Some(outcome.model),
            result: Some(outcome.result),
            cache_hit: false,
            escalated: outcome.escalated,
            cost_usd: outcome.cost_usd,
            confidence: outcome.confidence,
            fingerprint: fp,
            latency_ms,
            reason: None,
        })
    }

    /// Process a batch in order. A task whose remote call fails becomes a
    /// `Failed` response; it does not poison the rest of the batch.
    pub async fn handle_many(&self, requests: Vec<TaskRequest>) -> Vec<TaskResponse> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            let operation = request.operation;
            let fp = fingerprint(&request);
            match self.handle(request).await {
                Ok(response) => responses.push(response),
                Err(e) => {
                    warn!(error = %e, fingerprint = %fp, "task failed");
                    responses.push(TaskResponse {
                        status: TaskStatus::Failed,
                        operation,
                        model: None,
                        result: None,
                        cache_hit: false,
                        escalated: false,
                        cost_usd: 0.0,
                        confidence: None,
                        fingerprint: fp,
                        latency_ms: 0,
                        reason: Some(e.to_string()),
                    });
                }
            }
        }
        responses
    }

    /// JSON entry point: identical shape for a single task or a batch.
    pub async fn handle_json(
        &self,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, NoemaError> {
        let envelope: TaskEnvelope = serde_json::from_value(payload)
            .map_err(|e| NoemaError::Internal(format!("invalid task envelope: {e}")))?;
        let response = match envelope {
            TaskEnvelope::Single(task) => {
                let mut responses = self.handle_many(vec![*task]).await;
                ResponseEnvelope::Single(Box::new(responses.remove(0)))
            }
            TaskEnvelope::Batch(tasks) => {
                ResponseEnvelope::Batch(self.handle_many(tasks).await)
            }
        };
        serde_json::to_value(response).map_err(NoemaError::storage)
    }

    fn initial_model(&self, request: &TaskRequest) -> String {
        match request.operation {
            Operation::Embed => self.config.embedding_model.clone(),
            _ => match request.routing_mode {
                RoutingMode::PinEscalation => self.config.escalation_model.clone(),
                _ => self.config.initial_model.clone(),
            },
        }
    }

    async fn run_embed(
        &self,
        request: &TaskRequest,
        est_in: u32,
    ) -> Result<CallOutcome, NoemaError> {
        let model = self.config.embedding_model.clone();
        let vectors = self
            .model
            .embed_batch(&model, std::slice::from_ref(&request.input))
            .await?;
        let vector = vectors.into_iter().next().ok_or_else(|| {
            NoemaError::provider("embedding endpoint returned no vectors")
        })?;
        // Embedding endpoints report no usage; bill the token estimate.
        let usage = TokenUsage::new(est_in, 0);
        let cost_usd = CostGovernor::realized_cost(&model, &usage);
        Ok(CallOutcome {
            result: serde_json::json!(vector),
            model,
            usage,
            cost_usd,
            confidence: None,
            escalated: false,
        })
    }

    async fn run_chat(
        &self,
        request: &TaskRequest,
        initial_model: &str,
        est_in: u32,
        est_out: u32,
    ) -> Result<CallOutcome, NoemaError> {
        let first = self
            .model
            .complete(self.model_request(request, initial_model))
            .await?;
        let mut usage = first.usage;
        let mut cost_usd = CostGovernor::realized_cost(initial_model, &first.usage);
        let mut content = first.content;
        let mut used_model = initial_model.to_string();
        let mut confidence = extract_confidence(&content);
        let mut escalated = false;

        if request.routing_mode == RoutingMode::Auto {
            let stronger = &self.config.escalation_model;
            let extra_cost = estimate_cost(stronger, est_in, est_out);
            let entry = self
                .governor
                .ledger()
                .entry(&request.user_id, &BudgetLedger::today())
                .await?;
            // The first call is not settled yet; subtract it from what the
            // ledger still shows as remaining.
            let remaining = (entry.remaining_usd() - cost_usd).max(0.0);
            if self.policy.should_escalate(1, confidence, extra_cost, remaining) {
                info!(
                    confidence,
                    from = %used_model,
                    to = %stronger,
                    "low confidence, escalating once"
                );
                match self
                    .model
                    .complete(self.model_request(request, stronger))
                    .await
                {
                    Ok(second) => {
                        cost_usd += CostGovernor::realized_cost(stronger, &second.usage);
                        usage = TokenUsage::new(
                            usage.input_tokens + second.usage.input_tokens,
                            usage.output_tokens + second.usage.output_tokens,
                        );
                        content = second.content;
                        used_model = stronger.clone();
                        confidence = extract_confidence(&content);
                        escalated = true;
                    }
                    // The first result exists; a failed upgrade is a
                    // warning, not a lost request.
                    Err(e) => warn!(error = %e, "escalation call failed, keeping initial result"),
                }
            }
        }

        Ok(CallOutcome {
            result: serde_json::Value::String(content),
            model: used_model,
            usage,
            cost_usd,
            confidence: Some(confidence),
            escalated,
        })
    }

    fn model_request(&self, request: &TaskRequest, model: &str) -> ModelRequest {
        ModelRequest {
            model: model.to_string(),
            system_prompt: request.system_instructions.clone(),
            user_prompt: request.input.clone(),
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            response_format: request.params.response_format,
        }
    }
}

struct CallOutcome {
    result: serde_json::Value,
    model: String,
    usage: TokenUsage,
    cost_usd: f64,
    confidence: Option<f64>,
    escalated: bool,
}

/// Read the model's self-reported confidence from a JSON payload, falling
/// back to a conservative default for plain-text responses.
fn extract_confidence(content: &str) -> f64 {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|v| v.get("confidence")?.as_f64())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_SELF_CONFIDENCE)
}
