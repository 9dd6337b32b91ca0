// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestration: classifier and local engine in front, the
//! gateway behind them, money only spent when the local path gives up.

use std::sync::Arc;

use noema_cache::retrieve;
use noema_classify::{Classifier, ClassifyContext, UserPlan};
use noema_config::{ClassifierConfig, CostConfig, EngineConfig, GatewayConfig, RetrievalConfig};
use noema_core::{CorpusNote, ModelTier, Operation, Priority};
use noema_engine::LocalEngine;
use noema_gateway::{Gateway, RoutingMode, TaskParams, TaskRequest, TaskStatus};
use noema_test_utils::ScriptedModel;

fn note(id: &str, title: &str, content: &str) -> CorpusNote {
    CorpusNote {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at: "2026-08-01T00:00:00Z".to_string(),
    }
}

async fn gateway(model: Arc<ScriptedModel>, daily_limit: f64) -> Gateway {
    let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
    let cost_config = CostConfig {
        default_daily_limit_usd: daily_limit,
        ..Default::default()
    };
    Gateway::open(conn, model, GatewayConfig::default(), cost_config)
        .await
        .unwrap()
}

fn answer_task(user: &str, input: &str) -> TaskRequest {
    TaskRequest {
        user_id: user.to_string(),
        operation: Operation::Answer,
        input: input.to_string(),
        system_instructions: Some("Answer from the provided context only.".to_string()),
        routing_mode: RoutingMode::Auto,
        params: TaskParams::default(),
        priority: Priority::Normal,
    }
}

#[tokio::test]
async fn locally_answerable_query_never_reaches_the_model() {
    let remote = Arc::new(ScriptedModel::new());
    let _gateway = gateway(Arc::clone(&remote), 1.0).await;

    let classifier = Classifier::new(ClassifierConfig::default());
    let engine = LocalEngine::new(EngineConfig::default());
    let corpus = vec![note(
        "n1",
        "Réunion client",
        "La réunion est demain à 10h avec l'équipe projet.",
    )];

    let query = "réunion demain";
    let score = classifier.classify(query, &ClassifyContext::default());
    assert_eq!(score.suggested_tier, ModelTier::Local);

    let retrieval = retrieve(query, &corpus, &RetrievalConfig::default());
    let assessment = engine.assess_answerability(query, &retrieval.chunks);
    assert!(assessment.can_answer);

    // Local path sufficed: the remote model was never invoked.
    assert_eq!(remote.call_count(), 0);
    assert_eq!(remote.embed_calls().len(), 0);
}

#[tokio::test]
async fn empty_corpus_short_circuits_before_spending() {
    let remote = Arc::new(ScriptedModel::new());
    let gw = gateway(Arc::clone(&remote), 1.0).await;

    let retrieval = retrieve("what did I plan", &[], &RetrievalConfig::default());
    assert_eq!(retrieval.optimizations, vec!["no-results"]);

    // The caller records the no-results optimization and stops; nothing is
    // billed and no audit row exists for the would-be request.
    assert_eq!(remote.call_count(), 0);
    let entry = gw
        .governor()
        .ledger()
        .entry("ada", &noema_cost::BudgetLedger::today())
        .await
        .unwrap();
    assert_eq!(entry.spent_usd, 0.0);
}

#[tokio::test]
async fn unanswerable_query_escalates_to_the_gateway() {
    let remote = Arc::new(ScriptedModel::new());
    remote.push_confident_response("Your flight leaves Monday 9am.", 0.9, 300, 40);
    let gw = gateway(Arc::clone(&remote), 1.0).await;

    let engine = LocalEngine::new(EngineConfig::default());
    let corpus = vec![note("n1", "Groceries", "milk and bread")];

    let query = "when does my flight leave";
    let retrieval = retrieve(query, &corpus, &RetrievalConfig::default());
    let assessment = engine.assess_answerability(query, &retrieval.chunks);
    assert!(!assessment.can_answer, "local evidence is insufficient");

    // Remote path: governor pre-check happens inside the gateway.
    let response = gw.handle(answer_task("ada", query)).await.unwrap();
    assert_eq!(response.status, TaskStatus::Ok);
    assert_eq!(remote.call_count(), 1);
    assert!(response.cost_usd > 0.0);

    let entry = gw
        .governor()
        .ledger()
        .entry("ada", &noema_cost::BudgetLedger::today())
        .await
        .unwrap();
    assert!((entry.spent_usd - response.cost_usd).abs() < 1e-10);
}

#[tokio::test]
async fn free_tier_scenario_denies_or_defers_at_the_edge() {
    let remote = Arc::new(ScriptedModel::new());
    let gw = gateway(Arc::clone(&remote), 0.50).await;

    // Spend $0.49 of the $0.50 limit.
    gw.governor()
        .ledger()
        .apply_spend(noema_cost::SpendRecord {
            user_id: "free-user".to_string(),
            date: noema_cost::BudgetLedger::today(),
            cost_usd: 0.49,
            tokens_in: 140_000,
            tokens_out: 4_000,
        })
        .await
        .unwrap();

    let decision = gw
        .governor()
        .should_proceed("free-user", Operation::Answer, 10_000, 0.05, Priority::High)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.suggested_action, noema_cost::SuggestedAction::Deny);

    let decision = gw
        .governor()
        .should_proceed("free-user", Operation::Answer, 10_000, 0.05, Priority::Low)
        .await
        .unwrap();
    assert_eq!(decision.suggested_action, noema_cost::SuggestedAction::Defer);

    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn paid_user_classification_steers_hard_queries_remote() {
    let classifier = Classifier::new(ClassifierConfig::default());
    let context = ClassifyContext {
        audio_duration_secs: Some(900.0),
        turn_count: 6,
        plan: UserPlan::Paid,
    };
    let transcript = "I'm worried about the contract deadline and the quarterly \
                      budget compliance review, the insurance liability questions \
                      keep piling up and the stakeholder negotiation milestone slipped. "
        .repeat(8);
    let score = classifier.classify(&transcript, &context);
    assert_eq!(score.suggested_tier, ModelTier::Remote);
}
