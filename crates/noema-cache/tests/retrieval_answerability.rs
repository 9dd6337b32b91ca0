// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval feeding answerability: the two stages must agree on what
//! counts as usable evidence.

use noema_cache::retrieve;
use noema_config::RetrievalConfig;
use noema_core::CorpusNote;
use noema_engine::assess_answerability;

fn note(id: &str, title: &str, content: &str) -> CorpusNote {
    CorpusNote {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at: "2026-08-01T00:00:00Z".to_string(),
    }
}

#[test]
fn french_meeting_note_is_retrieved_and_answerable() {
    let corpus = vec![
        note(
            "n1",
            "Réunion client",
            "Préparer les slides. La réunion est demain à 10h.",
        ),
        note("n2", "Courses", "lait, œufs, pain"),
        note("n3", "Jardin", "planter les tomates ce week-end"),
    ];

    let retrieval = retrieve("réunion demain", &corpus, &RetrievalConfig::default());
    assert!(!retrieval.chunks.is_empty());
    assert_eq!(retrieval.chunks[0].source_id, "n1");
    assert!(retrieval.chunks[0].score > 0.0);

    let assessment = assess_answerability("réunion demain", &retrieval.chunks);
    assert!(
        assessment.can_answer,
        "retrieved note should answer the query: {}",
        assessment.reasoning
    );
    assert!(assessment.coverage_score >= 1.0 - f64::EPSILON);
}

#[test]
fn empty_corpus_yields_no_results_and_a_confident_no() {
    let retrieval = retrieve("anything", &[], &RetrievalConfig::default());
    assert!(retrieval.chunks.is_empty());
    assert_eq!(retrieval.optimizations, vec!["no-results"]);

    let assessment = assess_answerability("anything", &retrieval.chunks);
    assert!(!assessment.can_answer);
    assert!((assessment.confidence - 0.9).abs() < f64::EPSILON);
}

#[test]
fn off_topic_corpus_retrieves_nothing_useful() {
    let corpus = vec![
        note("n1", "Groceries", "milk and bread"),
        note("n2", "Workout", "leg day routine"),
    ];
    let retrieval = retrieve(
        "quarterly tax filing deadline",
        &corpus,
        &RetrievalConfig::default(),
    );
    // Either nothing comes back, or what does cannot answer the query.
    let assessment =
        assess_answerability("quarterly tax filing deadline", &retrieval.chunks);
    assert!(!assessment.can_answer);
}
