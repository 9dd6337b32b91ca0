// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local inference engine for the Noema orchestration layer.
//!
//! Four pure, no-network capabilities, each returning a confidence score:
//!
//! - **summarize**: extractive summarization with quality validation and a
//!   truncation fallback
//! - **embed**: deterministic multi-hash embeddings
//! - **categorize**: keyword-bucket life-domain classification
//! - **assess_answerability**: can retrieved chunks answer this query?
//!
//! [`LocalEngine`] wraps the pure functions with bounded per-capability
//! memoization. Construct one per process/session and inject it; there is
//! no global state.

pub mod answerability;
pub mod categorize;
pub mod embed;
pub mod memo;
pub mod summarize;
pub mod text;

pub use answerability::{assess_answerability, Answerability};
pub use categorize::{categorize, Categorization, Polarity, Sentiment};
pub use embed::{embed, EmbedOptions, LocalEmbedding};
pub use summarize::{summarize, SummarizeOptions, Summary, SummaryStyle};

use noema_config::EngineConfig;
use noema_core::Chunk;

use memo::{memo_key, MemoCache};

/// The local inference engine: pure capabilities plus per-capability
/// output memoization.
pub struct LocalEngine {
    config: EngineConfig,
    summarize_memo: MemoCache<Summary>,
    embed_memo: MemoCache<LocalEmbedding>,
    categorize_memo: MemoCache<Categorization>,
    assess_memo: MemoCache<Answerability>,
}

impl LocalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let capacity = config.memo_capacity;
        Self {
            config,
            summarize_memo: MemoCache::new(capacity),
            embed_memo: MemoCache::new(capacity),
            categorize_memo: MemoCache::new(capacity),
            assess_memo: MemoCache::new(capacity),
        }
    }

    /// Summarization options derived from configuration defaults.
    pub fn default_summarize_options(&self) -> SummarizeOptions {
        SummarizeOptions {
            max_length: self.config.summary_max_length,
            style: SummaryStyle::Concise,
            min_quality: self.config.summary_min_quality,
        }
    }

    /// Embedding options derived from configuration defaults.
    pub fn default_embed_options(&self) -> EmbedOptions {
        EmbedOptions {
            dimensions: self.config.embedding_dimensions,
            ..Default::default()
        }
    }

    pub fn summarize(&self, text: &str, options: &SummarizeOptions) -> Summary {
        let key = memo_key(
            "summarize",
            text,
            &format!(
                "{}|{:?}|{}",
                options.max_length, options.style, options.min_quality
            ),
        );
        if let Some(hit) = self.summarize_memo.get(&key) {
            return hit;
        }
        let result = summarize(text, options);
        self.summarize_memo.insert(key, result.clone());
        result
    }

    pub fn embed(&self, text: &str, options: &EmbedOptions) -> LocalEmbedding {
        let key = memo_key(
            "embed",
            text,
            &format!("{}|{}", options.dimensions, options.model),
        );
        if let Some(hit) = self.embed_memo.get(&key) {
            return hit;
        }
        let result = embed(text, options);
        self.embed_memo.insert(key, result.clone());
        result
    }

    pub fn categorize(&self, text: &str) -> Categorization {
        let key = memo_key("categorize", text, "");
        if let Some(hit) = self.categorize_memo.get(&key) {
            return hit;
        }
        let result = categorize(text);
        self.categorize_memo.insert(key, result.clone());
        result
    }

    pub fn assess_answerability(&self, query: &str, chunks: &[Chunk]) -> Answerability {
        // Chunk identity participates in the key: same query over different
        // evidence must not collide.
        let mut chunk_sig = String::new();
        for c in chunks {
            chunk_sig.push_str(&c.id);
            chunk_sig.push('|');
            chunk_sig.push_str(&format!("{:.4};", c.score));
        }
        let key = memo_key("assess", query, &chunk_sig);
        if let Some(hit) = self.assess_memo.get(&key) {
            return hit;
        }
        let result = assess_answerability(query, chunks);
        self.assess_memo.insert(key, result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LocalEngine {
        LocalEngine::new(EngineConfig::default())
    }

    #[test]
    fn summarize_is_memoized() {
        let e = engine();
        let options = e.default_summarize_options();
        let text = "First sentence about the garden. Second sentence about the harvest. \
                    Third sentence about the tomatoes and the squash vines in the corner.";
        let a = e.summarize(text, &options);
        assert_eq!(e.summarize_memo.len(), 1);
        let b = e.summarize(text, &options);
        assert_eq!(a, b);
        assert_eq!(e.summarize_memo.len(), 1, "second call must hit the memo");
    }

    #[test]
    fn different_options_miss_the_memo() {
        let e = engine();
        let text = "Some note text about meetings and deadlines at the office.";
        let _ = e.summarize(
            text,
            &SummarizeOptions {
                max_length: 100,
                ..Default::default()
            },
        );
        let _ = e.summarize(
            text,
            &SummarizeOptions {
                max_length: 50,
                ..Default::default()
            },
        );
        assert_eq!(e.summarize_memo.len(), 2);
    }

    #[test]
    fn embed_respects_configured_dimensions() {
        let e = engine();
        let options = e.default_embed_options();
        let result = e.embed("garden harvest notes", &options);
        assert_eq!(result.dimensions, EngineConfig::default().embedding_dimensions);
    }

    #[test]
    fn assess_key_includes_chunks() {
        let e = engine();
        let chunks_a = vec![Chunk {
            id: "c1".into(),
            content: "the meeting is tomorrow".into(),
            score: 1.0,
            source_id: "n1".into(),
        }];
        let a = e.assess_answerability("meeting tomorrow", &chunks_a);
        let b = e.assess_answerability("meeting tomorrow", &[]);
        assert_ne!(a.can_answer, b.can_answer);
        assert_eq!(e.assess_memo.len(), 2);
    }

    #[test]
    fn categorize_is_memoized() {
        let e = engine();
        let _ = e.categorize("dinner party with friends");
        let _ = e.categorize("dinner party with friends");
        assert_eq!(e.categorize_memo.len(), 1);
    }
}
