// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-bucket categorization over a fixed life-domain taxonomy, with
//! emotion and sentiment read from small fixed lexicons.

use serde::{Deserialize, Serialize};

use crate::text::terms;

/// Result of categorizing a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    /// Winning life-domain category, or "general" when nothing matched.
    pub category: String,
    /// Reliability of the category assignment, in [0, 1].
    pub confidence: f64,
    /// Matched taxonomy keywords, deduplicated, at most five.
    pub tags: Vec<String>,
    /// Majority emotion bucket, when any emotion word matched.
    pub emotion: Option<String>,
    /// Naive polarity from positive/negative word counts.
    pub sentiment: Option<Sentiment>,
}

/// Polarity label with its raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: Polarity,
    /// (positive − negative) / (positive + negative), in [-1, 1].
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Fixed life-domain taxonomy.
const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "work",
        &[
            "meeting", "deadline", "project", "client", "manager", "office",
            "presentation", "colleague", "interview", "promotion", "standup",
            "review",
        ],
    ),
    (
        "health",
        &[
            "doctor", "appointment", "medication", "exercise", "sleep",
            "headache", "dentist", "therapy", "workout", "diet", "symptom",
        ],
    ),
    (
        "family",
        &[
            "mom", "dad", "mother", "father", "sister", "brother", "kids",
            "daughter", "son", "grandma", "grandpa", "wife", "husband",
            "birthday", "anniversary",
        ],
    ),
    (
        "finance",
        &[
            "budget", "rent", "mortgage", "invoice", "salary", "savings",
            "taxes", "insurance", "loan", "bill", "payment", "refund",
        ],
    ),
    (
        "travel",
        &[
            "flight", "hotel", "trip", "vacation", "airport", "passport",
            "booking", "itinerary", "luggage", "train",
        ],
    ),
    (
        "learning",
        &[
            "course", "book", "study", "lecture", "tutorial", "exam",
            "practice", "language", "reading", "homework",
        ],
    ),
    (
        "social",
        &[
            "dinner", "party", "friend", "wedding", "concert", "drinks",
            "brunch", "reunion", "gathering", "barbecue",
        ],
    ),
    (
        "home",
        &[
            "garden", "kitchen", "repair", "cleaning", "furniture",
            "plumber", "laundry", "groceries", "renovation", "garage",
        ],
    ),
];

/// Fixed emotion lexicon.
const EMOTIONS: &[(&str, &[&str])] = &[
    (
        "joy",
        &["happy", "glad", "excited", "thrilled", "delighted", "proud", "grateful"],
    ),
    (
        "sadness",
        &["sad", "down", "grief", "lonely", "miserable", "heartbroken", "disappointed"],
    ),
    (
        "anger",
        &["angry", "furious", "annoyed", "frustrated", "irritated", "outraged"],
    ),
    (
        "fear",
        &["afraid", "scared", "worried", "anxious", "nervous", "terrified"],
    ),
    (
        "surprise",
        &["surprised", "shocked", "amazed", "stunned", "unexpected"],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "wonderful", "love", "nice", "perfect", "enjoyed",
    "amazing", "happy", "excellent", "fantastic", "success",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "hate", "awful", "horrible", "worst", "failed",
    "problem", "wrong", "broken", "missed", "late",
];

/// Categorize a text. Always returns a category: with no taxonomy hits it
/// degrades to "general" at low confidence rather than failing.
pub fn categorize(text: &str) -> Categorization {
    let words = terms(text);
    if words.is_empty() {
        return Categorization {
            category: "general".to_string(),
            confidence: 0.0,
            tags: Vec::new(),
            emotion: None,
            sentiment: None,
        };
    }

    let mut best: (&str, usize) = ("general", 0);
    let mut total_hits = 0usize;
    let mut tags: Vec<String> = Vec::new();
    for (category, keywords) in TAXONOMY {
        let mut hits = 0;
        for word in &words {
            if keywords.contains(&word.as_str()) {
                hits += 1;
                if !tags.contains(word) && tags.len() < 5 {
                    tags.push(word.clone());
                }
            }
        }
        total_hits += hits;
        if hits > best.1 {
            best = (category, hits);
        }
    }

    let confidence = if total_hits == 0 {
        0.2
    } else {
        // Share of hits in the winning bucket, tempered by overall evidence.
        let dominance = best.1 as f64 / total_hits as f64;
        let evidence = (total_hits as f64 / 5.0).min(1.0);
        (0.4 * evidence + 0.6 * dominance).clamp(0.0, 1.0)
    };

    Categorization {
        category: best.0.to_string(),
        confidence,
        tags,
        emotion: majority_emotion(&words),
        sentiment: sentiment(&words),
    }
}

fn majority_emotion(words: &[String]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (emotion, lexicon) in EMOTIONS {
        let hits = words
            .iter()
            .filter(|w| lexicon.contains(&w.as_str()))
            .count();
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((emotion, hits));
        }
    }
    best.map(|(emotion, _)| emotion.to_string())
}

fn sentiment(words: &[String]) -> Option<Sentiment> {
    let positive = words
        .iter()
        .filter(|w| POSITIVE_WORDS.contains(&w.as_str()))
        .count();
    let negative = words
        .iter()
        .filter(|w| NEGATIVE_WORDS.contains(&w.as_str()))
        .count();
    if positive + negative == 0 {
        return None;
    }
    let score = (positive as f64 - negative as f64) / (positive + negative) as f64;
    let polarity = if score > 0.2 {
        Polarity::Positive
    } else if score < -0.2 {
        Polarity::Negative
    } else {
        Polarity::Neutral
    };
    Some(Sentiment { polarity, score })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_text_lands_in_work_bucket() {
        let c = categorize("meeting with the client about the project deadline");
        assert_eq!(c.category, "work");
        assert!(c.confidence > 0.5);
        assert!(c.tags.contains(&"meeting".to_string()));
    }

    #[test]
    fn no_matches_degrade_to_general() {
        let c = categorize("zzz qqq xyzzy plugh");
        assert_eq!(c.category, "general");
        assert!((c.confidence - 0.2).abs() < f64::EPSILON);
        assert!(c.tags.is_empty());
    }

    #[test]
    fn empty_text_is_zero_confidence_general() {
        let c = categorize("");
        assert_eq!(c.category, "general");
        assert_eq!(c.confidence, 0.0);
        assert!(c.emotion.is_none());
        assert!(c.sentiment.is_none());
    }

    #[test]
    fn emotion_majority_wins() {
        let c = categorize("worried and anxious about the doctor appointment, but happy too");
        assert_eq!(c.emotion.as_deref(), Some("fear"));
        assert_eq!(c.category, "health");
    }

    #[test]
    fn sentiment_polarity_from_word_counts() {
        let positive = categorize("great dinner, wonderful friends, love it");
        assert_eq!(
            positive.sentiment.unwrap().polarity,
            Polarity::Positive
        );

        let negative = categorize("terrible flight, awful hotel, worst trip");
        assert_eq!(
            negative.sentiment.unwrap().polarity,
            Polarity::Negative
        );

        let none = categorize("the report covers the usual quarterly numbers");
        assert!(none.sentiment.is_none());
    }

    #[test]
    fn mixed_sentiment_is_neutral() {
        let c = categorize("good food but terrible service");
        let s = c.sentiment.unwrap();
        assert_eq!(s.polarity, Polarity::Neutral);
        assert!(s.score.abs() <= 0.2);
    }

    #[test]
    fn tags_are_capped_at_five() {
        let c = categorize(
            "meeting deadline project client manager office presentation colleague",
        );
        assert!(c.tags.len() <= 5);
    }

    #[test]
    fn categorize_is_deterministic() {
        let text = "budget review for the mortgage and insurance payments";
        assert_eq!(categorize(text), categorize(text));
    }
}
