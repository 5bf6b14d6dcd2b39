//! Heuristic Bloom-taxonomy classification of conversational turns.
//!
//! A turn's declared question type (from flow analysis) takes priority;
//! question-text markers fill the gaps. First satisfied rule wins, no
//! scoring or weighting.

use crate::schemas::ConversationTurn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

// Lazy-loaded marker lexicons from env, fallback to defaults
static MARKERS_APPLY: LazyLock<Vec<String>> = LazyLock::new(|| {
    std::env::var("CONVO_MARKERS_APPLY")
        .unwrap_or("步骤,如何,step-by-step,how to".to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .collect()
});

static MARKERS_ANALYZE: LazyLock<Vec<String>> = LazyLock::new(|| {
    std::env::var("CONVO_MARKERS_ANALYZE")
        .unwrap_or("结构,组织,structure,organization".to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .collect()
});

static MARKERS_CREATE: LazyLock<Vec<String>> = LazyLock::new(|| {
    std::env::var("CONVO_MARKERS_CREATE")
        .unwrap_or("搭建,实现,设计,build,implement,design".to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .collect()
});

/// The six Bloom cognitive levels, lowest demand first. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "remember",
            CognitiveLevel::Understand => "understand",
            CognitiveLevel::Apply => "apply",
            CognitiveLevel::Analyze => "analyze",
            CognitiveLevel::Evaluate => "evaluate",
            CognitiveLevel::Create => "create",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Remember",
            CognitiveLevel::Understand => "Understand",
            CognitiveLevel::Apply => "Apply",
            CognitiveLevel::Analyze => "Analyze",
            CognitiveLevel::Evaluate => "Evaluate",
            CognitiveLevel::Create => "Create",
        }
    }
}

fn any_marker(haystack: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| haystack.contains(m.as_str()))
}

/// Classify one turn. Pure, deterministic, case-insensitive substring
/// matching; rules are evaluated in priority order and the first match
/// terminates evaluation.
pub fn classify(question: &str, declared_type: Option<&str>) -> CognitiveLevel {
    let q = question.to_lowercase();
    let t = declared_type.unwrap_or("").to_lowercase();

    if t.contains("informational") {
        return CognitiveLevel::Remember;
    }
    if t.contains("clarification") {
        return CognitiveLevel::Understand;
    }
    if t.contains("procedural") || any_marker(&q, &MARKERS_APPLY) {
        return CognitiveLevel::Apply;
    }
    if t.contains("architecture") || t.contains("planning") || any_marker(&q, &MARKERS_ANALYZE) {
        return CognitiveLevel::Analyze;
    }
    if t.contains("feedback") || t.contains("insight") || t.contains("report") {
        return CognitiveLevel::Evaluate;
    }
    if t.contains("feature") || any_marker(&q, &MARKERS_CREATE) {
        return CognitiveLevel::Create;
    }
    if t.contains("tooling") {
        return CognitiveLevel::Apply;
    }
    if t.contains("cost") {
        return CognitiveLevel::Analyze;
    }

    CognitiveLevel::Understand
}

/// A representative question/answer pair retained for a level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    pub question: String,
    pub answer: String,
}

/// Per-level tally: count plus at most two examples in turn order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bucket {
    pub count: usize,
    pub examples: Vec<Example>,
}

/// Classify every turn and aggregate per level. All six levels are
/// present in the output even when empty.
pub fn build_buckets(turns: &[ConversationTurn]) -> BTreeMap<CognitiveLevel, Bucket> {
    let mut buckets: BTreeMap<CognitiveLevel, Bucket> = CognitiveLevel::ALL
        .iter()
        .map(|level| (*level, Bucket::default()))
        .collect();

    for turn in turns {
        let level = classify(&turn.question, Some(&turn.question_type));
        if let Some(bucket) = buckets.get_mut(&level) {
            bucket.count += 1;
            if bucket.examples.len() < 2 {
                bucket.examples.push(Example {
                    question: turn.question.clone(),
                    answer: turn.answer.clone(),
                });
            }
        }
    }

    buckets
}
