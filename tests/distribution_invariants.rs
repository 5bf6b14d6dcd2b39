//! End-to-end invariants for classification plus distribution smoothing.

use convo_insight::analysis::{bloom, distribution};
use convo_insight::schemas::ConversationTurn;

fn turn(question: &str, question_type: &str) -> ConversationTurn {
    ConversationTurn {
        question: question.to_string(),
        answer: "answer".to_string(),
        question_type: question_type.to_string(),
        turn_number: None,
        role: None,
        classification: None,
        analysis: None,
        timestamp: None,
    }
}

fn assert_sums_to_hundred(entries: &[distribution::DistributionEntry]) {
    assert_eq!(entries.len(), 6);
    let sum: f64 = entries.iter().map(|e| e.percent).sum();
    assert!(
        (sum - 100.0).abs() < 1e-6,
        "distribution sums to {}, expected 100",
        sum
    );
    for entry in entries {
        assert!(entry.percent >= 0.0, "{:?} is negative", entry);
    }
}

#[test]
fn test_six_entries_sum_to_hundred_for_varied_inputs() {
    let cases: Vec<Vec<ConversationTurn>> = vec![
        vec![turn("如何部署服务", "procedural")],
        vec![
            turn("what is a mutex", "informational"),
            turn("can you clarify", "clarification"),
            turn("how to add logging", "procedural"),
            turn("review the module structure", "architecture"),
            turn("any feedback on the draft", "feedback"),
            turn("implement the parser", "feature"),
        ],
        vec![
            turn("q", "tooling"),
            turn("q", "tooling"),
            turn("q", "cost"),
            turn("q", "other"),
        ],
        vec![],
    ];

    for turns in cases {
        let mut buckets = bloom::build_buckets(&turns);
        distribution::inject_fallback_examples(&mut buckets);
        let entries = distribution::normalize(&buckets, turns.len());
        assert_sums_to_hundred(&entries);
    }
}

#[test]
fn test_single_procedural_turn_scenario() {
    // One procedural turn: classification is apply, raw percent 100,
    // neither zero-floor nor jitter fires on the raw buckets
    let turns = vec![turn("如何部署服务", "procedural")];
    assert_eq!(
        bloom::classify(&turns[0].question, Some(&turns[0].question_type)),
        bloom::CognitiveLevel::Apply
    );

    let buckets = bloom::build_buckets(&turns);
    assert_eq!(buckets[&bloom::CognitiveLevel::Apply].count, 1);

    let entries = distribution::normalize(&buckets, 1);
    for entry in &entries {
        if entry.level == bloom::CognitiveLevel::Apply {
            assert!((entry.percent - 100.0).abs() < 1e-6);
        } else {
            assert_eq!(entry.percent, 0.0);
        }
    }
    assert_sums_to_hundred(&entries);
}

#[test]
fn test_zero_count_zero_example_levels_can_stay_zero() {
    let turns = vec![turn("how to deploy", "procedural"), turn("how to test", "procedural")];
    let entries = distribution::normalize(&bloom::build_buckets(&turns), 2);
    let create = entries
        .iter()
        .find(|e| e.level == bloom::CognitiveLevel::Create)
        .unwrap();
    assert_eq!(create.percent, 0.0);
}

#[test]
fn test_example_bearing_levels_never_vanish() {
    let turns = vec![
        turn("how to deploy", "procedural"),
        turn("how to test", "procedural"),
        turn("how to release", "procedural"),
    ];
    let mut buckets = bloom::build_buckets(&turns);
    distribution::inject_fallback_examples(&mut buckets);
    let entries = distribution::normalize(&buckets, 3);
    for entry in &entries {
        let has_examples = !buckets[&entry.level].examples.is_empty();
        if has_examples {
            assert!(
                entry.percent > 0.0,
                "{} has examples but vanished",
                entry.label
            );
        }
    }
}

#[test]
fn test_informational_turns_classified_remember_regardless_of_text() {
    for question in ["", "how to build", "设计一个系统", "what structure fits"] {
        assert_eq!(
            bloom::classify(question, Some("informational")),
            bloom::CognitiveLevel::Remember
        );
    }
}
