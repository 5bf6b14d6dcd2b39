//! Information gain: IG(P,Q) = DKL(P‖Q) × R × C.
//!
//! P is the observed question-type distribution, Q a lightly biased
//! baseline approximating a typical historical mix, R a relevance factor
//! and C a confidence factor from the quality evaluation. The calculator
//! performs no remote calls; R and C arrive pre-computed.

use crate::schemas::{FlowAnalysisResult, QualityEvaluationResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const EPSILON: f64 = 1e-9;

/// Fixed positive biases applied to the baseline when the category is
/// present in the observed data
const BASELINE_BIASES: [(&str, f64); 5] = [
    ("planning", 0.35),
    ("architecture", 0.25),
    ("insight", 0.20),
    ("report", 0.15),
    ("cost", 0.10),
];

/// Computed information-gain breakdown
#[derive(Debug, Clone, Serialize)]
pub struct InfoGain {
    pub dkl: f64,
    pub relevance: f64,
    pub confidence: f64,
    pub gain: f64,
}

/// Normalize a count mapping into a probability distribution. Empty
/// input falls back to a single-key distribution of weight 1; a zero
/// sum is replaced by 1 so division never fails.
pub fn normalize_counts(counts: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    if counts.is_empty() {
        return BTreeMap::from([("other".to_string(), 1.0)]);
    }
    let total: f64 = counts.values().sum();
    let total = if total == 0.0 { 1.0 } else { total };
    counts.iter().map(|(k, v)| (k.clone(), v / total)).collect()
}

/// KL divergence DKL(P‖Q) over the union of keys, with ε-smoothing on
/// both sides of the ratio. Terms where P[k] = 0 contribute 0.
pub fn dkl(p: &BTreeMap<String, f64>, q: &BTreeMap<String, f64>) -> f64 {
    let keys: BTreeSet<&String> = p.keys().chain(q.keys()).collect();
    let mut sum = 0.0;
    for key in keys {
        let pv = p.get(key).copied().unwrap_or(0.0).max(0.0);
        let qv = q.get(key).copied().unwrap_or(0.0).max(0.0);
        if pv > 0.0 {
            sum += pv * ((pv + EPSILON) / (qv + EPSILON)).ln();
        }
    }
    sum
}

/// Baseline counts Q: every observed category starts at weight 1, with
/// fixed biases for the categories a typical conversation leans toward.
/// Categories absent from the current data contribute nothing.
pub fn baseline_counts(counts: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    if counts.is_empty() {
        return BTreeMap::from([("other".to_string(), 1.0)]);
    }
    let mut base: BTreeMap<String, f64> =
        counts.keys().map(|k| (k.clone(), 1.0)).collect();
    for (name, bias) in BASELINE_BIASES {
        if let Some(weight) = base.get_mut(name) {
            *weight += bias;
        }
    }
    base
}

/// IG = DKL(normalize(current) ‖ normalize(baseline)) × R × C, with R
/// and C clamped to [0, 1] before multiplication.
pub fn info_gain(
    current: &BTreeMap<String, f64>,
    baseline: &BTreeMap<String, f64>,
    relevance: f64,
    confidence: f64,
) -> InfoGain {
    let p = normalize_counts(current);
    let q = normalize_counts(baseline);
    let divergence = dkl(&p, &q);
    let relevance = relevance.clamp(0.0, 1.0);
    let confidence = confidence.clamp(0.0, 1.0);
    InfoGain {
        dkl: divergence,
        relevance,
        confidence,
        gain: divergence * relevance * confidence,
    }
}

/// Observed question-type counts from a flow summary, as f64 weights
pub fn counts_from_summary(counts: &HashMap<String, u64>) -> BTreeMap<String, f64> {
    counts
        .iter()
        .map(|(k, v)| (k.clone(), *v as f64))
        .collect()
}

/// Full pipeline over the two remote results: observed counts vs. the
/// biased baseline, relevance from the relevancy metric, confidence from
/// one minus toxicity.
pub fn from_results(flow: &FlowAnalysisResult, quality: &QualityEvaluationResult) -> InfoGain {
    let current = counts_from_summary(&flow.summary.question_type_counts);
    let baseline = baseline_counts(&current);
    info_gain(
        &current,
        &baseline,
        quality.relevance_factor(),
        quality.confidence_factor(),
    )
}
