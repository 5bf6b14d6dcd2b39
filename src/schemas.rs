//! Wire types for the evaluation backend contracts.
//!
//! Shapes mirror the backend's JSON responses for the four endpoints
//! (health, evaluate-quality, analyze-flow, generate-report). Optional
//! fields stay optional here so one missing metric never invalidates the
//! rest of a successful response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score for a single quality metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricScore {
    pub score: f64,
    pub threshold: f64,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The five fixed quality metrics. Any of them may be absent from a
/// successful response when its evaluation failed server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevancy: Option<MetricScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpfulness: Option<MetricScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coherence: Option<MetricScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toxicity: Option<MetricScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<MetricScore>,
}

/// Closed set of metric kinds the backend reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Relevancy,
    Helpfulness,
    Coherence,
    Toxicity,
    Bias,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Relevancy,
        MetricKind::Helpfulness,
        MetricKind::Coherence,
        MetricKind::Toxicity,
        MetricKind::Bias,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Relevancy => "relevancy",
            MetricKind::Helpfulness => "helpfulness",
            MetricKind::Coherence => "coherence",
            MetricKind::Toxicity => "toxicity",
            MetricKind::Bias => "bias",
        }
    }

    /// Higher raw score is worse for these two; readers invert them
    pub fn is_inverse(&self) -> bool {
        matches!(self, MetricKind::Toxicity | MetricKind::Bias)
    }
}

/// Total lookup result: a metric is either present or explicitly absent
#[derive(Debug, Clone, Copy)]
pub enum MetricValue<'a> {
    Score(&'a MetricScore),
    Absent,
}

impl MetricValue<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, MetricValue::Absent)
    }

    pub fn score_or(&self, default: f64) -> f64 {
        match self {
            MetricValue::Score(m) => m.score,
            MetricValue::Absent => default,
        }
    }

    /// Display string for report rendering
    pub fn describe(&self) -> String {
        match self {
            MetricValue::Score(m) => format!("{:.2}", m.score),
            MetricValue::Absent => "evaluation failed or data missing".to_string(),
        }
    }
}

impl QualityMetrics {
    /// Total accessor over the closed metric set
    pub fn metric(&self, kind: MetricKind) -> MetricValue<'_> {
        let slot = match kind {
            MetricKind::Relevancy => &self.relevancy,
            MetricKind::Helpfulness => &self.helpfulness,
            MetricKind::Coherence => &self.coherence,
            MetricKind::Toxicity => &self.toxicity,
            MetricKind::Bias => &self.bias,
        };
        match slot {
            Some(score) => MetricValue::Score(score),
            None => MetricValue::Absent,
        }
    }
}

/// Per-pair evaluation detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPairDetail {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub metrics: QualityMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
}

/// Result of the quality-evaluation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityEvaluationResult {
    pub pairs_evaluated: u32,
    #[serde(default)]
    pub metrics: QualityMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<QaPairDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl QualityEvaluationResult {
    /// Relevance factor R for information gain, clamped to [0, 1].
    /// Falls back to 0.8 when the relevancy metric is absent.
    pub fn relevance_factor(&self) -> f64 {
        self.metrics
            .metric(MetricKind::Relevancy)
            .score_or(0.8)
            .clamp(0.0, 1.0)
    }

    /// Confidence factor C for information gain: one minus toxicity,
    /// clamped to [0, 1]. Toxicity falls back to 0.1 when absent.
    pub fn confidence_factor(&self) -> f64 {
        (1.0 - self.metrics.metric(MetricKind::Toxicity).score_or(0.1)).clamp(0.0, 1.0)
    }

    /// Reported average score, else the mean of the five metrics with
    /// toxicity and bias inverted. Absent metrics contribute their
    /// neutral defaults (0 for the positives, 0 toxicity/bias).
    pub fn overall_score(&self) -> f64 {
        if let Some(avg) = self.average_score {
            return avg;
        }
        let m = &self.metrics;
        (m.metric(MetricKind::Relevancy).score_or(0.0)
            + m.metric(MetricKind::Helpfulness).score_or(0.0)
            + m.metric(MetricKind::Coherence).score_or(0.0)
            + (1.0 - m.metric(MetricKind::Toxicity).score_or(0.0))
            + (1.0 - m.metric(MetricKind::Bias).score_or(0.0)))
            / 5.0
    }
}

/// Secondary classification attached to a turn by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionClassification {
    pub primary_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_type: Option<String>,
    pub confidence: f64,
}

/// Per-turn sentiment/complexity annotation from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnAnalysis {
    pub sentiment: String,
    pub complexity: String,
    pub score: f64,
}

/// One question/answer turn as classified by flow analysis.
/// Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<QuestionClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TurnAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Aggregate statistics over the analyzed conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummary {
    #[serde(default)]
    pub question_type_counts: HashMap<String, u64>,
    pub avg_question_length: f64,
    pub avg_response_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_flow: Option<String>,
    pub total_turns: u32,
}

/// Result of the flow-analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowAnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub total_turns: u32,
    pub turns: Vec<ConversationTurn>,
    pub summary: FlowSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Request body for report generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityEvaluationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_analysis: Option<FlowAnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Response of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealthResponse {
    pub status: String,
    #[serde(default)]
    pub has_api_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl BackendHealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Structured error body the backend returns on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    // Backends disagree on whether this is a string or a number
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<u32>,
}
