//! State-machine tests for the deep-analysis orchestrator using a
//! scripted backend double (no network).

use async_trait::async_trait;
use convo_insight::client::{ConversationArtifact, EvaluationBackend};
use convo_insight::error::{ConvoInsightError, Result};
use convo_insight::orchestrator::{AnalysisStatus, DeepAnalysis};
use convo_insight::schemas::{
    BackendHealthResponse, FlowAnalysisResult, FlowSummary, QualityEvaluationResult,
    QualityMetrics, ReportRequest, ReportResponse,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn quality_result() -> QualityEvaluationResult {
    QualityEvaluationResult {
        pairs_evaluated: 3,
        metrics: QualityMetrics::default(),
        details: None,
        average_score: Some(0.8),
        cached: None,
    }
}

fn flow_result() -> FlowAnalysisResult {
    FlowAnalysisResult {
        conversation_id: Some("conv-1".to_string()),
        total_turns: 0,
        turns: vec![],
        summary: FlowSummary {
            question_type_counts: Default::default(),
            avg_question_length: 0.0,
            avg_response_length: 0.0,
            conversation_flow: None,
            total_turns: 0,
        },
        cached: None,
    }
}

fn artifact() -> ConversationArtifact {
    ConversationArtifact::from_bytes("conversations.json", b"[]".to_vec())
}

/// Backend double: per-operation success/failure plus transport counters
struct ScriptedBackend {
    quality_ok: bool,
    flow_ok: bool,
    quality_calls: AtomicUsize,
    flow_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(quality_ok: bool, flow_ok: bool) -> Self {
        Self {
            quality_ok,
            flow_ok,
            quality_calls: AtomicUsize::new(0),
            flow_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EvaluationBackend for ScriptedBackend {
    fn is_configured(&self) -> bool {
        true
    }

    async fn check_health(&self) -> Result<BackendHealthResponse> {
        Ok(BackendHealthResponse {
            status: "healthy".to_string(),
            has_api_key: true,
            version: None,
            timestamp: None,
        })
    }

    async fn evaluate_quality(
        &self,
        _artifact: &ConversationArtifact,
        _max_pairs: Option<u32>,
    ) -> Result<QualityEvaluationResult> {
        self.quality_calls.fetch_add(1, Ordering::SeqCst);
        if self.quality_ok {
            Ok(quality_result())
        } else {
            Err(ConvoInsightError::Remote {
                message: "evaluation failed: no API key".to_string(),
            })
        }
    }

    async fn analyze_flow(&self, _artifact: &ConversationArtifact) -> Result<FlowAnalysisResult> {
        self.flow_calls.fetch_add(1, Ordering::SeqCst);
        if self.flow_ok {
            Ok(flow_result())
        } else {
            Err(ConvoInsightError::Transport {
                message: "connection reset".to_string(),
            })
        }
    }

    async fn generate_report(&self, _request: &ReportRequest) -> Result<ReportResponse> {
        Ok(ReportResponse {
            html: Some("<html></html>".to_string()),
            download_url: None,
            format: Some("html".to_string()),
        })
    }
}

#[tokio::test]
async fn test_initial_state_is_idle() {
    let session = DeepAnalysis::new(Arc::new(ScriptedBackend::new(true, true)));
    assert_eq!(session.quality_status(), AnalysisStatus::Idle);
    assert_eq!(session.flow_status(), AnalysisStatus::Idle);
    assert!(!session.is_any_loading());
    assert!(!session.has_any_error());
    assert!(!session.has_any_result());
}

#[tokio::test]
async fn test_successful_quality_run() {
    let session = DeepAnalysis::new(Arc::new(ScriptedBackend::new(true, true)));
    let result = session.run_quality_evaluation(&artifact(), Some(3)).await;
    assert!(result.is_ok());
    assert_eq!(session.quality_status(), AnalysisStatus::Success);
    assert!(session.quality_error().is_none());
    assert!(session.quality_result().is_some());
    assert!(session.has_any_result());
}

#[tokio::test]
async fn test_quality_failure_leaves_flow_untouched() {
    let backend = Arc::new(ScriptedBackend::new(false, true));
    let session = DeepAnalysis::new(backend.clone());

    let result = session.run_quality_evaluation(&artifact(), None).await;
    assert!(result.is_err());
    assert_eq!(session.quality_status(), AnalysisStatus::Error);
    let error = session.quality_error().expect("error should be recorded");
    assert!(error.contains("no API key"));

    // The other operation is unaffected
    assert_eq!(session.flow_status(), AnalysisStatus::Idle);
    assert!(session.flow_error().is_none());
    assert_eq!(backend.flow_calls.load(Ordering::SeqCst), 0);
    assert!(session.has_any_error());
}

#[tokio::test]
async fn test_operations_run_concurrently_and_independently() {
    let session = DeepAnalysis::new(Arc::new(ScriptedBackend::new(true, false)));
    let a = artifact();
    let (quality, flow) = tokio::join!(
        session.run_quality_evaluation(&a, None),
        session.run_flow_analysis(&a),
    );
    assert!(quality.is_ok());
    assert!(flow.is_err());
    assert_eq!(session.quality_status(), AnalysisStatus::Success);
    assert_eq!(session.flow_status(), AnalysisStatus::Error);
    assert!(session.flow_error().unwrap().contains("connection reset"));
    assert!(session.has_any_result());
    assert!(session.has_any_error());
}

#[tokio::test]
async fn test_error_then_rerun_reaches_success() {
    let failing = DeepAnalysis::new(Arc::new(ScriptedBackend::new(false, true)));
    let _ = failing.run_quality_evaluation(&artifact(), None).await;
    assert_eq!(failing.quality_status(), AnalysisStatus::Error);

    let session = DeepAnalysis::new(Arc::new(ScriptedBackend::new(true, true)));
    let _ = session.run_quality_evaluation(&artifact(), None).await;
    assert_eq!(session.quality_status(), AnalysisStatus::Success);
}

#[tokio::test]
async fn test_reset_clears_both_operations() {
    let session = DeepAnalysis::new(Arc::new(ScriptedBackend::new(true, false)));
    let a = artifact();
    let _ = session.run_quality_evaluation(&a, None).await;
    let _ = session.run_flow_analysis(&a).await;
    assert!(session.has_any_result());
    assert!(session.has_any_error());

    session.reset();
    assert_eq!(session.quality_status(), AnalysisStatus::Idle);
    assert_eq!(session.flow_status(), AnalysisStatus::Idle);
    assert!(!session.has_any_result());
    assert!(!session.has_any_error());
    assert!(session.quality_result().is_none());
    assert!(session.flow_result().is_none());
}

#[tokio::test]
async fn test_unconfigured_client_fails_without_transport() {
    use convo_insight::client::ApiClient;
    use std::time::Duration;

    let client = Arc::new(ApiClient::new("", Duration::from_secs(1)).unwrap());
    let session = DeepAnalysis::new(client);
    let result = session.run_quality_evaluation(&artifact(), None).await;
    let err = result.unwrap_err();
    assert!(matches!(err, ConvoInsightError::Config { .. }));
    assert_eq!(session.quality_status(), AnalysisStatus::Error);
    assert!(session.quality_error().unwrap().contains("not configured"));
}
