//! Analysis orchestration: one state machine per remote operation.
//!
//! The quality-evaluation and flow-analysis operations run independently
//! against the same uploaded artifact and may be in flight at the same
//! time. Each operation owns exactly three pieces of state (status, error,
//! result), written only by the code path driving that operation.

use crate::client::{ConversationArtifact, EvaluationBackend};
use crate::error::Result;
use crate::schemas::{FlowAnalysisResult, QualityEvaluationResult, ReportRequest, ReportResponse};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Lifecycle of one remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// State of a single operation. Transitions are pure and total:
/// `begin` (any -> Loading), `succeed` (Loading -> Success),
/// `fail` (Loading -> Error), `reset` (any -> Idle).
/// Success and error are mutually exclusive until the next `begin`.
#[derive(Debug, Clone)]
pub struct OpState<T> {
    pub status: AnalysisStatus,
    pub error: Option<String>,
    pub result: Option<T>,
}

impl<T> Default for OpState<T> {
    fn default() -> Self {
        Self {
            status: AnalysisStatus::Idle,
            error: None,
            result: None,
        }
    }
}

impl<T> OpState<T> {
    pub fn begin(&mut self) {
        self.status = AnalysisStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self, result: T) {
        self.status = AnalysisStatus::Success;
        self.error = None;
        self.result = Some(result);
    }

    pub fn fail(&mut self, message: String) {
        self.status = AnalysisStatus::Error;
        self.error = Some(message);
        // A previous run's result stays until reset(); only the status and
        // error reflect the failed rerun.
    }

    pub fn reset(&mut self) {
        self.status = AnalysisStatus::Idle;
        self.error = None;
        self.result = None;
    }

    pub fn is_loading(&self) -> bool {
        self.status == AnalysisStatus::Loading
    }
}

/// Drives the two remote analysis operations for one session.
///
/// Invoking an operation while its previous invocation is still loading is
/// not prevented: both calls run and the last completion wins the status,
/// error and result slots.
pub struct DeepAnalysis {
    backend: Arc<dyn EvaluationBackend>,
    quality: Mutex<OpState<QualityEvaluationResult>>,
    flow: Mutex<OpState<FlowAnalysisResult>>,
}

fn lock<T>(state: &Mutex<OpState<T>>) -> std::sync::MutexGuard<'_, OpState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DeepAnalysis {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            backend,
            quality: Mutex::new(OpState::default()),
            flow: Mutex::new(OpState::default()),
        }
    }

    /// Run quality evaluation against the artifact. Stores the outcome in
    /// the quality slot and re-raises failures to the caller.
    pub async fn run_quality_evaluation(
        &self,
        artifact: &ConversationArtifact,
        max_pairs: Option<u32>,
    ) -> Result<QualityEvaluationResult> {
        lock(&self.quality).begin();
        debug!("quality evaluation started");
        match self.backend.evaluate_quality(artifact, max_pairs).await {
            Ok(result) => {
                lock(&self.quality).succeed(result.clone());
                Ok(result)
            }
            Err(err) => {
                lock(&self.quality).fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Run flow analysis against the artifact. Stores the outcome in the
    /// flow slot and re-raises failures to the caller.
    pub async fn run_flow_analysis(
        &self,
        artifact: &ConversationArtifact,
    ) -> Result<FlowAnalysisResult> {
        lock(&self.flow).begin();
        debug!("flow analysis started");
        match self.backend.analyze_flow(artifact).await {
            Ok(result) => {
                lock(&self.flow).succeed(result.clone());
                Ok(result)
            }
            Err(err) => {
                lock(&self.flow).fail(err.to_string());
                Err(err)
            }
        }
    }

    /// Pass-through report generation; carries no per-operation state
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        self.backend.generate_report(request).await
    }

    /// Force both operations back to idle and clear results/errors
    pub fn reset(&self) {
        lock(&self.quality).reset();
        lock(&self.flow).reset();
    }

    pub fn quality_status(&self) -> AnalysisStatus {
        lock(&self.quality).status
    }

    pub fn flow_status(&self) -> AnalysisStatus {
        lock(&self.flow).status
    }

    pub fn quality_error(&self) -> Option<String> {
        lock(&self.quality).error.clone()
    }

    pub fn flow_error(&self) -> Option<String> {
        lock(&self.flow).error.clone()
    }

    pub fn quality_result(&self) -> Option<QualityEvaluationResult> {
        lock(&self.quality).result.clone()
    }

    pub fn flow_result(&self) -> Option<FlowAnalysisResult> {
        lock(&self.flow).result.clone()
    }

    // Derived reads are recomputed from the two operation states on every
    // call so they cannot desynchronize.

    pub fn is_any_loading(&self) -> bool {
        lock(&self.quality).is_loading() || lock(&self.flow).is_loading()
    }

    pub fn has_any_error(&self) -> bool {
        lock(&self.quality).error.is_some() || lock(&self.flow).error.is_some()
    }

    pub fn has_any_result(&self) -> bool {
        lock(&self.quality).result.is_some() || lock(&self.flow).result.is_some()
    }
}
