//! HTTP client for the remote evaluation backend.
//!
//! One explicitly constructed client value owns the base URL and the
//! underlying `reqwest` client; orchestrator and health monitor receive it
//! at construction so tests can substitute a non-network backend through
//! the [`EvaluationBackend`] trait.

use crate::config::Config;
use crate::error::{ConvoInsightError, Result};
use crate::schemas::{
    ApiErrorBody, BackendHealthResponse, FlowAnalysisResult, QualityEvaluationResult,
    ReportRequest, ReportResponse,
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// An uploaded transcript artifact: the raw bytes of a conversations.json
/// export plus the file name the backend sees in the multipart form.
#[derive(Debug, Clone)]
pub struct ConversationArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ConversationArtifact {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "conversations.json".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Seam between the analysis engine and the remote evaluation service
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn check_health(&self) -> Result<BackendHealthResponse>;
    async fn evaluate_quality(
        &self,
        artifact: &ConversationArtifact,
        max_pairs: Option<u32>,
    ) -> Result<QualityEvaluationResult>;
    async fn analyze_flow(&self, artifact: &ConversationArtifact) -> Result<FlowAnalysisResult>;
    async fn generate_report(&self, request: &ReportRequest) -> Result<ReportResponse>;
}

/// HTTP implementation of [`EvaluationBackend`]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against one backend base URL. An empty URL produces
    /// an unconfigured client: every call fails fast with a configuration
    /// error and no network attempt.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConvoInsightError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.backend.base_url.clone(),
            Duration::from_secs(config.backend.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ConvoInsightError::Config {
                message: "backend base URL is not configured (set CONVO_BACKEND_URL)".to_string(),
            });
        }
        Ok(())
    }

    fn multipart_form(
        artifact: &ConversationArtifact,
        max_pairs: Option<u32>,
    ) -> Result<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(artifact.bytes.clone())
            .file_name(artifact.file_name.clone())
            .mime_str("application/json")?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(n) = max_pairs {
            form = form.text("max_pairs", n.to_string());
        }
        Ok(form)
    }

    /// Decode a success body, or surface the backend's structured error.
    /// A malformed success body counts as a transport failure.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ConvoInsightError::Transport {
                message: format!("Malformed backend response: {}", e),
            })
    }
}

/// Pick the most specific message available from a non-2xx response:
/// `detail` over `error` over the bare status line.
fn remote_error(status: reqwest::StatusCode, body: &str) -> ConvoInsightError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .detail
        .or(parsed.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));
    ConvoInsightError::Remote { message }
}

#[async_trait]
impl EvaluationBackend for ApiClient {
    fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    async fn check_health(&self) -> Result<BackendHealthResponse> {
        self.ensure_configured()?;
        debug!("GET {}", self.url("/api/health"));
        let response = self.http.get(self.url("/api/health")).send().await?;
        Self::decode(response).await
    }

    async fn evaluate_quality(
        &self,
        artifact: &ConversationArtifact,
        max_pairs: Option<u32>,
    ) -> Result<QualityEvaluationResult> {
        self.ensure_configured()?;
        debug!(
            "POST {} (file={}, {} bytes, max_pairs={:?})",
            self.url("/api/evaluate-quality"),
            artifact.file_name,
            artifact.bytes.len(),
            max_pairs
        );
        let form = Self::multipart_form(artifact, max_pairs)?;
        let response = self
            .http
            .post(self.url("/api/evaluate-quality"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn analyze_flow(&self, artifact: &ConversationArtifact) -> Result<FlowAnalysisResult> {
        self.ensure_configured()?;
        debug!(
            "POST {} (file={}, {} bytes)",
            self.url("/api/analyze-flow"),
            artifact.file_name,
            artifact.bytes.len()
        );
        let form = Self::multipart_form(artifact, None)?;
        let response = self
            .http
            .post(self.url("/api/analyze-flow"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<ReportResponse> {
        self.ensure_configured()?;
        debug!("POST {}", self.url("/api/generate-report"));
        let response = self
            .http
            .post(self.url("/api/generate-report"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_prefers_detail() {
        let err = remote_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": "bad request", "detail": "no valid conversation found"}"#,
        );
        assert!(err.to_string().contains("no valid conversation found"));
    }

    #[test]
    fn test_remote_error_falls_back_to_error_field() {
        let err = remote_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "evaluation failed"}"#,
        );
        assert!(err.to_string().contains("evaluation failed"));
    }

    #[test]
    fn test_remote_error_unparseable_body_uses_status() {
        let err = remote_error(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_unconfigured_client_fails_fast() {
        let client = ApiClient::new("", Duration::from_secs(1)).unwrap();
        assert!(!client.is_configured());
        let err = client.ensure_configured().unwrap_err();
        assert!(matches!(err, ConvoInsightError::Config { .. }));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/api/health"), "http://localhost:8000/api/health");
    }
}
