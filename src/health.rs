//! Backend health monitoring.

use crate::client::EvaluationBackend;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Point-in-time view of backend availability
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub has_api_key: bool,
    /// Hard failure message, or a non-fatal warning when the backend is
    /// reachable but misconfigured (e.g. missing API key)
    pub error: Option<String>,
}

impl HealthStatus {
    fn unconfigured() -> Self {
        Self {
            is_healthy: false,
            has_api_key: false,
            error: Some("backend is not configured".to_string()),
        }
    }
}

/// Polls the backend health endpoint on demand or on a fixed interval.
/// Fails closed: an unconfigured backend reports unhealthy without any
/// network attempt.
pub struct HealthMonitor {
    backend: Arc<dyn EvaluationBackend>,
    latest: Mutex<Option<HealthStatus>>,
}

impl HealthMonitor {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            backend,
            latest: Mutex::new(None),
        }
    }

    /// Run one health check, record it as the latest status, and return it.
    pub async fn check(&self) -> HealthStatus {
        let status = if !self.backend.is_configured() {
            HealthStatus::unconfigured()
        } else {
            match self.backend.check_health().await {
                Ok(data) => {
                    let error = if !data.has_api_key {
                        Some("backend has no API key configured".to_string())
                    } else {
                        None
                    };
                    HealthStatus {
                        is_healthy: data.is_healthy(),
                        has_api_key: data.has_api_key,
                        error,
                    }
                }
                Err(err) => HealthStatus {
                    is_healthy: false,
                    has_api_key: false,
                    error: Some(err.to_string()),
                },
            }
        };

        if status.is_healthy {
            debug!(has_api_key = status.has_api_key, "backend healthy");
        } else {
            warn!(error = ?status.error, "backend unhealthy");
        }

        *self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status.clone());
        status
    }

    /// Most recent check result, if any check has run
    pub fn latest(&self) -> Option<HealthStatus> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Spawn a background task that checks immediately and then on every
    /// interval tick. The caller owns the handle and aborts it to stop.
    pub fn spawn_periodic(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.check().await;
            }
        })
    }
}
