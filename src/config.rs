use serde::{Deserialize, Serialize};

/// Main configuration structure loaded from convo_insight.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub health: HealthConfig,
}

/// Backend connection settings for the evaluation service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the evaluation backend. Empty means unconfigured:
    /// every remote operation fails fast without a network attempt.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Default cap on QA pairs sent to quality evaluation (None = backend default)
    pub max_pairs_default: Option<u32>,
}

/// Health-check behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    /// Periodic check interval in seconds; 0 disables periodic checking
    pub check_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: String::new(),
                request_timeout_secs: 120,
                max_pairs_default: Some(3),
            },
            health: HealthConfig {
                check_interval_secs: 0,
            },
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses CONVO_INSIGHT_CONFIG environment variable or defaults to "convo_insight.toml"
    pub fn load() -> anyhow::Result<Self> {
        // Load environment variables with smart fallbacks:
        // 1) CONVO_ENV_FILE if set
        // 2) ./.env
        // 3) ../.env (repo root when running from crate dir)
        if let Ok(env_path) = std::env::var("CONVO_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            if std::env::var("CONVO_BACKEND_URL").is_err() {
                let _ = dotenvy::from_path("../.env");
            }
        }

        let config_path = std::env::var("CONVO_INSIGHT_CONFIG")
            .unwrap_or_else(|_| "convo_insight.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        // Apply env overrides (env-first)
        if let Ok(url) = std::env::var("CONVO_BACKEND_URL") {
            config.backend.base_url = url;
            tracing::debug!("CONVO_BACKEND_URL env override applied");
        }
        if let Some(secs) = std::env::var("CONVO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.backend.request_timeout_secs = secs;
        }
        if let Some(n) = std::env::var("CONVO_MAX_PAIRS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.backend.max_pairs_default = Some(n);
        }
        if let Some(secs) = std::env::var("CONVO_HEALTH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.health.check_interval_secs = secs;
        }

        // Validate backend URL format (basic checks)
        if !config.backend.base_url.is_empty()
            && !config.backend.base_url.starts_with("http://")
            && !config.backend.base_url.starts_with("https://")
        {
            tracing::warn!(
                "Backend URL '{}' doesn't start with http:// or https://",
                config.backend.base_url
            );
        }

        if config.backend.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs is 0, requests would fail immediately; using 120");
            config.backend.request_timeout_secs = 120;
        }

        Ok(config)
    }

    pub fn is_configured(&self) -> bool {
        !self.backend.base_url.is_empty()
    }
}
