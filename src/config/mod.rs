use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Branch used for settlements when the session does not override it.
    pub default_branch_id: i64,
}

/// Connection settings for the remote POS backend API.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl BackendConfig {
    /// Build the HTTP client used for all backend calls: shared timeout,
    /// exponential backoff on transient failures.
    pub fn build_client(&self) -> Result<reqwest_middleware::ClientWithMiddleware> {
        use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.request_timeout_secs))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.max_retries);

        Ok(reqwest_middleware::ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                default_branch_id: env::var("DEFAULT_BRANCH_ID")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid DEFAULT_BRANCH_ID".to_string())
                    })?,
            },
            backend: BackendConfig {
                base_url: env::var("BACKEND_BASE_URL")
                    .map_err(|_| AppError::Configuration("BACKEND_BASE_URL not set".to_string()))?,
                api_key: env::var("BACKEND_API_KEY")
                    .map_err(|_| AppError::Configuration("BACKEND_API_KEY not set".to_string()))?,
                request_timeout_secs: env::var("BACKEND_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid BACKEND_TIMEOUT_SECS".to_string())
                    })?,
                max_retries: env::var("BACKEND_MAX_RETRIES")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid BACKEND_MAX_RETRIES".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(AppError::Configuration(
                "Backend base URL cannot be empty".to_string(),
            ));
        }

        if self.backend.request_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Backend timeout must be greater than 0".to_string(),
            ));
        }

        if self.app.default_branch_id <= 0 {
            return Err(AppError::Configuration(
                "Default branch id must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Initialize the tracing subscriber for host applications and tests.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
