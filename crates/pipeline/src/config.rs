//! Pipeline configuration loaded from environment variables.

use std::time::Duration;

use onboard_core::registration::ORIGIN_ONBOARDING_FORM;
use onboard_events::RetryPolicy;
use validator::ValidateUrl;

/// Endpoint used when no per-owner override is configured.
pub const DEFAULT_WEBHOOK_FALLBACK_URL: &str =
    "https://webhook.companychatautomacoeseia.com/webhook/formcliente";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    InvalidNumber {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{var} must be an absolute URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Submission pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Postgres connection string, needed only by the Postgres adapters.
    pub database_url: Option<String>,
    /// Notification endpoint used without an override.
    pub webhook_fallback_url: String,
    /// Per-request timeout for webhook delivery (default: `10`).
    pub webhook_timeout_secs: u64,
    /// Retries after the first webhook attempt (default: `3`).
    pub webhook_max_retries: u32,
    /// Value written to the `origin` column (default: `formulario_cadastro`).
    pub registration_origin: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            webhook_fallback_url: DEFAULT_WEBHOOK_FALLBACK_URL.to_string(),
            webhook_timeout_secs: 10,
            webhook_max_retries: 3,
            registration_origin: ORIGIN_ONBOARDING_FORM.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `DATABASE_URL`         | unset                                     |
    /// | `WEBHOOK_FALLBACK_URL` | [`DEFAULT_WEBHOOK_FALLBACK_URL`]          |
    /// | `WEBHOOK_TIMEOUT_SECS` | `10`                                      |
    /// | `WEBHOOK_MAX_RETRIES`  | `3`                                       |
    /// | `REGISTRATION_ORIGIN`  | `formulario_cadastro`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let webhook_fallback_url = match get("WEBHOOK_FALLBACK_URL") {
            Some(url) if url.validate_url() => url,
            Some(url) => {
                return Err(ConfigError::InvalidUrl {
                    var: "WEBHOOK_FALLBACK_URL",
                    value: url,
                })
            }
            None => defaults.webhook_fallback_url,
        };

        let webhook_timeout_secs = match get("WEBHOOK_TIMEOUT_SECS") {
            Some(v) => parse_number("WEBHOOK_TIMEOUT_SECS", "u64", v)?,
            None => defaults.webhook_timeout_secs,
        };

        let webhook_max_retries = match get("WEBHOOK_MAX_RETRIES") {
            Some(v) => parse_number("WEBHOOK_MAX_RETRIES", "u32", v)?,
            None => defaults.webhook_max_retries,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            webhook_fallback_url,
            webhook_timeout_secs,
            webhook_max_retries,
            registration_origin: get("REGISTRATION_ORIGIN")
                .unwrap_or(defaults.registration_origin),
        })
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.webhook_max_retries)
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        expected,
        value,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
