use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const ENV_URL: &str = "TRADE_JOURNAL_URL";
pub const ENV_ANON_KEY: &str = "TRADE_JOURNAL_ANON_KEY";
pub const ENV_TIMEOUT_SECS: &str = "TRADE_JOURNAL_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the remote backend (REST + identity service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public (anonymous) API key sent with every request
    pub anon_key: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendSettings {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read settings from the environment, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, CoreError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL)
            .ok_or_else(|| CoreError::Config(format!("{ENV_URL} is not set")))?;
        let anon_key = lookup(ENV_ANON_KEY)
            .ok_or_else(|| CoreError::Config(format!("{ENV_ANON_KEY} is not set")))?;
        let request_timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let settings = Self {
            url: url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            request_timeout_secs,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let parsed = url::Url::parse(&self.url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CoreError::Config(format!(
                "Backend URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(CoreError::Config("Anon key must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("Request timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
