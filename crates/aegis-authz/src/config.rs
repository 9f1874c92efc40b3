//! Checker settings.

use crate::errors::*;
use std::{env, time::Duration};

/// Where and how long to call the authorization service
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Base URL of the authorization service, without trailing slash
    pub endpoint: String,
    /// Whole-request deadline
    pub timeout: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl CheckerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Load from `AEGIS_AUTHZ_ENDPOINT` and `AEGIS_AUTHZ_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var("AEGIS_AUTHZ_ENDPOINT") {
            Ok(endpoint) => Self::new(endpoint),
            Err(_) => Self::default(),
        };
        if let Ok(raw) = env::var("AEGIS_AUTHZ_TIMEOUT_MS") {
            let ms: u64 = raw.parse().map_err(|_| {
                AuthzError::Config(format!("AEGIS_AUTHZ_TIMEOUT_MS: expected an integer, got {raw}"))
            })?;
            config.timeout = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(AuthzError::Config(format!(
                "endpoint must be an http(s) URL, got {}",
                self.endpoint
            )));
        }
        if self.timeout.is_zero() {
            return Err(AuthzError::Config("timeout must be non-zero".into()));
        }
        Ok(())
    }

    pub(crate) fn check_url(&self) -> String {
        format!("{}{}", self.endpoint, crate::types::CHECK_PATH)
    }
}
