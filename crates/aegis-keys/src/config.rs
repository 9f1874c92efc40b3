//! Key store and public key cache settings.

use crate::errors::*;
use std::{env, time::Duration};

/// Key store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound on a single `KeySource::fetch`
    pub fetch_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// Load from `AEGIS_KEY_FETCH_TIMEOUT_MS`, defaults when unset
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(ms) = env_u64("AEGIS_KEY_FETCH_TIMEOUT_MS")? {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Longest accepted public key TTL
pub const MAX_PUBLIC_KEY_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Public key cache settings
#[derive(Debug, Clone)]
pub struct PublicKeyCacheConfig {
    /// Lifetime of a cached entry
    pub ttl: Duration,
    /// Fraction of `ttl` after which a background refresh starts
    pub refresh_ratio: f64,
}

impl Default for PublicKeyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            refresh_ratio: 0.8,
        }
    }
}

impl PublicKeyCacheConfig {
    /// Load from `AEGIS_PUBKEY_TTL_SECS` and `AEGIS_PUBKEY_REFRESH_RATIO`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(secs) = env_u64("AEGIS_PUBKEY_TTL_SECS")? {
            config.ttl = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("AEGIS_PUBKEY_REFRESH_RATIO") {
            config.refresh_ratio = raw
                .parse()
                .map_err(|_| KeyError::Config(format!("AEGIS_PUBKEY_REFRESH_RATIO: {raw}")))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject ratios outside `(0, 1]` (NaN included) and a TTL that is zero
    /// or longer than [`MAX_PUBLIC_KEY_TTL`]
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(KeyError::Config("public key TTL must be non-zero".into()));
        }
        if self.ttl > MAX_PUBLIC_KEY_TTL {
            return Err(KeyError::Config(format!(
                "public key TTL must be at most {}s, got {}s",
                MAX_PUBLIC_KEY_TTL.as_secs(),
                self.ttl.as_secs()
            )));
        }
        if !(self.refresh_ratio > 0.0 && self.refresh_ratio <= 1.0) {
            return Err(KeyError::Config(format!(
                "refresh ratio must be in (0, 1], got {}",
                self.refresh_ratio
            )));
        }
        Ok(())
    }

    pub(crate) fn refresh_after(&self) -> Duration {
        self.ttl.mul_f64(self.refresh_ratio)
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| KeyError::Config(format!("{name}: expected an integer, got {raw}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.fetch_timeout, Duration::from_secs(10));

        let cache = PublicKeyCacheConfig::default();
        assert!(cache.validate().is_ok());
        assert_eq!(cache.refresh_after(), Duration::from_secs(480));
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = PublicKeyCacheConfig {
            refresh_ratio: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KeyError::Config(_))));

        let config = PublicKeyCacheConfig {
            refresh_ratio: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_ratio() {
        let config = PublicKeyCacheConfig {
            refresh_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KeyError::Config(_))));
    }

    #[test]
    fn test_validate_caps_ttl() {
        let config = PublicKeyCacheConfig {
            ttl: Duration::from_secs(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KeyError::Config(_))));

        let config = PublicKeyCacheConfig {
            ttl: MAX_PUBLIC_KEY_TTL,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
