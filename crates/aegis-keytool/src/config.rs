use aegis_authz::CheckerConfig;
use aegis_keys::{PublicKeyCacheConfig, StoreConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Key tool configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one `<id>.keys` file per tenant
    pub keys_dir: PathBuf,

    pub store: StoreConfig,

    pub public_keys: PublicKeyCacheConfig,

    pub checker: CheckerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let keys_dir = std::env::var("AEGIS_KEYS_DIR")
            .unwrap_or_else(|_| "./keys".to_string())
            .into();

        Ok(Config {
            keys_dir,
            store: StoreConfig::from_env().context("key store settings")?,
            public_keys: PublicKeyCacheConfig::from_env().context("public key cache settings")?,
            checker: CheckerConfig::from_env().context("checker settings")?,
        })
    }
}
