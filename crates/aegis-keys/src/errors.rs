use aegis_crypto::CryptoError;
use std::{error::Error as StdError, sync::Arc, time::Duration};
use thiserror::Error;

/// Key distribution errors.
///
/// Cloneable so a single fetch result can be handed to every waiting caller.
#[derive(Error, Debug, Clone)]
pub enum KeyError {
    #[error("Invalid key format for {id}: expected {expected} bytes, got {actual}")]
    InvalidFormat {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("No keys found for {0}")]
    NotFound(String),

    #[error("Key source error for {id}: {source}")]
    Source {
        id: String,
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },

    #[error("Key fetch for {id} timed out after {timeout:?}")]
    Timeout { id: String, timeout: Duration },

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KeyError {
    /// Wrap an error raised by a key source backend
    pub fn from_source(
        id: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        KeyError::Source {
            id: id.into(),
            source: Arc::from(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, KeyError>;
