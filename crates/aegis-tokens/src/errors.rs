use crate::types::TokenKind;
use aegis_crypto::CryptoError;
use aegis_keys::KeyError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Decryption failed")]
    DecryptFailed,

    #[error("Missing required claim: {0}")]
    MissingClaims(&'static str),

    #[error("Unsupported token type: expected {expected}, found {found}")]
    UnsupportedTokenType { expected: TokenKind, found: TokenKind },

    #[error("Unsupported audience: {0}")]
    UnsupportedAudience(String),

    #[error("Token expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("Token not valid before {0}")]
    NotYetValid(DateTime<Utc>),

    #[error("Invalid TTL {ttl:?}: must be non-zero and at most {max:?}")]
    InvalidTtl { ttl: Duration, max: Duration },

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl TokenError {
    /// Whether the failure comes from key infrastructure rather than the
    /// token itself.
    ///
    /// Callers answer these with a 5xx and retry; everything else is a
    /// rejected token.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            TokenError::Key(KeyError::NotFound(_)) => false,
            TokenError::Key(_) => true,
            TokenError::Crypto(
                CryptoError::KeyDerivationFailed(_) | CryptoError::RandomGenerationFailed(_),
            ) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenError>;
