//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Raw key material has the wrong length
    #[error("Invalid key format: expected {expected} bytes, got {actual}")]
    InvalidKeyFormat {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Argon2id derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Random number generation failed
    #[error("Random number generation failed: {0}")]
    RandomGenerationFailed(String),

    /// Token string is not a well-formed PASETO token of the expected kind
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// No signature matched
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Authentication tag mismatch or undecryptable payload
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Base64 decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
