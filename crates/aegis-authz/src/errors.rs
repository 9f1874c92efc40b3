use aegis_tokens::TokenError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthzError {
    /// The authorization service refused the client access token
    #[error("Client access token rejected: {0}")]
    CatRejected(String),

    #[error("Check failed with status {status}: {message}")]
    CheckFailed { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
