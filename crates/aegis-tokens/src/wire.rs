//! Wire format helpers: footers and unverified inspection.

use crate::{claims::RawClaims, errors::*};
use aegis_crypto::{
    paseto::{self, TokenParts, V4_LOCAL, V4_PUBLIC},
    CryptoError,
};
use serde::{Deserialize, Serialize};

/// Token footer: the id of the key that produced the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    pub kid: String,
}

impl Footer {
    pub fn new(kid: impl Into<String>) -> Self {
        Self { kid: kid.into() }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a decoded footer; an empty footer is `None`
    pub fn parse(bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| TokenError::Malformed(format!("footer: {e}")))
    }
}

/// Split a `v4.public` or `v4.local` token into its decoded segments
pub fn split(wire: &str) -> Result<TokenParts> {
    let header = if wire.starts_with(V4_PUBLIC) {
        V4_PUBLIC
    } else if wire.starts_with(V4_LOCAL) {
        V4_LOCAL
    } else {
        return Err(TokenError::Malformed("unsupported token header".into()));
    };
    paseto::split(wire, header).map_err(malformed)
}

/// Key id hint from the footer, without verifying anything
pub fn extract_kid(wire: &str) -> Result<Option<String>> {
    let parts = split(wire)?;
    Ok(Footer::parse(&parts.footer)?.map(|footer| footer.kid))
}

/// Claims of a `v4.public` token, without verifying the signature.
///
/// Only for selecting key material; never trust the result.
pub fn unverified_claims(wire: &str) -> Result<RawClaims> {
    if !wire.starts_with(V4_PUBLIC) {
        return Err(TokenError::Malformed("expected a v4.public token".into()));
    }
    let parts = split(wire)?;
    serde_json::from_slice(&parts.body)
        .map_err(|e| TokenError::Malformed(format!("claims: {e}")))
}

pub(crate) fn malformed(e: CryptoError) -> TokenError {
    match e {
        CryptoError::InvalidToken(reason) => TokenError::Malformed(reason),
        CryptoError::Encoding(reason) => TokenError::Malformed(reason),
        other => TokenError::Crypto(other),
    }
}
