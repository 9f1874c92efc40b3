//! PASETO v4.public verification against a tenant's public keys.

use crate::{claims::RawClaims, errors::*, token::Token, types::TokenKind, wire};
use aegis_crypto::{derive_signing_key_pair, paseto, Seed};
use aegis_keys::{KeyStore, PublicKeyCache, PublicKeyCacheConfig, SeedLoader};
use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use std::sync::Arc;
use tracing::debug;

/// Public key cache whose entries are derived from the seeds in `store`
pub fn signing_public_keys(
    store: KeyStore,
    config: PublicKeyCacheConfig,
) -> Result<PublicKeyCache<VerifyingKey>> {
    let loader = SeedLoader::new(store, |seed: &Seed| {
        Ok(*derive_signing_key_pair(seed)?.public_key())
    });
    Ok(PublicKeyCache::new(Arc::new(loader), config)?)
}

/// Verifies tokens signed by one tenant id
pub struct Verifier {
    public_keys: PublicKeyCache<VerifyingKey>,
    id: String,
}

impl Verifier {
    pub fn new(public_keys: PublicKeyCache<VerifyingKey>, id: impl Into<String>) -> Self {
        Self {
            public_keys,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn verify(&self, wire: &str) -> Result<Token> {
        self.verify_at(wire, Utc::now()).await
    }

    /// Check the signature against every key of the tenant, active first,
    /// then the time window, then classify.
    ///
    /// The footer kid is not consulted; a token only fails with
    /// `InvalidSignature` once every key has been tried.
    pub async fn verify_at(&self, wire: &str, now: DateTime<Utc>) -> Result<Token> {
        if !wire.starts_with(paseto::V4_PUBLIC) {
            return Err(TokenError::Malformed("expected a v4.public token".into()));
        }
        wire::split(wire)?;

        let keys = self.public_keys.get(&self.id).await?;
        let payload = keys
            .iter()
            .find_map(|key| paseto::verify(key, wire).ok())
            .ok_or_else(|| {
                debug!(id = %self.id, keys = keys.len(), "No key verified token");
                TokenError::InvalidSignature
            })?;

        let raw: RawClaims = serde_json::from_slice(&payload)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;

        let expires_at = raw.exp.ok_or(TokenError::MissingClaims("exp"))?;
        if expires_at <= now {
            return Err(TokenError::Expired(expires_at));
        }
        if let Some(not_before) = raw.nbf {
            if not_before > now {
                return Err(TokenError::NotYetValid(not_before));
            }
        }

        Token::from_raw(raw)
    }

    /// Verify and require a specific kind
    pub async fn verify_as(&self, wire: &str, kind: TokenKind) -> Result<Token> {
        let token = self.verify(wire).await?;
        if token.kind() != kind {
            return Err(TokenError::UnsupportedTokenType {
                expected: kind,
                found: token.kind(),
            });
        }
        Ok(token)
    }
}
