//! Bearer string to verified token.

use crate::{
    cryptor::Decryptor, errors::*, registry::Registry, token::Token, types::UserInfo,
    verifier::Verifier, wire,
};
use aegis_keys::{KeyError, KeyStore, PublicKeyCache};
use ed25519_dalek::VerifyingKey;
use std::sync::Arc;
use tracing::debug;

/// Verifies tokens of any tenant and opens user access tokens.
///
/// Holds one [`Verifier`] per client id and one [`Decryptor`] per audience,
/// each created on first use.
pub struct Interpreter {
    sign_keys: PublicKeyCache<VerifyingKey>,
    encrypt_store: KeyStore,
    verifiers: Registry<Verifier>,
    decryptors: Registry<Decryptor>,
}

impl Interpreter {
    pub fn new(sign_keys: PublicKeyCache<VerifyingKey>, encrypt_store: KeyStore) -> Self {
        Self {
            sign_keys,
            encrypt_store,
            verifiers: Registry::new(),
            decryptors: Registry::new(),
        }
    }

    /// Verify `wire` and, for a user access token, decrypt its user info
    pub async fn interpret(&self, wire: &str) -> Result<Token> {
        match self.verify(wire).await? {
            Token::User(mut uat) => {
                let audience = uat.claims().audience.clone();
                let sealed = uat
                    .encrypted_subject()
                    .ok_or(TokenError::MissingClaims("sub"))?
                    .to_string();

                let decryptor = self.decryptor(&audience).await;
                let user: UserInfo = decryptor.decrypt_json(&sealed).await.map_err(|e| match e {
                    TokenError::Key(KeyError::NotFound(_)) => {
                        TokenError::UnsupportedAudience(audience.clone())
                    }
                    other => other,
                })?;

                uat.attach_user(user);
                Ok(Token::User(uat))
            }
            other => Ok(other),
        }
    }

    /// Verify `wire` under the keys of the client it claims to come from
    pub async fn verify(&self, wire: &str) -> Result<Token> {
        let raw = wire::unverified_claims(wire)?;
        let audience = raw.audience().ok_or(TokenError::MissingClaims("aud"))?;
        let client_id = raw.client_id().ok_or(TokenError::MissingClaims("cli"))?;
        debug!(client_id, audience, "Interpreting token");

        let verifier = self.verifier(client_id).await;
        verifier.verify(wire).await
    }

    async fn verifier(&self, client_id: &str) -> Arc<Verifier> {
        self.verifiers
            .get_or_create(client_id, || async {
                Verifier::new(self.sign_keys.clone(), client_id)
            })
            .await
    }

    async fn decryptor(&self, audience: &str) -> Arc<Decryptor> {
        self.decryptors
            .get_or_create(audience, || {
                Decryptor::new(self.encrypt_store.clone(), audience)
            })
            .await
    }
}
