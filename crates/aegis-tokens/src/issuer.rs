//! Client access token issuance.

use crate::{
    errors::*,
    registry::Registry,
    signer::Signer,
    token::{ClientAccessToken, Token, CAT_AUDIENCE, CAT_MAX_TTL},
};
use aegis_keys::KeyStore;
use std::sync::Arc;
use tracing::debug;

/// Mints client access tokens, signed by the caller's own key
pub struct Issuer {
    store: KeyStore,
    audience: String,
    signers: Registry<Signer>,
}

impl Issuer {
    pub fn new(store: KeyStore) -> Self {
        Self {
            store,
            audience: CAT_AUDIENCE.to_string(),
            signers: Registry::new(),
        }
    }

    /// Issue for a different authorization service id
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// A five-minute CAT with `sub = iss = caller_id`
    pub async fn issue(&self, caller_id: &str) -> Result<String> {
        let cat = ClientAccessToken::new(caller_id, &self.audience, CAT_MAX_TTL)?;
        let signer = self.signer(caller_id).await;

        debug!(caller_id, audience = %self.audience, "Issuing client access token");
        signer.sign(&Token::Client(cat)).await
    }

    async fn signer(&self, caller_id: &str) -> Arc<Signer> {
        self.signers
            .get_or_create(caller_id, || Signer::new(self.store.clone(), caller_id))
            .await
    }
}
