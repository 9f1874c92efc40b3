//! PASETO v4.public signing under a tenant's active seed.

use crate::{errors::*, token::Token, wire::Footer};
use aegis_crypto::{derive_signing_key_pair, paseto, CryptoError, Seed, SigningKeyPair};
use aegis_keys::{KeyError, KeySet, KeySlot, KeyStore};
use ed25519_dalek::VerifyingKey;
use futures::FutureExt;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

type Slot = KeySlot<SigningKeyPair>;

/// Signs tokens for one tenant id.
///
/// The key pair is derived lazily from the store's active seed and replaced
/// whenever the store announces a rotation for the id. Rotations that finish
/// deriving out of order never replace a newer key with an older one.
pub struct Signer {
    store: KeyStore,
    id: String,
    key: Arc<Slot>,
}

impl Signer {
    pub async fn new(store: KeyStore, id: impl Into<String>) -> Self {
        let id = id.into();
        let key: Arc<Slot> = Arc::new(KeySlot::new());

        let weak: Weak<Slot> = Arc::downgrade(&key);
        store
            .subscribe(
                &id,
                Arc::new(move |id: String, seeds: KeySet<Seed>| {
                    let slot = weak.upgrade()?;
                    Some(
                        async move {
                            let generation = seeds.generation;
                            let Some(active) = seeds.keys.first().cloned() else {
                                slot.set(generation, None).await;
                                return;
                            };
                            match derive_pair(active).await {
                                Ok(pair) => {
                                    let kid = pair.pid();
                                    if slot.set(generation, Some(pair)).await {
                                        info!(id = %id, kid = %kid, "Signing key rotated");
                                    } else {
                                        debug!(id = %id, generation, "Superseded signing key");
                                    }
                                }
                                Err(e) => {
                                    warn!(id = %id, error = %e, "Signing key rotation failed");
                                    slot.set(generation, None).await;
                                }
                            }
                        }
                        .boxed(),
                    )
                }),
            )
            .await;

        Self { store, id, key }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sign `token`; the footer carries the key's `k4.pid.` id
    pub async fn sign(&self, token: &Token) -> Result<String> {
        let pair = self.ensure().await?;
        let payload = serde_json::to_vec(&token.to_raw()?)?;
        let footer = Footer::new(pair.pid()).to_bytes()?;

        debug!(id = %self.id, kind = %token.kind(), "Signing token");
        Ok(paseto::sign(&pair, &payload, &footer)?)
    }

    pub async fn public_key(&self) -> Result<VerifyingKey> {
        Ok(*self.ensure().await?.public_key())
    }

    /// `k4.pid.` id of the active key
    pub async fn kid(&self) -> Result<String> {
        Ok(self.ensure().await?.pid())
    }

    async fn ensure(&self) -> Result<Arc<SigningKeyPair>> {
        let (store, id) = (&self.store, self.id.as_str());
        self.key
            .get_or_load(|| async move {
                let seeds = store.snapshot(id).await?;
                let seed = seeds
                    .keys
                    .first()
                    .cloned()
                    .ok_or_else(|| KeyError::NotFound(id.to_string()))?;
                let pair = derive_pair(seed).await?;
                debug!(id, kid = %pair.pid(), "Signing key loaded");
                Ok::<_, TokenError>((seeds.generation, pair))
            })
            .await
    }
}

async fn derive_pair(seed: Seed) -> Result<Arc<SigningKeyPair>> {
    let pair = tokio::task::spawn_blocking(move || derive_signing_key_pair(&seed))
        .await
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))??;
    Ok(Arc::new(pair))
}
