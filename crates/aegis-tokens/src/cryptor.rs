//! PASETO v4.local encryption under a tenant's symmetric keys.

use crate::{errors::*, token::UserAccessToken, wire::Footer};
use aegis_crypto::{derive_symmetric_key, paseto, Seed, SymmetricKey};
use aegis_keys::{derive_blocking, KeyError, KeySet, KeySlot, KeyStore, RotationCallback};
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

type Slot = KeySlot<[SymmetricKey]>;

/// Derived symmetric keys of one tenant, swapped on rotation
struct KeyRing {
    store: KeyStore,
    id: String,
    keys: Arc<Slot>,
}

impl KeyRing {
    async fn new(store: KeyStore, id: String) -> Self {
        let keys: Arc<Slot> = Arc::new(KeySlot::new());
        store.subscribe(&id, on_rotate(Arc::downgrade(&keys))).await;
        Self { store, id, keys }
    }

    async fn ensure(&self) -> Result<Arc<[SymmetricKey]>> {
        let (store, id) = (&self.store, self.id.as_str());
        self.keys
            .get_or_load(|| async move {
                let seeds = store.snapshot(id).await?;
                let keys = derive_keys(seeds.keys).await?;
                if keys.is_empty() {
                    return Err(KeyError::NotFound(id.to_string()).into());
                }
                debug!(id, keys = keys.len(), "Symmetric keys loaded");
                Ok::<_, TokenError>((seeds.generation, keys))
            })
            .await
    }
}

fn on_rotate(weak: Weak<Slot>) -> RotationCallback {
    Arc::new(move |id: String, seeds: KeySet<Seed>| {
        let slot = weak.upgrade()?;
        Some(
            async move {
                let generation = seeds.generation;
                match derive_keys(seeds.keys).await {
                    Ok(keys) if !keys.is_empty() => {
                        let kid = keys[0].lid();
                        if slot.set(generation, Some(keys)).await {
                            info!(id = %id, kid = %kid, "Symmetric keys rotated");
                        } else {
                            debug!(id = %id, generation, "Superseded symmetric keys");
                        }
                    }
                    Ok(_) => {
                        slot.set(generation, None).await;
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Symmetric key rotation failed");
                        slot.set(generation, None).await;
                    }
                }
            }
            .boxed(),
        )
    })
}

async fn derive_keys(seeds: Arc<[Seed]>) -> Result<Arc<[SymmetricKey]>> {
    let keys = derive_blocking(seeds, |seed| Ok(derive_symmetric_key(seed)?)).await?;
    Ok(Arc::from(keys))
}

/// Encrypts payloads for one tenant id under its active key
pub struct Encryptor {
    ring: KeyRing,
}

impl Encryptor {
    pub async fn new(store: KeyStore, id: impl Into<String>) -> Self {
        Self {
            ring: KeyRing::new(store, id.into()).await,
        }
    }

    pub fn id(&self) -> &str {
        &self.ring.id
    }

    /// Encrypt with a fresh nonce; the footer carries the key's `k4.lid.` id
    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let keys = self.ring.ensure().await?;
        let active = &keys[0];
        let footer = Footer::new(active.lid()).to_bytes()?;
        Ok(paseto::encrypt(active, plaintext, &footer)?)
    }

    pub async fn encrypt_json<T: Serialize>(&self, value: &T) -> Result<String> {
        self.encrypt(&serde_json::to_vec(value)?).await
    }

    /// Encrypt the user info of `uat` into its `sub` claim.
    ///
    /// The encryptor must belong to the token's audience.
    pub async fn seal(&self, uat: &mut UserAccessToken) -> Result<()> {
        if uat.claims().audience != self.ring.id {
            return Err(TokenError::UnsupportedAudience(uat.claims().audience.clone()));
        }
        let user = uat.user().ok_or(TokenError::MissingClaims("sub"))?;
        let sealed = self.encrypt_json(user).await?;
        uat.set_encrypted_subject(sealed);
        Ok(())
    }
}

/// Decrypts payloads for one tenant id under any of its keys
pub struct Decryptor {
    ring: KeyRing,
}

impl Decryptor {
    pub async fn new(store: KeyStore, id: impl Into<String>) -> Self {
        Self {
            ring: KeyRing::new(store, id.into()).await,
        }
    }

    pub fn id(&self) -> &str {
        &self.ring.id
    }

    /// Try every key, active first.
    ///
    /// Any authentication or format failure is `DecryptFailed`; nothing is
    /// returned unless the tag verified.
    pub async fn decrypt(&self, wire: &str) -> Result<Vec<u8>> {
        let keys = self.ring.ensure().await?;
        keys.iter()
            .find_map(|key| paseto::decrypt(key, wire).ok())
            .ok_or(TokenError::DecryptFailed)
    }

    pub async fn decrypt_json<T: DeserializeOwned>(&self, wire: &str) -> Result<T> {
        let plaintext = self.decrypt(wire).await?;
        serde_json::from_slice(&plaintext).map_err(|_| TokenError::DecryptFailed)
    }
}
