//! Public keys derived from a [`KeyStore`].

use crate::{errors::*, keyset::KeySet, pubkey::*, store::KeyStore};
use aegis_crypto::{CryptoError, Seed};
use async_trait::async_trait;
use futures::FutureExt;
use std::sync::Arc;
use tracing::warn;

type DeriveFn<K> = dyn Fn(&Seed) -> Result<K> + Send + Sync;

/// Run `derive` over every seed on the blocking pool.
///
/// Seed derivation is Argon2id with 64 MiB of memory; it never runs on an
/// async worker thread.
pub async fn derive_blocking<K, F>(seeds: Arc<[Seed]>, derive: F) -> Result<Vec<K>>
where
    K: Send + 'static,
    F: Fn(&Seed) -> Result<K> + Send + 'static,
{
    tokio::task::spawn_blocking(move || seeds.iter().map(&derive).collect())
        .await
        .map_err(|e| KeyError::Crypto(CryptoError::KeyDerivationFailed(e.to_string())))?
}

/// [`PublicKeyLoader`] deriving keys from the seeds held by a [`KeyStore`]
pub struct SeedLoader<K> {
    store: KeyStore,
    derive: Arc<DeriveFn<K>>,
}

impl<K> SeedLoader<K>
where
    K: Send + Sync + 'static,
{
    pub fn new<F>(store: KeyStore, derive: F) -> Self
    where
        F: Fn(&Seed) -> Result<K> + Send + Sync + 'static,
    {
        Self {
            store,
            derive: Arc::new(derive),
        }
    }

    async fn derive_all(&self, seeds: Arc<[Seed]>) -> Result<Vec<K>> {
        let derive = Arc::clone(&self.derive);
        derive_blocking(seeds, move |seed| derive(seed)).await
    }
}

#[async_trait]
impl<K> PublicKeyLoader<K> for SeedLoader<K>
where
    K: Send + Sync + 'static,
{
    async fn load(&self, id: &str) -> Result<KeySet<K>> {
        let seeds = self.store.snapshot(id).await?;
        let keys = self.derive_all(seeds.keys).await?;
        Ok(KeySet::new(seeds.generation, keys))
    }

    async fn reload(&self, id: &str) -> Result<KeySet<K>> {
        let seeds = self.store.reload(id).await?;
        let keys = self.derive_all(seeds.keys).await?;
        Ok(KeySet::new(seeds.generation, keys))
    }

    async fn watch(&self, id: &str, on_change: KeysCallback<K>) {
        let derive = Arc::clone(&self.derive);
        let on_change = Arc::downgrade(&on_change);
        self.store
            .subscribe(
                id,
                Arc::new(move |id: String, seeds: KeySet<Seed>| {
                    let on_change = on_change.upgrade()?;
                    let derive = Arc::clone(&derive);
                    Some(
                        async move {
                            let generation = seeds.generation;
                            match derive_blocking(seeds.keys, move |seed| derive(seed)).await {
                                Ok(keys) => on_change(KeySet::new(generation, keys)).await,
                                Err(e) => warn!(id = %id, error = %e, "Dropping rotated keys"),
                            }
                        }
                        .boxed(),
                    )
                }),
            )
            .await;
    }
}
