//! Expiry-aware cache of derived public keys.
//!
//! ```text
//! fetched_at ──── refresh_after ──── expires_at
//!     │  fresh: cached  │ stale: cached + │ expired: blocking
//!     │                 │ one background  │ refetch
//!     │                 │ refresh         │
//! ```

use crate::{config::PublicKeyCacheConfig, errors::*, keyset::KeySet};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Weak},
};
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use tracing::{debug, warn};

/// Callback a loader uses to push a new key list into the cache
pub type KeysCallback<K> = Arc<dyn Fn(KeySet<K>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Produces the public keys of a tenant id
#[async_trait]
pub trait PublicKeyLoader<K: Send + Sync + 'static>: Send + Sync {
    /// Load the keys of `id`, active first
    async fn load(&self, id: &str) -> Result<KeySet<K>>;

    /// Load bypassing any cache the loader sits on
    async fn reload(&self, id: &str) -> Result<KeySet<K>> {
        self.load(id).await
    }

    /// Push future key changes of `id` into `on_change`.
    ///
    /// The cache owns `on_change`; a loader should hold it weakly and stop
    /// delivering once it no longer upgrades.
    async fn watch(&self, _id: &str, _on_change: KeysCallback<K>) {}
}

struct Entry<K> {
    generation: u64,
    keys: Arc<[K]>,
    fetched_at: Instant,
    expires_at: Instant,
}

enum Cached<K> {
    Fresh(Arc<[K]>),
    Stale(Arc<[K]>),
    Expired,
    Missing,
}

type Load<K> = Shared<BoxFuture<'static, Result<Arc<[K]>>>>;

/// Public keys per tenant id with expiry and background refresh
pub struct PublicKeyCache<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Clone for PublicKeyCache<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<K> {
    loader: Arc<dyn PublicKeyLoader<K>>,
    config: PublicKeyCacheConfig,
    entries: RwLock<HashMap<String, Entry<K>>>,
    loading: Mutex<HashMap<String, Load<K>>>,
    refreshing: Mutex<HashSet<String>>,
    watchers: Mutex<HashMap<String, KeysCallback<K>>>,
}

impl<K> PublicKeyCache<K>
where
    K: Clone + Send + Sync + 'static,
{
    /// Create a cache; `config` is validated first
    pub fn new(loader: Arc<dyn PublicKeyLoader<K>>, config: PublicKeyCacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                loader,
                config,
                entries: RwLock::new(HashMap::new()),
                loading: Mutex::new(HashMap::new()),
                refreshing: Mutex::new(HashSet::new()),
                watchers: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Keys of `id`, active first
    pub async fn get(&self, id: &str) -> Result<Arc<[K]>> {
        match self.lookup(id).await {
            Cached::Fresh(keys) => Ok(keys),
            Cached::Stale(keys) => {
                self.refresh_in_background(id).await;
                Ok(keys)
            }
            Cached::Expired => {
                debug!(id, "Public keys expired, refetching");
                self.load(id, true).await
            }
            Cached::Missing => self.load(id, false).await,
        }
    }

    /// Replace the keys of `id` with a fresh entry
    pub async fn update(&self, id: &str, keys: Vec<K>) {
        self.inner.insert(id, None, Arc::from(keys)).await;
    }

    /// Drop the entry of `id`
    pub async fn invalidate(&self, id: &str) {
        self.inner.entries.write().await.remove(id);
    }

    async fn lookup(&self, id: &str) -> Cached<K> {
        let now = Instant::now();
        let entries = self.inner.entries.read().await;
        let Some(entry) = entries.get(id) else {
            return Cached::Missing;
        };

        if now >= entry.expires_at {
            Cached::Expired
        } else if now >= entry.fetched_at + self.inner.config.refresh_after() {
            Cached::Stale(Arc::clone(&entry.keys))
        } else {
            Cached::Fresh(Arc::clone(&entry.keys))
        }
    }

    /// Single-flight load of `id`; `force` bypasses the loader's own cache
    async fn load(&self, id: &str, force: bool) -> Result<Arc<[K]>> {
        let load = {
            let mut loading = self.inner.loading.lock().await;
            match loading.get(id) {
                Some(load) => load.clone(),
                None => {
                    let load = Inner::load(Arc::clone(&self.inner), id.to_string(), force);
                    loading.insert(id.to_string(), load.clone());
                    load
                }
            }
        };

        let keys = load.await?;
        self.watch(id).await;
        Ok(keys)
    }

    async fn refresh_in_background(&self, id: &str) {
        if !self.inner.refreshing.lock().await.insert(id.to_string()) {
            return;
        }

        debug!(id, "Refreshing public keys in background");
        let inner = Arc::clone(&self.inner);
        let id = id.to_string();
        tokio::spawn(async move {
            match inner.loader.reload(&id).await {
                Ok(set) => {
                    inner.insert(&id, Some(set.generation), set.keys).await;
                }
                Err(e) => warn!(id = %id, error = %e, "Background public key refresh failed"),
            }
            inner.refreshing.lock().await.remove(&id);
        });
    }

    async fn watch(&self, id: &str) {
        let mut watchers = self.inner.watchers.lock().await;
        if watchers.contains_key(id) {
            return;
        }

        let weak: Weak<Inner<K>> = Arc::downgrade(&self.inner);
        let key_id = id.to_string();
        let on_change: KeysCallback<K> = Arc::new(move |set: KeySet<K>| {
            let weak = weak.clone();
            let id = key_id.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.insert(&id, Some(set.generation), set.keys).await;
                }
            }
            .boxed()
        });
        watchers.insert(id.to_string(), Arc::clone(&on_change));
        drop(watchers);

        self.inner.loader.watch(id, on_change).await;
    }
}

impl<K> Inner<K>
where
    K: Clone + Send + Sync + 'static,
{
    fn load(inner: Arc<Self>, id: String, force: bool) -> Load<K> {
        async move {
            let result = if force {
                inner.loader.reload(&id).await
            } else {
                inner.loader.load(&id).await
            };
            let result = match result {
                Ok(set) => Ok(inner
                    .insert(&id, Some(set.generation), set.keys)
                    .await),
                Err(e) => Err(e),
            };
            inner.loading.lock().await.remove(&id);
            result
        }
        .boxed()
        .shared()
    }

    /// Store `keys` for `id` and return what the entry holds afterwards.
    ///
    /// A set older than the cached one is dropped. `None` keeps the cached
    /// generation, so a manual update always lands.
    async fn insert(&self, id: &str, generation: Option<u64>, keys: Arc<[K]>) -> Arc<[K]> {
        let mut entries = self.entries.write().await;
        let current = entries.get(id).map_or(0, |entry| entry.generation);
        let generation = generation.unwrap_or(current);
        if let Some(entry) = entries.get(id) {
            if generation < entry.generation {
                debug!(
                    id,
                    generation,
                    cached = entry.generation,
                    "Dropping outdated public keys"
                );
                return Arc::clone(&entry.keys);
            }
        }

        let fetched_at = Instant::now();
        let entry = Entry {
            generation,
            keys: Arc::clone(&keys),
            fetched_at,
            expires_at: fetched_at + self.config.ttl,
        };
        debug!(id, keys = keys.len(), generation, "Public keys cached");
        entries.insert(id.to_string(), entry);
        keys
    }
}
