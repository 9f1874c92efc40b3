//! Cached, single-flight access to tenant key sets.

use crate::{config::StoreConfig, errors::*, keyset::KeySet, source::*, watcher::*};
use aegis_crypto::{Seed, SEED_SIZE};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

type Flight = Shared<BoxFuture<'static, Result<KeySet<Seed>>>>;

/// Tenant key sets backed by a [`KeySource`].
///
/// Cheap to clone; clones share the cache, the in-flight map and the
/// watcher. Every rotation, reload and completed fetch is stamped with a
/// fresh generation, and a cached set is only ever replaced by a newer one.
#[derive(Clone)]
pub struct KeyStore {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn KeySource>,
    watcher: Arc<dyn Watcher>,
    config: StoreConfig,
    cache: RwLock<HashMap<String, KeySet<Seed>>>,
    generation: AtomicU64,
    in_flight: Mutex<HashMap<String, Flight>>,
    pushed: Mutex<HashSet<String>>,
}

impl KeyStore {
    /// Create a store with a [`KeyWatcher`]
    pub fn new(source: Arc<dyn KeySource>, config: StoreConfig) -> Self {
        Self::with_watcher(source, Arc::new(KeyWatcher::new()), config)
    }

    pub fn with_watcher(
        source: Arc<dyn KeySource>,
        watcher: Arc<dyn Watcher>,
        config: StoreConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                watcher,
                config,
                cache: RwLock::new(HashMap::new()),
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(HashMap::new()),
                pushed: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Every key of `id`, active first.
    ///
    /// A cache hit is a plain read. Concurrent misses for the same id share
    /// one source fetch and all observe its result, error included.
    pub async fn all_keys(&self, id: &str) -> Result<Arc<[Seed]>> {
        Ok(self.snapshot(id).await?.keys)
    }

    /// Every key of `id` with the generation it was stored at
    pub async fn snapshot(&self, id: &str) -> Result<KeySet<Seed>> {
        if let Some(set) = self.inner.cache.read().await.get(id) {
            return Ok(set.clone());
        }
        self.load(id, false).await
    }

    /// The active key of `id`
    pub async fn one_key(&self, id: &str) -> Result<Seed> {
        self.all_keys(id)
            .await?
            .first()
            .cloned()
            .ok_or_else(|| KeyError::NotFound(id.to_string()))
    }

    /// Register a rotation callback for `id`
    pub async fn subscribe(&self, id: &str, callback: RotationCallback) {
        self.inner.watcher.subscribe(id, callback).await;
    }

    /// Replace the key set of `id` and notify subscribers.
    ///
    /// A fetch still in flight for `id` will not overwrite the new set.
    pub async fn rotate(&self, id: &str, raw_keys: Vec<Vec<u8>>) -> Result<()> {
        let keys = parse_seeds(id, raw_keys)?;
        let set = {
            let mut cache = self.inner.cache.write().await;
            let set = KeySet::new(self.inner.next_generation(), keys);
            cache.insert(id.to_string(), set.clone());
            set
        };

        info!(id, keys = set.len(), generation = set.generation, "Key set rotated");
        self.inner.watcher.notify(id, set).await;
        Ok(())
    }

    /// Refetch `id` from the source, replace the cached set and notify
    pub async fn reload(&self, id: &str) -> Result<KeySet<Seed>> {
        let set = self.load(id, true).await?;
        self.inner.watcher.notify(id, set.clone()).await;
        Ok(set)
    }

    /// Drop the cached set of `id`; the next access refetches
    pub async fn invalidate(&self, id: &str) {
        if self.inner.cache.write().await.remove(id).is_some() {
            debug!(id, "Key set invalidated");
        }
    }

    async fn load(&self, id: &str, force: bool) -> Result<KeySet<Seed>> {
        let flight = {
            let mut in_flight = self.inner.in_flight.lock().await;
            if !force {
                if let Some(set) = self.inner.cache.read().await.get(id) {
                    return Ok(set.clone());
                }
            }

            match in_flight.get(id) {
                Some(flight) => flight.clone(),
                None => {
                    let flight = Inner::flight(Arc::clone(&self.inner), id.to_string());
                    in_flight.insert(id.to_string(), flight.clone());
                    flight
                }
            }
        };

        let set = flight.await?;
        self.watch_source(id).await;
        Ok(set)
    }

    /// Route source pushes for `id` through `rotate`, once per id
    async fn watch_source(&self, id: &str) {
        let Some(subscriber) = self.inner.source.subscriber() else {
            return;
        };
        if !self.inner.pushed.lock().await.insert(id.to_string()) {
            return;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let callback: KeyCallback = Arc::new(move |id: String, raw_keys: Vec<Vec<u8>>| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!(id = %id, "Dropping key push received outside a runtime");
                return;
            };
            runtime.spawn(async move {
                if let Err(e) = (KeyStore { inner }).rotate(&id, raw_keys).await {
                    warn!(id = %id, error = %e, "Rejected pushed key set");
                }
            });
        });
        subscriber.subscribe(id, callback).await;
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn flight(inner: Arc<Inner>, id: String) -> Flight {
        let started = inner.next_generation();
        async move {
            let result = match inner.fetch(&id).await {
                Ok(keys) => Ok(inner.install_fetched(&id, started, keys).await),
                Err(e) => Err(e),
            };
            inner.in_flight.lock().await.remove(&id);
            result
        }
        .boxed()
        .shared()
    }

    /// Cache a fetched set unless a rotation landed after the fetch started,
    /// in which case the rotated set stays and is returned instead
    async fn install_fetched(&self, id: &str, started: u64, keys: Arc<[Seed]>) -> KeySet<Seed> {
        let mut cache = self.cache.write().await;
        if let Some(current) = cache.get(id) {
            if current.generation > started {
                debug!(
                    id,
                    generation = current.generation,
                    "Discarding fetch superseded by a rotation"
                );
                return current.clone();
            }
        }

        let set = KeySet::new(self.next_generation(), keys);
        cache.insert(id.to_string(), set.clone());
        set
    }

    async fn fetch(&self, id: &str) -> Result<Arc<[Seed]>> {
        let timeout = self.config.fetch_timeout;
        let raw_keys = match tokio::time::timeout(timeout, self.source.fetch(id)).await {
            Ok(result) => result.inspect_err(|e| warn!(id, error = %e, "Key fetch failed"))?,
            Err(_) => {
                warn!(id, ?timeout, "Key fetch timed out");
                return Err(KeyError::Timeout {
                    id: id.to_string(),
                    timeout,
                });
            }
        };

        let keys = parse_seeds(id, raw_keys)?;
        debug!(id, keys = keys.len(), "Fetched key set");
        Ok(keys)
    }
}

fn parse_seeds(id: &str, raw_keys: Vec<Vec<u8>>) -> Result<Arc<[Seed]>> {
    raw_keys
        .iter()
        .map(|raw| {
            Seed::from_bytes(raw).map_err(|_| KeyError::InvalidFormat {
                id: id.to_string(),
                expected: SEED_SIZE,
                actual: raw.len(),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Arc::from)
}
