//! Test helpers and mock sources.

use crate::*;
use aegis_crypto::{Seed, SEED_SIZE};
use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::RwLock;

/// Raw seed bytes filled with `fill`
pub fn create_test_raw_seed(fill: u8) -> Vec<u8> {
    vec![fill; SEED_SIZE]
}

pub fn create_test_seed(fill: u8) -> Seed {
    Seed::from_bytes(&create_test_raw_seed(fill)).unwrap()
}

/// Source that counts fetches and sleeps before answering
pub struct CountingSource {
    pub keys: RwLock<Vec<Vec<u8>>>,
    pub fetches: AtomicUsize,
    pub delay: Duration,
}

impl CountingSource {
    pub fn new(keys: Vec<Vec<u8>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            keys: RwLock::new(keys),
            fetches: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for CountingSource {
    async fn fetch(&self, id: &str) -> Result<Vec<Vec<u8>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let keys = self.keys.read().await.clone();
        if keys.is_empty() {
            return Err(KeyError::NotFound(id.to_string()));
        }
        Ok(keys)
    }
}

/// Source whose backend always fails
pub struct FailingSource;

#[async_trait]
impl KeySource for FailingSource {
    async fn fetch(&self, id: &str) -> Result<Vec<Vec<u8>>> {
        Err(KeyError::from_source(id, "secret store unavailable"))
    }
}

pub fn create_test_store(source: Arc<dyn KeySource>) -> KeyStore {
    KeyStore::new(source, StoreConfig::default())
}

/// Loader serving a fixed key list at a settable generation, counting loads
pub struct CountingLoader {
    pub value: RwLock<Vec<u8>>,
    pub generation: AtomicU64,
    pub loads: AtomicUsize,
    pub reloads: AtomicUsize,
}

impl CountingLoader {
    pub fn new(value: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            value: RwLock::new(value),
            generation: AtomicU64::new(0),
            loads: AtomicUsize::new(0),
            reloads: AtomicUsize::new(0),
        })
    }

    async fn current(&self) -> KeySet<u8> {
        let value = self.value.read().await.clone();
        KeySet::new(self.generation.load(Ordering::SeqCst), value)
    }
}

#[async_trait]
impl PublicKeyLoader<u8> for CountingLoader {
    async fn load(&self, _id: &str) -> Result<KeySet<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(self.current().await)
    }

    async fn reload(&self, _id: &str) -> Result<KeySet<u8>> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.current().await)
    }
}
