//! Key source abstraction.

use crate::errors::*;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

/// Push callback invoked with `(id, raw_keys)` when a source rotates an id
pub type KeyCallback = Arc<dyn Fn(String, Vec<Vec<u8>>) + Send + Sync>;

/// Backend that returns the raw seeds of a tenant id, active first
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch every raw seed currently valid for `id`
    async fn fetch(&self, id: &str) -> Result<Vec<Vec<u8>>>;

    /// Push capability, if the backend can announce rotations
    fn subscriber(&self) -> Option<&dyn KeySubscriber> {
        None
    }
}

/// Sources that push rotations implement this as well
#[async_trait]
pub trait KeySubscriber: Send + Sync {
    /// Register `callback` for rotations of `id`
    async fn subscribe(&self, id: &str, callback: KeyCallback);
}

/// Returns the same key list for every id.
///
/// Useful for single-tenant deployments and tests. `rotate` swaps the list
/// and pushes it to every subscriber of the given id.
pub struct StaticSource {
    keys: RwLock<Vec<Vec<u8>>>,
    subscribers: RwLock<HashMap<String, Vec<KeyCallback>>>,
}

impl StaticSource {
    pub fn new(keys: Vec<Vec<u8>>) -> Self {
        Self {
            keys: RwLock::new(keys),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the key list and notify subscribers of `id`
    pub async fn rotate(&self, id: &str, keys: Vec<Vec<u8>>) {
        *self.keys.write().await = keys.clone();

        let callbacks = self
            .subscribers
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default();
        debug!(id, subscribers = callbacks.len(), "Static source rotated");
        for callback in callbacks {
            callback(id.to_string(), keys.clone());
        }
    }
}

#[async_trait]
impl KeySource for StaticSource {
    async fn fetch(&self, id: &str) -> Result<Vec<Vec<u8>>> {
        let keys = self.keys.read().await;
        if keys.is_empty() {
            return Err(KeyError::NotFound(id.to_string()));
        }
        Ok(keys.clone())
    }

    fn subscriber(&self) -> Option<&dyn KeySubscriber> {
        Some(self)
    }
}

#[async_trait]
impl KeySubscriber for StaticSource {
    async fn subscribe(&self, id: &str, callback: KeyCallback) {
        self.subscribers
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .push(callback);
    }
}

type FetchFn = dyn Fn(String) -> BoxFuture<'static, Result<Vec<Vec<u8>>>> + Send + Sync;

/// Adapts an async closure into a [`KeySource`]
pub struct FnSource {
    fetch: Box<FetchFn>,
}

impl FnSource {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(String) -> BoxFuture<'static, Result<Vec<Vec<u8>>>> + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
        }
    }
}

#[async_trait]
impl KeySource for FnSource {
    async fn fetch(&self, id: &str) -> Result<Vec<Vec<u8>>> {
        (self.fetch)(id.to_string()).await
    }
}
