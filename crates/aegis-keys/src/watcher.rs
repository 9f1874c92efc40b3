//! Rotation fan-out.

use crate::keyset::KeySet;
use aegis_crypto::Seed;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

/// Rotation callback, invoked with `(id, new_keys)`.
///
/// Returns the work to run for this rotation, or `None` once the subscriber
/// is gone; a watcher drops callbacks that return `None`.
pub type RotationCallback =
    Arc<dyn Fn(String, KeySet<Seed>) -> Option<BoxFuture<'static, ()>> + Send + Sync>;

/// Delivers key rotations to subscribers
#[async_trait]
pub trait Watcher: Send + Sync {
    /// Register a callback for rotations of `id`
    async fn subscribe(&self, id: &str, callback: RotationCallback);

    /// Announce a new key set for `id`
    async fn notify(&self, id: &str, keys: KeySet<Seed>);
}

/// Best-effort asynchronous watcher.
///
/// Every callback runs on its own task, so a slow subscriber never holds up
/// the notifier or the other subscribers.
#[derive(Default)]
pub struct KeyWatcher {
    callbacks: RwLock<HashMap<String, Vec<RotationCallback>>>,
}

impl KeyWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks registered for `id`
    pub async fn subscriber_count(&self, id: &str) -> usize {
        self.callbacks.read().await.get(id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl Watcher for KeyWatcher {
    async fn subscribe(&self, id: &str, callback: RotationCallback) {
        self.callbacks
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .push(callback);
    }

    async fn notify(&self, id: &str, keys: KeySet<Seed>) {
        let mut callbacks = self.callbacks.write().await;
        let Some(subscribers) = callbacks.get_mut(id) else {
            return;
        };

        let before = subscribers.len();
        subscribers.retain(|callback| match callback(id.to_string(), keys.clone()) {
            Some(task) => {
                tokio::spawn(task);
                true
            }
            None => false,
        });

        debug!(
            id,
            generation = keys.generation,
            subscribers = subscribers.len(),
            dropped = before - subscribers.len(),
            "Notifying key rotation"
        );
        if subscribers.is_empty() {
            callbacks.remove(id);
        }
    }
}

/// Watcher that drops every subscription and notification
pub struct NoopWatcher;

#[async_trait]
impl Watcher for NoopWatcher {
    async fn subscribe(&self, _id: &str, _callback: RotationCallback) {}

    async fn notify(&self, _id: &str, _keys: KeySet<Seed>) {}
}
