use std::{collections::HashMap, future::Future, sync::Arc};
use tokio::sync::RwLock;

/// Per-id instances, created at most once per id
pub(crate) struct Registry<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) async fn get_or_create<F, Fut>(&self, id: &str, create: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(entry) = self.entries.read().await.get(id) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(id) {
            return Arc::clone(entry);
        }
        let entry = Arc::new(create().await);
        entries.insert(id.to_string(), Arc::clone(&entry));
        entry
    }
}
