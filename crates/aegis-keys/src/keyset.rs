//! Generation-stamped key sets and the slots that hold values derived from
//! them.

use std::{future::Future, sync::Arc};
use tokio::sync::RwLock;

/// A key set together with the store generation it was produced at.
///
/// A store hands out strictly increasing generations for every rotation,
/// reload and completed fetch. Of two sets for the same id, the one with the
/// higher generation is the newer one.
#[derive(Debug)]
pub struct KeySet<K> {
    pub generation: u64,
    pub keys: Arc<[K]>,
}

impl<K> KeySet<K> {
    pub fn new(generation: u64, keys: impl Into<Arc<[K]>>) -> Self {
        Self {
            generation,
            keys: keys.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K> Clone for KeySet<K> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            keys: Arc::clone(&self.keys),
        }
    }
}

/// Latest-wins holder for a value derived from a key set.
///
/// Rotations derive off the notifying task and may finish out of order; a
/// write stamped with an older generation than the one held is dropped.
pub struct KeySlot<T: ?Sized> {
    state: RwLock<SlotState<T>>,
}

struct SlotState<T: ?Sized> {
    generation: u64,
    value: Option<Arc<T>>,
}

impl<T: ?Sized> Default for KeySlot<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(SlotState {
                generation: 0,
                value: None,
            }),
        }
    }
}

impl<T: ?Sized + Send + Sync> KeySlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<T>> {
        self.state.read().await.value.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Install `value` derived at `generation`.
    ///
    /// `None` empties the slot. Returns `false` when the slot already holds a
    /// newer generation and the write was dropped.
    pub async fn set(&self, generation: u64, value: Option<Arc<T>>) -> bool {
        let mut state = self.state.write().await;
        if generation < state.generation {
            return false;
        }
        state.generation = generation;
        state.value = value;
        true
    }

    /// Current value, or the result of `load` when the slot is empty.
    ///
    /// Concurrent callers on an empty slot wait for the first `load` instead
    /// of running their own. The loaded value is kept unless a newer
    /// generation landed meanwhile.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(u64, Arc<T>), E>>,
    {
        if let Some(value) = self.state.read().await.value.as_ref() {
            return Ok(Arc::clone(value));
        }

        let mut state = self.state.write().await;
        if let Some(value) = state.value.as_ref() {
            return Ok(Arc::clone(value));
        }

        let (generation, value) = load().await?;
        if generation >= state.generation {
            state.generation = generation;
            state.value = Some(Arc::clone(&value));
        }
        Ok(value)
    }
}
