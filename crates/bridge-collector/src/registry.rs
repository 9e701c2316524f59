//! Metric registry: concurrent index of live source metrics.
//!
//! Source systems add and remove metrics from arbitrary threads while
//! scrapes iterate. Every critical section is a single map operation or a
//! shallow copy, so neither side holds the lock for the length of a scrape.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bridge_core::MetricHandle;
use tracing::debug;

/// Concurrent map from metric identity to live metric handle.
pub struct MetricRegistry<K> {
    metrics: RwLock<HashMap<K, MetricHandle>>,
}

impl<K> MetricRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    // Poisoning is recovered: a panicked writer cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, MetricHandle>> {
        self.metrics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, MetricHandle>> {
        self.metrics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the handle for `identity`.
    pub fn add(&self, identity: K, handle: MetricHandle) {
        debug!(metric = %identity, category = handle.category(), "metric added");
        self.write().insert(identity, handle);
    }

    /// Remove `identity` if present. Returns whether it was tracked.
    pub fn remove(&self, identity: &K) -> bool {
        let removed = self.write().remove(identity).is_some();
        if removed {
            debug!(metric = %identity, "metric removed");
        }
        removed
    }

    /// Shallow point-in-time copy of the current entries.
    pub fn snapshot(&self) -> Vec<(K, MetricHandle)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn get(&self, identity: &K) -> Option<MetricHandle> {
        self.read().get(identity).cloned()
    }

    pub fn contains(&self, identity: &K) -> bool {
        self.read().contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<K> Default for MetricRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
