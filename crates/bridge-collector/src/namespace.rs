//! Namespace prefix for the tagged source model.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

/// Shared, settable namespace prefix.
///
/// Normally written once before the first scrape, but reads may race with
/// a late reconfiguration.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    inner: Arc<RwLock<Option<String>>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let namespace = Self::new();
        namespace.set(prefix);
        namespace
    }

    pub fn set(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        info!(%prefix, "metrics namespace set");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(prefix);
    }

    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_by_default() {
        assert_eq!(Namespace::new().get(), None);
    }

    #[test]
    fn clones_share_value() {
        let namespace = Namespace::new();
        let other = namespace.clone();
        namespace.set("kafka.server");
        assert_eq!(other.get().as_deref(), Some("kafka.server"));

        other.set("kafka.consumer");
        assert_eq!(namespace.get().as_deref(), Some("kafka.consumer"));
    }
}
