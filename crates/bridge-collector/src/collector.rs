//! Collector: one per source system.
//!
//! Tracks the live metrics a source system reports and turns them into
//! sample families on every scrape.
//!
//! ```text
//! snapshot registry
//!   └── per entry: name → allowlist → labels → convert → family
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use bridge_core::{Allowlist, BridgeError, BridgeResult, MetricHandle, SampleFamily};
use tracing::{debug, error, trace, warn};

use crate::convert::convert;
use crate::namespace::Namespace;
use crate::registry::MetricRegistry;
use crate::source::SourceModel;

pub struct Collector<M: SourceModel> {
    registry: MetricRegistry<M::Name>,
    allowlist: Arc<Allowlist>,
    namespace: Namespace,
    _model: PhantomData<M>,
}

impl<M: SourceModel> Collector<M> {
    pub fn new(allowlist: Arc<Allowlist>, namespace: Namespace) -> Self {
        Self {
            registry: MetricRegistry::new(),
            allowlist,
            namespace,
            _model: PhantomData,
        }
    }

    /// Track a metric, replacing any handle already stored for `name`.
    pub fn add_metric(&self, name: M::Name, handle: MetricHandle) {
        self.registry.add(name, handle);
    }

    pub fn remove_metric(&self, name: &M::Name) -> bool {
        self.registry.remove(name)
    }

    pub fn registry(&self) -> &MetricRegistry<M::Name> {
        &self.registry
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Run one collection pass.
    ///
    /// A bad metric only drops that metric. The pass as a whole fails only
    /// when tracked metrics need a namespace that has not been set.
    pub fn collect(&self) -> BridgeResult<Vec<SampleFamily>> {
        let entries = self.registry.snapshot();
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let prefix = match self.namespace.get() {
            Some(prefix) => prefix,
            None if M::NEEDS_NAMESPACE => {
                error!(
                    source = M::SOURCE,
                    metrics = entries.len(),
                    "cannot name metrics: namespace not set"
                );
                return Err(BridgeError::NamespaceUnset);
            }
            None => String::new(),
        };

        let mut families = Vec::with_capacity(entries.len());
        for (identity, handle) in &entries {
            trace!(source = M::SOURCE, metric = %identity, "collecting metric");

            let name = M::metric_name(&prefix, identity);
            // Labels are not considered when filtering.
            if !self.allowlist.is_allowed(&name) {
                trace!(source = M::SOURCE, %name, "metric not allowed");
                continue;
            }

            let family = M::labels(identity)
                .and_then(|labels| convert(&name, M::help(identity), handle, &labels));
            match family {
                Ok(Some(family)) => families.push(family),
                Ok(None) => {}
                Err(e) => {
                    warn!(source = M::SOURCE, metric = ?identity, error = %e, "dropping metric");
                }
            }
        }

        families.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(
            source = M::SOURCE,
            tracked = entries.len(),
            exported = families.len(),
            "collection pass complete"
        );
        Ok(families)
    }
}
