//! Bridge exporter: the boundary the owning metric systems talk to.
//!
//! Owns one collector per source model plus the namespace prefix, and
//! answers scrapes with both collectors' output merged by name.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bridge_core::{
    BridgeConfig, BridgeError, BridgeResult, MetricHandle, SampleFamily, ScopedName, TaggedName,
};
use tracing::{debug, info, warn};

use crate::collector::Collector;
use crate::namespace::Namespace;
use crate::source::{ScopedSource, TaggedSource};

/// Context label carrying the namespace prefix.
pub const NAMESPACE_LABEL: &str = "_namespace";

pub struct BridgeExporter {
    config: BridgeConfig,
    namespace: Namespace,
    tagged: Collector<TaggedSource>,
    scoped: Collector<ScopedSource>,
    closed: AtomicBool,
}

impl BridgeExporter {
    /// Build an exporter, compiling the allowlist. An invalid pattern fails here.
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let allowlist = Arc::new(config.compile_allowlist()?);
        let namespace = Namespace::new();
        info!(%config, "metrics exporter configured");
        Ok(Self {
            tagged: Collector::new(allowlist.clone(), namespace.clone()),
            scoped: Collector::new(allowlist, namespace.clone()),
            namespace,
            config,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn tagged(&self) -> &Collector<TaggedSource> {
        &self.tagged
    }

    pub fn scoped(&self) -> &Collector<ScopedSource> {
        &self.scoped
    }

    // ── Tagged model ───────────────────────────────────────────

    /// Register the metrics a source system already holds at startup.
    pub fn init_tagged<I>(&self, metrics: I)
    where
        I: IntoIterator<Item = (TaggedName, MetricHandle)>,
    {
        for (name, handle) in metrics {
            self.on_metric_added(name, handle);
        }
    }

    pub fn on_metric_added(&self, name: TaggedName, handle: MetricHandle) {
        self.tagged.add_metric(name, handle);
    }

    pub fn on_metric_removed(&self, name: &TaggedName) {
        self.tagged.remove_metric(name);
    }

    // ── Scoped model ───────────────────────────────────────────

    pub fn on_scoped_metric_added(&self, name: ScopedName, handle: MetricHandle) {
        self.scoped.add_metric(name, handle);
    }

    pub fn on_scoped_metric_removed(&self, name: &ScopedName) {
        self.scoped.remove_metric(name);
    }

    // ── Context ────────────────────────────────────────────────

    pub fn on_namespace_change(&self, namespace: &str) {
        self.namespace.set(namespace);
    }

    /// Pick the namespace out of a source system's context labels.
    pub fn on_context_change(&self, labels: &HashMap<String, String>) {
        debug!(?labels, "metrics context changed");
        match labels.get(NAMESPACE_LABEL) {
            Some(namespace) => self.on_namespace_change(namespace),
            None => warn!(label = NAMESPACE_LABEL, "context change without namespace label"),
        }
    }

    /// Collect both models into one list ordered by name.
    ///
    /// Without a namespace the tagged model is skipped for this pass (the
    /// collector logs it) and the scoped families are still returned.
    /// Families sharing a name must share a kind: a later family of another
    /// kind is dropped.
    pub fn collect(&self) -> BridgeResult<Vec<SampleFamily>> {
        let mut families = self.scoped.collect()?;
        match self.tagged.collect() {
            Ok(tagged) => families.extend(tagged),
            Err(BridgeError::NamespaceUnset) => {}
            Err(e) => return Err(e),
        }
        families.sort_by(|a, b| a.name().cmp(b.name()));

        let mut merged: Vec<SampleFamily> = Vec::with_capacity(families.len());
        for family in families {
            let conflict = merged
                .last()
                .filter(|prev| prev.name() == family.name() && prev.kind() != family.kind())
                .map(SampleFamily::kind);
            match conflict {
                Some(kept) => warn!(
                    name = family.name(),
                    kept = %kept,
                    dropped = %family.kind(),
                    "dropping metric family with conflicting type"
                ),
                None => merged.push(family),
            }
        }
        Ok(merged)
    }

    /// Mark the exporter closed. Later callbacks are still accepted.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("metrics exporter closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
