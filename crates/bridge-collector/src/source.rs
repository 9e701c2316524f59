//! The two source metric models and how each one is named and labelled.

use std::fmt;
use std::hash::Hash;

use bridge_core::{BridgeResult, Labels, ScopedName, TaggedName};

use crate::naming::{labels_from_scope, sanitize_labels, scoped_metric_name, tagged_metric_name};

/// Naming rules for one source metric model.
pub trait SourceModel: Send + Sync + 'static {
    /// Identity type the source system keys its metrics by.
    type Name: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Short tag used in logs.
    const SOURCE: &'static str;

    /// Whether names need the namespace prefix.
    const NEEDS_NAMESPACE: bool;

    /// Flattened exposition name, before sanitizing.
    fn metric_name(prefix: &str, name: &Self::Name) -> String;

    /// Ordered labels with sanitized names.
    fn labels(name: &Self::Name) -> BridgeResult<Labels>;

    fn help(name: &Self::Name) -> &str;
}

/// Flat numeric metrics keyed by group, name, and a tag map.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedSource;

impl SourceModel for TaggedSource {
    type Name = TaggedName;

    const SOURCE: &'static str = "tagged";
    const NEEDS_NAMESPACE: bool = true;

    fn metric_name(prefix: &str, name: &TaggedName) -> String {
        tagged_metric_name(prefix, name)
    }

    fn labels(name: &TaggedName) -> BridgeResult<Labels> {
        sanitize_labels(&name.to_string(), &name.tags)
    }

    fn help(name: &TaggedName) -> &str {
        &name.description
    }
}

/// Typed metrics keyed by group, type, name, and a dotted scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedSource;

impl SourceModel for ScopedSource {
    type Name = ScopedName;

    const SOURCE: &'static str = "scoped";
    const NEEDS_NAMESPACE: bool = false;

    fn metric_name(_prefix: &str, name: &ScopedName) -> String {
        scoped_metric_name(name)
    }

    fn labels(name: &ScopedName) -> BridgeResult<Labels> {
        let labels = labels_from_scope(name.scope.as_deref())?;
        sanitize_labels(&name.to_string(), &labels)
    }

    fn help(_name: &ScopedName) -> &str {
        ""
    }
}
