//! bridge-collector: turns live source metrics into sample families.
//!
//! # Architecture
//!
//! ```text
//! BridgeExporter
//!   ├── Collector<ScopedSource>   ← typed metrics (counter/gauge/histogram/meter/timer)
//!   ├── Collector<TaggedSource>   ← flat numeric metrics with tags
//!   └── Namespace                 ← prefix for tagged names
//!
//! Collector::collect()
//!   └── MetricRegistry::snapshot() → naming → Allowlist → convert() → SampleFamilyBuilder
//! ```

pub mod builder;
pub mod collector;
pub mod convert;
pub mod exporter;
pub mod instruments;
pub mod namespace;
pub mod naming;
pub mod registry;
pub mod source;

pub use builder::{QUANTILES, SampleFamilyBuilder};
pub use collector::Collector;
pub use convert::convert;
pub use exporter::{BridgeExporter, NAMESPACE_LABEL};
pub use namespace::Namespace;
pub use registry::MetricRegistry;
pub use source::{ScopedSource, SourceModel, TaggedSource};
