//! Type conversion from source metric handles to sample families.
//!
//! | Handle | Family | Samples |
//! |---|---|---|
//! | `Simple`, `Gauge` | gauge | current value, skipped when non-numeric |
//! | `Counter` | counter | count |
//! | `Meter` | counter | event count (rates are not exported) |
//! | `Histogram`, `Timer` | summary | count, then one per quantile |

use bridge_core::{BridgeResult, MetricHandle, SampleFamily, SampleKind};
use tracing::trace;

use crate::builder::SampleFamilyBuilder;

/// Convert one live metric into at most one family.
///
/// Returns `Ok(None)` when the metric currently holds a non-numeric value.
pub fn convert(
    name: &str,
    help: &str,
    handle: &MetricHandle,
    labels: &[(String, String)],
) -> BridgeResult<Option<SampleFamily>> {
    let builder = match handle {
        MetricHandle::Simple(metric) | MetricHandle::Gauge(metric) => {
            let value = metric.value();
            let Some(value) = value.as_number() else {
                trace!(%name, ?value, "skipping non-numeric metric");
                return Ok(None);
            };
            SampleFamilyBuilder::new(SampleKind::Gauge, help).add_sample(name, value, labels)
        }
        MetricHandle::Counter(counter) | MetricHandle::Meter(counter) => {
            SampleFamilyBuilder::new(SampleKind::Counter, help).add_sample(
                name,
                counter.count() as f64,
                labels,
            )
        }
        MetricHandle::Histogram(distribution) | MetricHandle::Timer(distribution) => {
            let snapshot = distribution.snapshot();
            SampleFamilyBuilder::new(SampleKind::Summary, help)
                .add_sample(name, distribution.count() as f64, labels)
                .add_quantile_samples(name, &snapshot, labels)
        }
    };
    builder.build().map(Some)
}
