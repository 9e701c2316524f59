//! Live metric handles owned by the source systems.
//!
//! The bridge never owns a metric's lifecycle. It keeps an `Arc` to the
//! source-side object and reads it on every collection pass.

use std::fmt;
use std::sync::Arc;

use crate::types::{MetricValue, QuantileSnapshot};

/// A metric whose current value can be read, possibly non-numeric.
pub trait Measurable: Send + Sync {
    fn value(&self) -> MetricValue;
}

impl<F> Measurable for F
where
    F: Fn() -> MetricValue + Send + Sync,
{
    fn value(&self) -> MetricValue {
        self()
    }
}

/// A metric exposing a cumulative count.
pub trait Counting: Send + Sync {
    fn count(&self) -> u64;
}

/// A distribution: observation count plus a quantile snapshot.
pub trait Sampling: Counting {
    fn snapshot(&self) -> QuantileSnapshot;
}

/// A handle to a live source metric, tagged by its category.
#[derive(Clone)]
pub enum MetricHandle {
    /// Flat numeric metric from the tagged model.
    Simple(Arc<dyn Measurable>),
    Counter(Arc<dyn Counting>),
    Gauge(Arc<dyn Measurable>),
    Histogram(Arc<dyn Sampling>),
    Meter(Arc<dyn Counting>),
    Timer(Arc<dyn Sampling>),
}

impl MetricHandle {
    pub fn category(&self) -> &'static str {
        match self {
            MetricHandle::Simple(_) => "simple",
            MetricHandle::Counter(_) => "counter",
            MetricHandle::Gauge(_) => "gauge",
            MetricHandle::Histogram(_) => "histogram",
            MetricHandle::Meter(_) => "meter",
            MetricHandle::Timer(_) => "timer",
        }
    }

    /// Wrap a closure as a flat numeric metric.
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn() -> MetricValue + Send + Sync + 'static,
    {
        MetricHandle::Simple(Arc::new(f))
    }

    /// Wrap a closure as a typed gauge.
    pub fn gauge<F>(f: F) -> Self
    where
        F: Fn() -> MetricValue + Send + Sync + 'static,
    {
        MetricHandle::Gauge(Arc::new(f))
    }
}

impl fmt::Debug for MetricHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetricHandle").field(&self.category()).finish()
    }
}
