//! Thread-safe instruments implementing the typed metric model.
//!
//! These stand in for the owning system's own metric objects: register an
//! `Arc` of one with a collector and keep updating it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use bridge_core::{Counting, Measurable, MetricValue, QuantileSnapshot, Sampling};

/// Observations kept per distribution.
pub const RESERVOIR_SIZE: usize = 1028;

/// Monotonic-by-convention counter; `dec` saturates at zero.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: u64) {
        let _ = self
            .count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                Some(c.saturating_sub(n))
            });
    }
}

impl Counting for Counter {
    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Gauge holding the last value set, numeric or not.
#[derive(Debug)]
pub struct GaugeCell {
    value: Mutex<MetricValue>,
}

impl GaugeCell {
    pub fn new(value: impl Into<MetricValue>) -> Self {
        Self {
            value: Mutex::new(value.into()),
        }
    }

    pub fn set(&self, value: impl Into<MetricValue>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value.into();
    }
}

impl Default for GaugeCell {
    fn default() -> Self {
        Self::new(MetricValue::Missing)
    }
}

impl Measurable for GaugeCell {
    fn value(&self) -> MetricValue {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Event counter with a mean rate. Only the count is exported.
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    started: Instant,
}

impl Meter {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn mark(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Events per second since creation.
    pub fn mean_rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.count() as f64 / elapsed
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counting for Meter {
    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Distribution over a sliding window of the latest observations.
#[derive(Debug)]
pub struct Histogram {
    count: AtomicU64,
    window: Mutex<VecDeque<f64>>,
    capacity: usize,
}

impl Histogram {
    pub fn new() -> Self {
        Self::with_capacity(RESERVOIR_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            count: AtomicU64::new(0),
            window: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn update(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Counting for Histogram {
    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Sampling for Histogram {
    fn snapshot(&self) -> QuantileSnapshot {
        let window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        QuantileSnapshot::new(window.iter().copied().collect())
    }
}

/// Duration distribution, recorded and reported in milliseconds.
#[derive(Debug, Default)]
pub struct Timer {
    histogram: Histogram,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, elapsed: Duration) {
        self.histogram.update(elapsed.as_nanos() as f64 / 1_000_000.0);
    }

    /// Run `f`, recording how long it took.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.update(start.elapsed());
        out
    }
}

impl Counting for Timer {
    fn count(&self) -> u64 {
        self.histogram.count()
    }
}

impl Sampling for Timer {
    fn snapshot(&self) -> QuantileSnapshot {
        self.histogram.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_inc_dec() {
        let counter = Counter::new();
        counter.inc(10);
        counter.dec(3);
        assert_eq!(counter.count(), 7);
        counter.dec(100);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn gauge_cell_holds_any_value() {
        let gauge = GaugeCell::new(1.5);
        assert_eq!(gauge.value(), MetricValue::Number(1.5));
        gauge.set("cluster-abc");
        assert_eq!(gauge.value().as_number(), None);
        assert_eq!(GaugeCell::default().value(), MetricValue::Missing);
    }

    #[test]
    fn meter_counts_events() {
        let meter = Meter::new();
        meter.mark(1);
        meter.mark(4);
        assert_eq!(meter.count(), 5);
        assert!(meter.mean_rate() >= 0.0);
    }

    #[test]
    fn histogram_window_is_bounded() {
        let histogram = Histogram::with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            histogram.update(v);
        }
        assert_eq!(histogram.count(), 4);
        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.value(0.0), 2.0);
    }

    #[test]
    fn timer_records_milliseconds() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(250));
        assert_eq!(timer.count(), 1);
        assert_eq!(timer.snapshot().value(0.5), 250.0);

        let out = timer.time(|| 42);
        assert_eq!(out, 42);
        assert_eq!(timer.count(), 2);
    }
}
