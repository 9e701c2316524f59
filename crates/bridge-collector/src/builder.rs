//! Sample family builder.

use bridge_core::{BridgeResult, Labels, QuantileSnapshot, Sample, SampleFamily, SampleKind};

use crate::naming::sanitize_metric_name;

/// Quantiles exported for every distribution, in output order.
pub const QUANTILES: [f64; 6] = [0.50, 0.75, 0.95, 0.98, 0.99, 0.999];

/// Label added to each quantile sample.
pub const QUANTILE_LABEL: &str = "quantile";

/// Accumulates samples for one family.
#[derive(Debug)]
pub struct SampleFamilyBuilder {
    kind: SampleKind,
    help: String,
    samples: Vec<Sample>,
}

impl SampleFamilyBuilder {
    pub fn new(kind: SampleKind, help: impl Into<String>) -> Self {
        Self {
            kind,
            help: help.into(),
            samples: Vec::new(),
        }
    }

    pub fn add_sample(mut self, name: &str, value: f64, labels: &[(String, String)]) -> Self {
        self.samples
            .push(Sample::new(sanitize_metric_name(name), labels, value));
        self
    }

    /// Add one sample per entry of [`QUANTILES`], each carrying a
    /// `quantile` label on top of `labels`.
    pub fn add_quantile_samples(
        mut self,
        name: &str,
        snapshot: &QuantileSnapshot,
        labels: &[(String, String)],
    ) -> Self {
        for quantile in QUANTILES {
            let labels = with_quantile(labels, quantile);
            self = self.add_sample(name, snapshot.value(quantile), &labels);
        }
        self
    }

    pub fn build(self) -> BridgeResult<SampleFamily> {
        debug_assert!(!self.samples.is_empty(), "sample family built without samples");
        SampleFamily::new(self.kind, self.help, self.samples)
    }
}

/// Merge `quantile=<q>` into `labels`, replacing an existing quantile label in place.
fn with_quantile(labels: &[(String, String)], quantile: f64) -> Labels {
    let value = quantile.to_string();
    let mut merged = labels.to_vec();
    match merged.iter_mut().find(|(k, _)| k == QUANTILE_LABEL) {
        Some(existing) => existing.1 = value,
        None => merged.push((QUANTILE_LABEL.to_string(), value)),
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::BridgeError;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn single_sample_family() {
        let family = SampleFamilyBuilder::new(SampleKind::Gauge, "a gauge")
            .add_sample("kafka.server_x", 2.0, &labels(&[("k", "v")]))
            .build()
            .unwrap();
        assert_eq!(family.name(), "kafka_server_x");
        assert_eq!(family.help(), "a gauge");
        assert_eq!(family.samples()[0].label("k"), Some("v"));
    }

    #[test]
    fn quantile_samples_follow_count() {
        let snapshot = QuantileSnapshot::new((1..=100).map(f64::from).collect());
        let family = SampleFamilyBuilder::new(SampleKind::Summary, "")
            .add_sample("latency", 100.0, &labels(&[("k1", "v1")]))
            .add_quantile_samples("latency", &snapshot, &labels(&[("k1", "v1")]))
            .build()
            .unwrap();

        let samples = family.samples();
        assert_eq!(samples.len(), 7);
        assert_eq!(samples[0].label(QUANTILE_LABEL), None);

        let quantiles: Vec<&str> = samples[1..]
            .iter()
            .map(|s| s.label(QUANTILE_LABEL).unwrap())
            .collect();
        assert_eq!(quantiles, vec!["0.5", "0.75", "0.95", "0.98", "0.99", "0.999"]);

        for sample in &samples[1..] {
            assert_eq!(sample.label_names, vec!["k1", "quantile"]);
            assert_eq!(sample.name, "latency");
        }
        assert_eq!(samples[1].value, 50.5);
    }

    #[test]
    fn existing_quantile_label_is_replaced() {
        let merged = with_quantile(&labels(&[("quantile", "x"), ("k", "v")]), 0.99);
        assert_eq!(merged, labels(&[("quantile", "0.99"), ("k", "v")]));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn empty_build_is_error() {
        let err = SampleFamilyBuilder::new(SampleKind::Gauge, "").build().unwrap_err();
        assert!(matches!(err, BridgeError::EmptyFamily));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "sample family built without samples")]
    fn empty_build_asserts() {
        let _: Result<_, BridgeError> = SampleFamilyBuilder::new(SampleKind::Gauge, "").build();
    }
}
