//! Core data model: metric identities, values, and exposition samples.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{BridgeError, BridgeResult};

/// Ordered label set. Order is significant and preserved into the output.
pub type Labels = Vec<(String, String)>;

// ── Identities ─────────────────────────────────────────────────

/// Identity of a metric in the tagged (flat numeric) source model.
///
/// Equality and hashing cover `group`, `name` and `tags`. The description
/// is help text only.
#[derive(Debug, Clone)]
pub struct TaggedName {
    pub group: String,
    pub name: String,
    pub description: String,
    pub tags: Labels,
}

impl TaggedName {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl PartialEq for TaggedName {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.name == other.name && self.tags == other.tags
    }
}

impl Eq for TaggedName {}

impl Hash for TaggedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.name.hash(state);
        self.tags.hash(state);
    }
}

impl fmt::Display for TaggedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        for (k, v) in &self.tags {
            write!(f, ",{k}={v}")?;
        }
        Ok(())
    }
}

/// Identity of a metric in the typed source model.
///
/// Labels travel in `scope` as alternating dot-separated key/value tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedName {
    pub group: String,
    pub metric_type: String,
    pub name: String,
    pub scope: Option<String>,
}

impl ScopedName {
    pub fn new(
        group: impl Into<String>,
        metric_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            metric_type: metric_type.into(),
            name: name.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Encode ordered tags into a scope the way the typed source system does.
    ///
    /// Tags with an empty value are dropped; no remaining tags means no scope.
    pub fn with_tags<'a, I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let tokens: Vec<&str> = tags
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .flat_map(|(k, v)| [k, v])
            .collect();
        self.scope = if tokens.is_empty() {
            None
        } else {
            Some(tokens.join("."))
        };
        self
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:type={},name={}", self.group, self.metric_type, self.name)?;
        if let Some(scope) = &self.scope {
            write!(f, ",scope={scope}")?;
        }
        Ok(())
    }
}

// ── Values ─────────────────────────────────────────────────────

/// Current value read from a source metric.
///
/// Source gauges may hold anything (cluster ids, versions, flags); only
/// `Number` is exportable.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Missing,
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! numeric_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for MetricValue {
                fn from(v: $t) -> Self {
                    MetricValue::Number(v as f64)
                }
            }
        )*
    };
}

numeric_value!(f64, f32, i64, i32, u64, u32, usize);

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Flag(v)
    }
}

impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(MetricValue::Missing)
    }
}

/// Point-in-time view of a distribution, answering quantile queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantileSnapshot {
    values: Vec<f64>,
}

impl QuantileSnapshot {
    /// Build a snapshot from unordered observations. NaN observations are dropped.
    pub fn new(mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Estimated value at `quantile` (0.0 ..= 1.0), interpolating between
    /// neighbouring observations. An empty snapshot reports 0.0.
    pub fn value(&self, quantile: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        let quantile = if quantile.is_nan() {
            0.0
        } else {
            quantile.clamp(0.0, 1.0)
        };

        let pos = quantile * (n + 1) as f64;
        if pos < 1.0 {
            return self.values[0];
        }
        if pos >= n as f64 {
            return self.values[n - 1];
        }

        let lower = self.values[pos as usize - 1];
        let upper = self.values[pos as usize];
        lower + (pos - pos.floor()) * (upper - lower)
    }
}

// ── Exposition samples ─────────────────────────────────────────

/// Destination metric type of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Gauge,
    Counter,
    Summary,
}

impl SampleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleKind::Gauge => "gauge",
            SampleKind::Counter => "counter",
            SampleKind::Summary => "summary",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exposed value with its labels. `label_names` and `label_values`
/// correspond positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub label_names: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn new(name: impl Into<String>, labels: &[(String, String)], value: f64) -> Self {
        let (label_names, label_values): (Vec<String>, Vec<String>) =
            labels.iter().cloned().unzip();
        Self {
            name: name.into(),
            label_names,
            label_values,
            value,
        }
    }

    /// Iterate `(name, value)` label pairs in order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.label_names
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

/// A named, typed, non-empty group of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFamily {
    name: String,
    kind: SampleKind,
    help: String,
    samples: Vec<Sample>,
}

impl SampleFamily {
    /// Create a family named after its first sample.
    ///
    /// Fails with [`BridgeError::EmptyFamily`] when `samples` is empty.
    pub fn new(kind: SampleKind, help: impl Into<String>, samples: Vec<Sample>) -> BridgeResult<Self> {
        let name = samples
            .first()
            .map(|s| s.name.clone())
            .ok_or(BridgeError::EmptyFamily)?;
        Ok(Self {
            name,
            kind,
            help: help.into(),
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tagged_name_ignores_description_for_identity() {
        let a = TaggedName::new("group", "name")
            .with_description("first")
            .with_tag("key", "value");
        let b = TaggedName::new("group", "name")
            .with_description("second")
            .with_tag("key", "value");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn tagged_name_tags_are_part_of_identity() {
        let a = TaggedName::new("group", "name").with_tag("client-id", "a");
        let b = TaggedName::new("group", "name").with_tag("client-id", "b");
        assert_ne!(a, b);
    }

    #[test]
    fn scoped_name_from_tags() {
        let name = ScopedName::new("kafka.server", "BrokerTopicMetrics", "MessagesInPerSec")
            .with_tags([("topic", "orders"), ("partition", "0")]);
        assert_eq!(name.scope.as_deref(), Some("topic.orders.partition.0"));
    }

    #[test]
    fn scoped_name_drops_empty_tag_values() {
        let name = ScopedName::new("g", "t", "n").with_tags([("topic", ""), ("k", "v")]);
        assert_eq!(name.scope.as_deref(), Some("k.v"));

        let name = ScopedName::new("g", "t", "n").with_tags([("topic", "")]);
        assert_eq!(name.scope, None);
    }

    #[test]
    fn metric_value_numeric_discrimination() {
        assert_eq!(MetricValue::from(3u64).as_number(), Some(3.0));
        assert_eq!(MetricValue::from(-2i32).as_number(), Some(-2.0));
        assert_eq!(MetricValue::from("cluster-abc").as_number(), None);
        assert_eq!(MetricValue::from(true).as_number(), None);
        assert_eq!(MetricValue::from(None::<f64>), MetricValue::Missing);
    }

    #[test]
    fn snapshot_empty_reports_zero() {
        let snapshot = QuantileSnapshot::new(Vec::new());
        assert_eq!(snapshot.value(0.5), 0.0);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn snapshot_interpolates() {
        let snapshot = QuantileSnapshot::new((1..=10).rev().map(f64::from).collect());
        // pos = 0.5 * 11 = 5.5 → halfway between 5 and 6.
        assert_eq!(snapshot.value(0.5), 5.5);
        // pos < 1 → first value.
        assert_eq!(snapshot.value(0.01), 1.0);
        // pos >= n → last value.
        assert_eq!(snapshot.value(0.999), 10.0);
    }

    #[test]
    fn snapshot_single_value() {
        let snapshot = QuantileSnapshot::new(vec![42.0]);
        for q in [0.5, 0.75, 0.99] {
            assert_eq!(snapshot.value(q), 42.0);
        }
    }

    #[test]
    fn sample_keeps_label_order() {
        let labels = vec![
            ("k2".to_string(), "v2".to_string()),
            ("k1".to_string(), "v1".to_string()),
        ];
        let sample = Sample::new("m", &labels, 1.0);
        assert_eq!(sample.label_names, vec!["k2", "k1"]);
        assert_eq!(sample.label_values, vec!["v2", "v1"]);
        assert_eq!(sample.label("k1"), Some("v1"));
    }

    #[test]
    fn family_rejects_empty() {
        let err = SampleFamily::new(SampleKind::Gauge, "", Vec::new()).unwrap_err();
        assert!(matches!(err, BridgeError::EmptyFamily));
    }

    #[test]
    fn family_named_after_first_sample() {
        let family = SampleFamily::new(
            SampleKind::Summary,
            "help",
            vec![Sample::new("first", &[], 1.0), Sample::new("first", &[], 2.0)],
        )
        .unwrap();
        assert_eq!(family.name(), "first");
        assert_eq!(family.kind(), SampleKind::Summary);
        assert_eq!(family.samples().len(), 2);
    }
}
