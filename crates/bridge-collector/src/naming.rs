//! Name and label normalization.
//!
//! Metric identities from both source models are flattened into a single
//! scrape-safe name, and scope strings are decoded into ordered labels.

use bridge_core::{BridgeError, BridgeResult, Labels, ScopedName, TaggedName};

/// Lowercase a name component and replace `.` and `-` with `_`.
fn flatten(component: &str) -> String {
    component.replace(['.', '-'], "_").to_lowercase()
}

/// `<prefix>_<group>_<name>` for the tagged model, every component flattened.
pub fn tagged_metric_name(prefix: &str, name: &TaggedName) -> String {
    format!(
        "{}_{}_{}",
        flatten(prefix),
        flatten(&name.group),
        flatten(&name.name)
    )
}

/// `<group>_<type>_<name>` lowercased, for the scoped model.
pub fn scoped_metric_name(name: &ScopedName) -> String {
    format!("{}_{}_{}", name.group, name.metric_type, name.name).to_lowercase()
}

/// Decode a scope of alternating `key.value` tokens into ordered labels.
///
/// A missing scope, or one with an odd number of tokens, yields no labels.
/// Trailing empty tokens are ignored, so `"k1."` is a single token.
/// A key that appears twice is an error.
pub fn labels_from_scope(scope: Option<&str>) -> BridgeResult<Labels> {
    let Some(scope) = scope else {
        return Ok(Vec::new());
    };

    let mut tokens: Vec<&str> = scope.split('.').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    if tokens.len() % 2 != 0 {
        return Ok(Vec::new());
    }

    let mut labels = Labels::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks_exact(2) {
        let (key, value) = (pair[0], pair[1]);
        if labels.iter().any(|(k, _)| k == key) {
            return Err(BridgeError::DuplicateLabel {
                metric: scope.to_string(),
                label: key.to_string(),
            });
        }
        labels.push((key.to_string(), value.to_string()));
    }
    Ok(labels)
}

/// Replace characters illegal in an exposition metric name with `_`.
///
/// Names match `[a-zA-Z_:][a-zA-Z0-9_:]*`; an illegal first character is
/// replaced, not prefixed.
pub fn sanitize_metric_name(name: &str) -> String {
    sanitize(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Replace characters illegal in an exposition label name with `_`.
///
/// Label names match `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn sanitize_label_name(name: &str) -> String {
    sanitize(name, |c| c.is_ascii_alphanumeric() || c == '_')
}

fn sanitize(name: &str, legal: impl Fn(char) -> bool) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if legal(c) && !(i == 0 && c.is_ascii_digit()) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitize every label name, keeping values and order untouched.
///
/// An empty key, or two keys collapsing onto the same sanitized name, is
/// an error.
pub fn sanitize_labels(metric: &str, labels: &[(String, String)]) -> BridgeResult<Labels> {
    let mut sanitized = Labels::with_capacity(labels.len());
    for (key, value) in labels {
        if key.is_empty() {
            return Err(BridgeError::EmptyLabelName {
                metric: metric.to_string(),
            });
        }
        let key = sanitize_label_name(key);
        if sanitized.iter().any(|(k, _)| *k == key) {
            return Err(BridgeError::DuplicateLabel {
                metric: metric.to_string(),
                label: key,
            });
        }
        sanitized.push((key, value.clone()));
    }
    Ok(sanitized)
}
