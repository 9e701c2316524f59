//! Error types for the metrics bridge.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while configuring the bridge or converting metrics.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid allowlist pattern {pattern:?}: {source}")]
    InvalidAllowlist {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// The tagged model needs a namespace prefix before it can name metrics.
    #[error("metrics namespace has not been set")]
    NamespaceUnset,

    #[error("duplicate label {label:?} on metric {metric}")]
    DuplicateLabel { metric: String, label: String },

    #[error("empty label name on metric {metric}")]
    EmptyLabelName { metric: String },

    #[error("sample family has no samples")]
    EmptyFamily,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
