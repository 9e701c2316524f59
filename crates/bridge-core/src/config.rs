//! Bridge configuration: exposition port and metric allowlist.
//!
//! Loaded from the owning system's flat property map, from a TOML file, or
//! built directly. Validation happens at load time so that a bad pattern or
//! port aborts startup instead of surfacing on a scrape.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::allowlist::{ALLOW_ALL, Allowlist};
use crate::error::{BridgeError, BridgeResult};

/// The HTTP port to expose the metrics on.
pub const PORT_CONFIG: &str = "prometheus.metrics.reporter.port";
/// A comma separated list of regex patterns selecting the metrics to collect.
pub const ALLOWLIST_CONFIG: &str = "prometheus.metrics.reporter.allowlist";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub port: u16,
    pub allowlist: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowlist: vec![ALLOW_ALL.to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    reporter: Option<ReporterSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ReporterSection {
    port: Option<u16>,
    allowlist: Option<AllowlistValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AllowlistValue {
    List(Vec<String>),
    Joined(String),
}

impl AllowlistValue {
    fn into_patterns(self) -> Vec<String> {
        match self {
            AllowlistValue::List(list) => list,
            AllowlistValue::Joined(joined) => parse_list(&joined),
        }
    }
}

impl BridgeConfig {
    /// Read the bridge's keys from a flat property map. Unknown keys are
    /// ignored since the map is shared with the owning system.
    pub fn from_props(props: &HashMap<String, String>) -> BridgeResult<Self> {
        let mut config = Self::default();

        if let Some(port) = props.get(PORT_CONFIG) {
            config.port = parse_port(port)?;
        }
        if let Some(allowlist) = props.get(ALLOWLIST_CONFIG) {
            config.allowlist = parse_list(allowlist);
        }

        config.compile_allowlist()?;
        Ok(config)
    }

    /// Load a TOML file with a `[reporter]` section.
    pub fn from_file(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> BridgeResult<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(reporter) = file.reporter {
            if let Some(port) = reporter.port {
                config.port = port;
            }
            if let Some(allowlist) = reporter.allowlist {
                config.allowlist = allowlist.into_patterns();
            }
        }

        config.compile_allowlist()?;
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replace the allowlist with a comma-separated pattern list.
    pub fn with_allowlist(mut self, allowlist: &str) -> Self {
        self.allowlist = parse_list(allowlist);
        self
    }

    pub fn compile_allowlist(&self) -> BridgeResult<Allowlist> {
        Allowlist::new(self.allowlist.as_slice())
    }
}

impl fmt::Display for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BridgeConfig{{allowlist={}, port={}}}",
            self.allowlist.join("|"),
            self.port
        )
    }
}

fn parse_port(value: &str) -> BridgeResult<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| BridgeError::InvalidPort(format!("{value:?}: {e}")))
}

/// Split a comma-separated list, trimming each entry. Blank input is an
/// empty list.
pub fn parse_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(|s| s.trim().to_string()).collect()
}
