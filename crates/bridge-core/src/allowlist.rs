//! Allowlist: decides which normalized metric names are exported.
//!
//! The configured patterns are OR-joined into a single regex and matched
//! against the whole name. Labels are never consulted.

use regex::Regex;

use crate::error::{BridgeError, BridgeResult};

/// Pattern matching everything; the default allowlist.
pub const ALLOW_ALL: &str = ".*";

/// Compiled full-match filter over normalized metric names.
#[derive(Debug, Clone)]
pub struct Allowlist {
    joined: String,
    pattern: Regex,
}

impl Allowlist {
    /// Compile a list of patterns into one alternation.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> BridgeResult<Self> {
        let joined = patterns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = anchored(&joined).map_err(|source| BridgeError::InvalidAllowlist {
            pattern: joined.clone(),
            source,
        })?;
        Ok(Self { joined, pattern })
    }

    /// Allowlist that accepts every name.
    pub fn allow_all() -> Self {
        Self {
            joined: ALLOW_ALL.to_string(),
            pattern: anchored(ALLOW_ALL).expect("ALLOW_ALL is a valid pattern"),
        }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// The joined, unanchored pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.joined
    }
}

/// Anchor the whole alternation so matching is full-string, not search.
fn anchored(joined: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{joined})$"))
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::allow_all()
    }
}
