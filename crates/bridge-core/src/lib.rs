//! bridge-core: shared model for the metrics bridge.
//!
//! Two source metric systems feed the bridge:
//!
//! - the *tagged* model: flat numeric metrics named by group + name and a
//!   free-form ordered tag map ([`TaggedName`]);
//! - the *scoped* model: typed metrics (counter, gauge, histogram, meter,
//!   timer) named by group + type + name, with labels encoded in a dotted
//!   scope string ([`ScopedName`]).
//!
//! Both are reduced to [`SampleFamily`] values, the payload contract of the
//! exposition layer.

pub mod allowlist;
pub mod config;
pub mod error;
pub mod handle;
pub mod types;

pub use allowlist::Allowlist;
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use handle::*;
pub use types::*;
