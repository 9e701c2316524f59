//! bridge-exposition: serves collected metrics to scrapers.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus text exposition |
//! | GET | `/healthz` | Liveness plus tracked metric counts |

pub mod error;
pub mod prometheus;
pub mod server;

pub use error::{ExpositionError, ExpositionResult};
pub use prometheus::{TEXT_FORMAT, render, render_exporter};
pub use server::{ExpositionServer, ExpositionState, ScrapeStats, ServerStart, build_router};
