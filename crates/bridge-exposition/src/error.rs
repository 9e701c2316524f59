//! Exposition error types.

use thiserror::Error;

pub type ExpositionResult<T> = Result<T, ExpositionError>;

#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("collection failed: {0}")]
    Collect(#[from] bridge_core::BridgeError),
}
