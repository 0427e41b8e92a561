// src/error.rs
use thiserror::Error;

/// Errors the core can surface past a frame boundary.
///
/// Per the error handling policy, only startup failure and clock regression
/// are ever returned to a caller; malformed samples and impossible state
/// combinations are coerced in place and only logged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("landmark detector unavailable at startup")]
    DetectorUnavailable,

    #[error("detector tick failed: {0}")]
    DetectorFailed(String),
}
