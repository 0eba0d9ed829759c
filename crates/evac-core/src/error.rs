//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a
//! primitive parse can fail inside their loaders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid risk level {0:?}: expected low, moderate, high, or unknown")]
    InvalidRiskLevel(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
