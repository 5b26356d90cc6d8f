//! Validation engine error types.
//!
//! Individual rule failures are never errors here - they become findings
//! on the row. The error channel carries cross-cutting failures only:
//! bad indices, dead workers, and deadlines.

use std::time::Duration;

use thiserror::Error;

use gridline_model::GridError;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// Validate-all ran past its deadline. No new batch is admitted past
    /// it; in-flight results are discarded.
    #[error("validation timed out after {elapsed:?} (limit {limit:?})")]
    Timeout { elapsed: Duration, limit: Duration },

    /// A validation worker task died (panic or runtime shutdown).
    #[error("validation worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, ValidateError>;
