//! Query engine error types.

use std::time::Duration;

use thiserror::Error;

use gridline_model::GridError;

#[derive(Debug, Error)]
pub enum QueryError {
    /// An empty search term is a caller error, never "match all".
    #[error("search term must not be empty")]
    EmptyTerm,

    /// The operation ran past its deadline. Previously published state is
    /// left untouched; callers may retry with relaxed constraints.
    #[error("{operation} timed out after {elapsed:?} (limit {limit:?})")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A filter expression that cannot be compiled (construction error,
    /// surfaced before any row is evaluated).
    #[error("invalid filter on column {column}: {reason}")]
    InvalidFilter { column: String, reason: String },

    /// A background query task died (panic or cancellation).
    #[error("background query task failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
