//! Data model for the Gridline tabular engine.
//!
//! This crate holds the versioned grid aggregate and its value types:
//!
//! - [`GridState`] - rows, columns, selection, derived query results,
//!   and the monotonic version counter
//! - [`CellValue`] / [`DataType`] - the dynamic cell value model with
//!   schema-attached conversions
//! - [`ColumnDefinition`] / [`ColumnRule`] - the immutable column schema
//! - [`ValidationFinding`] / [`ValidationReport`] - validation outcomes
//! - [`FilterExpression`] / [`SearchOptions`] - query parameter values
//! - [`ProgressSink`] - the progress-reporting boundary
//!
//! The query and validation algorithms live in `gridline-query` and
//! `gridline-validate`; this crate is purely the shared state and value
//! vocabulary they operate on.

pub mod column;
pub mod error;
pub mod filter;
pub mod finding;
pub mod progress;
pub mod row;
pub mod search;
pub mod state;
pub mod value;

pub use column::{Alignment, ColumnDefinition, ColumnRule, DataType, RuleCheck};
pub use error::{GridError, Result};
pub use filter::{FilterExpression, FilterOperator, LogicalOperator};
pub use finding::{Severity, ValidationFinding, ValidationReport, dedup_findings};
pub use progress::{ChannelProgress, NullProgress, ProgressSink, ProgressUpdate};
pub use row::{Row, RowStatus};
pub use search::{
    DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_TIMEOUT, SearchMode, SearchOptions, SearchResult,
};
pub use state::{GridState, UpdateMode};
pub use value::CellValue;
