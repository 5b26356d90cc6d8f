//! Grid error types.
//!
//! Errors carry enough context (operation target, offending index or
//! column) to log without re-deriving it at the call site.

use thiserror::Error;

use crate::column::DataType;

#[derive(Debug, Error)]
pub enum GridError {
    /// Schema construction with no columns.
    #[error("schema must declare at least one column")]
    EmptySchema,

    /// Schema construction with an unnamed column.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// Schema construction with a duplicate column name.
    /// Names are compared case-insensitively.
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },

    /// A row payload or query referenced a column the schema does not declare.
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    /// Row index outside the current row range.
    #[error("row index {index} out of range (row count {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// Attempted cell edit on a read-only column.
    #[error("column {column} is read-only")]
    ReadOnlyColumn { column: String },

    /// A value could not be converted to the column's declared type.
    #[error("cannot coerce value '{value}' to {expected} for column {column}")]
    Coercion {
        column: String,
        expected: DataType,
        value: String,
    },

    /// A published filter result referenced a row that does not exist.
    #[error("filtered index {index} out of range (row count {len})")]
    FilteredIndexOutOfRange { index: usize, len: usize },

    /// A row reordering was not a permutation of the current rows.
    #[error("row order must be a permutation of 0..{len}")]
    InvalidRowOrder { len: usize },
}

pub type Result<T> = std::result::Result<T, GridError>;
