//! Validation engine for the Gridline tabular engine.
//!
//! Evaluates layered rules over a [`gridline_model::GridState`]
//! snapshot:
//!
//! - **Column rules** - required/type/format checks attached to column
//!   definitions, one finding per cell at most
//! - **Cross-column rules** - relationships between named columns in the
//!   same row (date ordering, field-pair equality, ...)
//! - **Custom rules** - externally supplied business predicates whose
//!   errors become findings instead of aborting the row
//!
//! Results are cached by row-content fingerprint with a bounded expiry,
//! and validate-all work is admitted through a bounded semaphore so bulk
//! validation cannot starve interactive search and filter latency.
//!
//! # Example
//!
//! ```ignore
//! use gridline_validate::{CustomRule, ValidationEngine};
//!
//! let mut engine = ValidationEngine::new();
//! engine.add_custom_rule(CustomRule::new(
//!     "age-plausible",
//!     "Age must be below 200",
//!     |row| Ok(matches!(row.value("Age"), CellValue::Int(n) if *n < 200)),
//! ));
//! let findings = engine.validate_row(&state, 0)?;
//! ```

mod cache;
mod engine;
mod error;
mod fingerprint;
pub mod rules;

pub use cache::CacheStats;
pub use engine::{DEFAULT_CACHE_TTL, ValidationConfig, ValidationEngine, apply_report};
pub use error::{Result, ValidateError};
pub use fingerprint::Fingerprint;
pub use rules::{CrossColumnRule, CustomRule, max_length, numeric_range, one_of, pattern};
