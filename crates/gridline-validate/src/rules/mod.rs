//! Rule layers.
//!
//! Validation runs three layers per row, in order:
//!
//! 1. **Column** - required/type/format rules attached to the column
//!    definitions, first failing rule wins per column
//! 2. **Cross-column** - relationships between named columns within the
//!    same row, declared at grid/configuration level
//! 3. **Custom** - externally supplied business predicates whose
//!    failures (including errored rules) become findings, never aborts

pub mod column;
pub mod cross;
pub mod custom;

pub use column::{max_length, numeric_range, one_of, pattern};
pub use cross::CrossColumnRule;
pub use custom::CustomRule;
