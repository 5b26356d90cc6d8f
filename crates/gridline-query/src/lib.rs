//! Query engine for the Gridline tabular engine.
//!
//! Stateless algorithms over a [`gridline_model::GridState`] snapshot:
//!
//! - **Search** - term matching with deterministic strategy selection
//!   (serial scan, worker-partitioned scan, hash index, trigram
//!   substring index, precompiled regex) and a bounded result cache
//!   keyed on `(term, options, state version)`
//! - **Filter** - flat filter sets compiled once into closure
//!   combinators and evaluated across rows in parallel
//! - **Sort** - stable multi-key sort of the rows or the filtered view
//!
//! Results are published back into the grid state; a timeout leaves
//! previously published results untouched.

mod cache;
mod engine;
mod error;
mod index;
mod matcher;
mod predicate;
mod scan;
mod sort;
mod strategy;
mod versioned;

pub use cache::CacheStats;
pub use engine::{QueryConfig, QueryEngine, search_background};
pub use error::{QueryError, Result};
pub use sort::{SortDirection, SortKey};
pub use strategy::{DEFAULT_INDEX_THRESHOLD, DEFAULT_PARALLEL_THRESHOLD, SearchStrategy};
