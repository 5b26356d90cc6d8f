//! Stable multi-key sort.
//!
//! Sorting reorders whatever the user is looking at: the filtered view
//! when a filter is active, the physical rows otherwise. `Vec::sort_by`
//! is stable, so rows with equal keys keep their previous relative
//! order across repeated sorts.

use std::cmp::Ordering;

use gridline_model::{CellValue, GridError, GridState};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One key of a multi-key sort, applied left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
    /// Place missing values after present ones regardless of direction.
    pub missing_last: bool,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
            missing_last: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
            missing_last: false,
        }
    }

    pub fn missing_last(mut self) -> Self {
        self.missing_last = true;
        self
    }
}

pub(crate) fn sort_state(state: &mut GridState, keys: &[SortKey]) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }
    for key in keys {
        if state.column(&key.column).is_none() {
            return Err(GridError::UnknownColumn {
                name: key.column.clone(),
            }
            .into());
        }
    }

    let filtered = state.filtered_indices().map(<[usize]>::to_vec);
    match filtered {
        Some(mut view) => {
            {
                let rows = state.rows();
                view.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], keys));
            }
            state.set_filtered_indices(Some(view))?;
        }
        None => {
            let mut order: Vec<usize> = (0..state.row_count()).collect();
            {
                let rows = state.rows();
                order.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], keys));
            }
            state.apply_row_order(&order)?;
        }
    }
    Ok(())
}

fn compare_rows(a: &gridline_model::Row, b: &gridline_model::Row, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_cells(a.value(&key.column), b.value(&key.column), key);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_cells(a: &CellValue, b: &CellValue, key: &SortKey) -> Ordering {
    // Missing placement is absolute; direction applies to present values.
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if key.missing_last {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            if key.missing_last {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, false) => {
            let ordering = a.compare(b);
            match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}
