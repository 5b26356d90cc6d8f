//! The grid aggregate.
//!
//! `GridState` owns the ordered rows, the immutable column schema, the
//! selection map, and the derived query results. All structural mutation
//! goes through it under a single-writer discipline; every structural or
//! value mutation bumps the monotonic `version`, which the query and
//! validation caches key on.
//!
//! # Design Notes
//!
//! - **Derived results are version-free.** Publishing `filtered_indices`
//!   or `search_result` does not bump the version - they were computed
//!   against the current version and bumping would invalidate them.
//! - **Structural mutation clears derived results.** After an insert,
//!   delete, import, or physical reorder, previously published indices
//!   would dangle; the selection map is remapped instead of discarded.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};

use crate::column::ColumnDefinition;
use crate::error::{GridError, Result};
use crate::finding::ValidationFinding;
use crate::row::Row;
use crate::search::SearchResult;
use crate::value::CellValue;

/// How `update_row` treats columns absent from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Overlay the payload onto the existing row.
    #[default]
    Merge,
    /// Reset unspecified columns to their type defaults.
    Replace,
}

#[derive(Clone)]
pub struct GridState {
    columns: Vec<ColumnDefinition>,
    rows: Vec<Row>,
    /// Selection state per row index. Only explicit entries are stored;
    /// absent means unselected.
    selection: BTreeMap<usize, bool>,
    /// `None` = no filter active (all rows visible); `Some([])` = filter
    /// active, nothing matches.
    filtered_indices: Option<Vec<usize>>,
    search_result: Option<SearchResult>,
    minimum_rows: usize,
    version: u64,
    last_modified: DateTime<Utc>,
}

impl GridState {
    /// Create a grid from a column schema, padded with default-valued
    /// rows to `minimum_rows`.
    ///
    /// Fails on an empty schema, an empty column name, or duplicate
    /// column names (compared case-insensitively).
    pub fn new(columns: Vec<ColumnDefinition>, minimum_rows: usize) -> Result<Self> {
        if columns.is_empty() {
            return Err(GridError::EmptySchema);
        }
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.name().is_empty() {
                return Err(GridError::EmptyColumnName);
            }
            if !seen.insert(column.name().to_ascii_lowercase()) {
                return Err(GridError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
        }

        let rows = (0..minimum_rows)
            .map(|_| Row::with_defaults(&columns))
            .collect();
        Ok(Self {
            columns,
            rows,
            selection: BTreeMap::new(),
            filtered_indices: None,
            search_result: None,
            minimum_rows,
            version: 0,
            last_modified: Utc::now(),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnDefinition::name).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn minimum_rows(&self) -> usize {
        self.minimum_rows
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Rows visible after the last filter: `filtered_indices` length if a
    /// filter is active, else the full row count. O(1).
    #[inline]
    pub fn visible_row_count(&self) -> usize {
        self.filtered_indices
            .as_ref()
            .map_or(self.rows.len(), Vec::len)
    }

    /// Indices of the visible rows, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        match &self.filtered_indices {
            Some(indices) => indices.clone(),
            None => (0..self.rows.len()).collect(),
        }
    }

    pub fn filtered_indices(&self) -> Option<&[usize]> {
        self.filtered_indices.as_deref()
    }

    pub fn search_result(&self) -> Option<&SearchResult> {
        self.search_result.as_ref()
    }

    // ========================================================================
    // Row mutation (version-bumping)
    // ========================================================================

    /// Insert a row built from `values` at `at` (append when `None`).
    ///
    /// Unknown column names are rejected and values are coerced to the
    /// declared column types before anything is modified. Returns the
    /// index the row landed at.
    pub fn add_row(
        &mut self,
        values: BTreeMap<String, CellValue>,
        at: Option<usize>,
    ) -> Result<usize> {
        let index = at.unwrap_or(self.rows.len());
        if index > self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let row = self.build_row(values)?;
        self.rows.insert(index, row);
        self.shift_selection_after_insert(index);
        self.clear_derived();
        self.touch();
        Ok(index)
    }

    /// Update a row from `values`, merging or replacing per `mode`.
    pub fn update_row(
        &mut self,
        index: usize,
        values: BTreeMap<String, CellValue>,
        mode: UpdateMode,
    ) -> Result<()> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let coerced = self.coerce_values(values)?;
        match mode {
            UpdateMode::Replace => {
                let mut row = Row::with_defaults(&self.columns);
                for (name, value) in coerced {
                    row.set_value(name, value);
                }
                self.rows[index] = row;
            }
            UpdateMode::Merge => {
                let row = &mut self.rows[index];
                for (name, value) in coerced {
                    row.set_value(name, value);
                }
            }
        }
        self.touch();
        Ok(())
    }

    /// Single-cell edit path used by the interactive layer.
    ///
    /// Rejects read-only columns; `update_row`/`import_rows` are the
    /// programmatic load paths and may write them.
    pub fn set_value(&mut self, index: usize, column: &str, value: CellValue) -> Result<()> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let definition = self.column(column).ok_or_else(|| GridError::UnknownColumn {
            name: column.to_string(),
        })?;
        if definition.is_read_only() {
            return Err(GridError::ReadOnlyColumn {
                column: column.to_string(),
            });
        }
        let coerced = coerce_one(definition, column, &value)?;
        self.rows[index].set_value(column.to_string(), coerced);
        self.touch();
        Ok(())
    }

    /// Remove a row; subsequent indices shift down by one.
    ///
    /// A single delete may drop the grid below its minimum row count;
    /// callers pad explicitly via [`pad_to_minimum`](Self::pad_to_minimum).
    pub fn delete_row(&mut self, index: usize) -> Result<Row> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let row = self.rows.remove(index);
        self.shift_selection_after_delete(index);
        self.clear_derived();
        self.touch();
        Ok(row)
    }

    /// Append default-valued rows until the minimum row count is met.
    /// Returns the number of rows added; a no-op does not bump the
    /// version.
    pub fn pad_to_minimum(&mut self) -> usize {
        let missing = self.minimum_rows.saturating_sub(self.rows.len());
        if missing == 0 {
            return 0;
        }
        for _ in 0..missing {
            self.rows.push(Row::with_defaults(&self.columns));
        }
        self.clear_derived();
        self.touch();
        missing
    }

    /// Replace the entire row set from boundary row dictionaries.
    ///
    /// All records are validated and coerced before any state changes
    /// (all-or-nothing). Pads to the minimum row count, clears selection
    /// and derived results, and bumps the version once.
    pub fn import_rows(&mut self, records: Vec<BTreeMap<String, CellValue>>) -> Result<usize> {
        let mut rows = Vec::with_capacity(records.len().max(self.minimum_rows));
        for record in records {
            rows.push(self.build_row(record)?);
        }
        while rows.len() < self.minimum_rows {
            rows.push(Row::with_defaults(&self.columns));
        }
        tracing::debug!(rows = rows.len(), version = self.version + 1, "imported rows");
        self.rows = rows;
        self.selection.clear();
        self.clear_derived();
        self.touch();
        Ok(self.rows.len())
    }

    /// Apply a permutation to the physical row order (sort without an
    /// active filter). Selection follows the rows; derived results are
    /// cleared.
    pub fn apply_row_order(&mut self, order: &[usize]) -> Result<()> {
        let len = self.rows.len();
        if order.len() != len {
            return Err(GridError::InvalidRowOrder { len });
        }
        let mut seen = vec![false; len];
        for &index in order {
            if index >= len || seen[index] {
                return Err(GridError::InvalidRowOrder { len });
            }
            seen[index] = true;
        }

        let mut slots: Vec<Option<Row>> = self.rows.drain(..).map(Some).collect();
        self.rows = order
            .iter()
            .map(|&index| slots[index].take().expect("order verified as permutation"))
            .collect();

        // old index -> new position
        let mut new_pos = vec![0usize; len];
        for (pos, &old) in order.iter().enumerate() {
            new_pos[old] = pos;
        }
        self.selection = self
            .selection
            .iter()
            .map(|(&index, &selected)| (new_pos[index], selected))
            .collect();

        self.clear_derived();
        self.touch();
        Ok(())
    }

    // ========================================================================
    // Selection (not a row mutation - no version bump)
    // ========================================================================

    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<()> {
        if index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.selection.insert(index, selected);
        Ok(())
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.get(&index).copied().unwrap_or(false)
    }

    pub fn select_all(&mut self) {
        for index in 0..self.rows.len() {
            self.selection.insert(index, true);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection
            .iter()
            .filter(|&(_, &selected)| selected)
            .map(|(&index, _)| index)
            .collect()
    }

    // ========================================================================
    // Derived results (published by the engines - no version bump)
    // ========================================================================

    /// Publish a filter result. Every index must reference a current row.
    pub fn set_filtered_indices(&mut self, indices: Option<Vec<usize>>) -> Result<()> {
        if let Some(indices) = &indices {
            for &index in indices {
                if index >= self.rows.len() {
                    return Err(GridError::FilteredIndexOutOfRange {
                        index,
                        len: self.rows.len(),
                    });
                }
            }
        }
        self.filtered_indices = indices;
        Ok(())
    }

    pub fn set_search_result(&mut self, result: SearchResult) {
        self.search_result = Some(result);
    }

    pub fn clear_search_result(&mut self) {
        self.search_result = None;
    }

    /// Attach validation findings to a row (deduplicated by the row).
    pub fn set_row_findings(
        &mut self,
        index: usize,
        findings: Vec<ValidationFinding>,
    ) -> Result<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(GridError::RowOutOfRange { index, len })?;
        row.set_findings(findings);
        Ok(())
    }

    /// Reset every row to unvalidated.
    pub fn clear_all_findings(&mut self) {
        for row in &mut self.rows {
            row.clear_findings();
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn touch(&mut self) {
        self.version += 1;
        self.last_modified = Utc::now();
    }

    fn clear_derived(&mut self) {
        self.filtered_indices = None;
        self.search_result = None;
    }

    fn build_row(&self, values: BTreeMap<String, CellValue>) -> Result<Row> {
        let coerced = self.coerce_values(values)?;
        let mut row = Row::with_defaults(&self.columns);
        for (name, value) in coerced {
            row.set_value(name, value);
        }
        Ok(row)
    }

    fn coerce_values(
        &self,
        values: BTreeMap<String, CellValue>,
    ) -> Result<BTreeMap<String, CellValue>> {
        let mut out = BTreeMap::new();
        for (name, value) in values {
            let column = self.column(&name).ok_or_else(|| GridError::UnknownColumn {
                name: name.clone(),
            })?;
            let coerced = coerce_one(column, &name, &value)?;
            out.insert(name, coerced);
        }
        Ok(out)
    }

    fn shift_selection_after_insert(&mut self, at: usize) {
        self.selection = self
            .selection
            .iter()
            .map(|(&index, &selected)| {
                if index >= at {
                    (index + 1, selected)
                } else {
                    (index, selected)
                }
            })
            .collect();
    }

    fn shift_selection_after_delete(&mut self, at: usize) {
        let mut shifted = BTreeMap::new();
        for (&index, &selected) in &self.selection {
            match index.cmp(&at) {
                Ordering::Less => {
                    shifted.insert(index, selected);
                }
                Ordering::Equal => {}
                Ordering::Greater => {
                    shifted.insert(index - 1, selected);
                }
            }
        }
        self.selection = shifted;
    }
}

fn coerce_one(column: &ColumnDefinition, name: &str, value: &CellValue) -> Result<CellValue> {
    column
        .data_type()
        .coerce(value)
        .ok_or_else(|| GridError::Coercion {
            column: name.to_string(),
            expected: column.data_type(),
            value: value.display_text().into_owned(),
        })
}

impl fmt::Debug for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridState")
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("version", &self.version)
            .field("filtered", &self.filtered_indices.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
