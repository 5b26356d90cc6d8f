//! Rows.
//!
//! A row is a mapping from column name to value plus a validation slot.
//! The slot implements the per-row validation lifecycle: `None` means the
//! row is unvalidated, `Some(findings)` means validated (empty = valid).
//! Any value mutation resets the slot to unvalidated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDefinition;
use crate::finding::{ValidationFinding, dedup_findings};
use crate::value::CellValue;

static MISSING: CellValue = CellValue::Missing;

/// Validation lifecycle state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Unvalidated,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: BTreeMap<String, CellValue>,
    #[serde(skip)]
    validation: Option<Vec<ValidationFinding>>,
}

impl Row {
    /// Row with every column at its type's default value.
    pub(crate) fn with_defaults(columns: &[ColumnDefinition]) -> Self {
        let values = columns
            .iter()
            .map(|column| (column.name().to_string(), column.data_type().default_value()))
            .collect();
        Self {
            values,
            validation: None,
        }
    }

    /// Value for a column, `Missing` when the column is absent.
    pub fn value(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&MISSING)
    }

    pub fn values(&self) -> &BTreeMap<String, CellValue> {
        &self.values
    }

    pub(crate) fn set_value(&mut self, column: String, value: CellValue) {
        self.values.insert(column, value);
        self.validation = None;
    }

    /// Findings from the last validation; empty while unvalidated.
    pub fn findings(&self) -> &[ValidationFinding] {
        self.validation.as_deref().unwrap_or(&[])
    }

    pub(crate) fn set_findings(&mut self, findings: Vec<ValidationFinding>) {
        self.validation = Some(dedup_findings(findings));
    }

    pub(crate) fn clear_findings(&mut self) {
        self.validation = None;
    }

    pub fn status(&self) -> RowStatus {
        match &self.validation {
            None => RowStatus::Unvalidated,
            Some(findings) if findings.is_empty() => RowStatus::Valid,
            Some(_) => RowStatus::Invalid,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.findings()
            .iter()
            .any(|finding| finding.severity == crate::finding::Severity::Error)
    }
}
