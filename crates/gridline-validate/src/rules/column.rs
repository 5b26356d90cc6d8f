//! Column-layer validation and stock rule constructors.

use std::collections::BTreeSet;

use regex::Regex;

use gridline_model::{CellValue, ColumnDefinition, ColumnRule, Row, Severity, ValidationFinding};

/// Run the column layer for one row.
///
/// Per column: required check, then declared-type check, then the
/// attached rules in declaration order. The first failure wins for that
/// column, bounding findings to one per cell.
pub(crate) fn validate_columns(
    columns: &[ColumnDefinition],
    row: &Row,
    row_index: usize,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    for column in columns {
        let value = row.value(column.name());

        if column.is_required() && is_blank(value) {
            findings.push(ValidationFinding::new(
                row_index,
                Some(column.name().to_string()),
                "required",
                format!("{} is required", column.name()),
                Severity::Error,
            ));
            continue;
        }

        if !column.data_type().matches(value) {
            findings.push(ValidationFinding::new(
                row_index,
                Some(column.name().to_string()),
                "type",
                format!("{} must be of type {}", column.name(), column.data_type()),
                Severity::Error,
            ));
            continue;
        }

        for rule in column.rules() {
            if !rule.passes(value) {
                findings.push(ValidationFinding::new(
                    row_index,
                    Some(column.name().to_string()),
                    rule.name(),
                    rule.message(),
                    rule.severity(),
                ));
                break;
            }
        }
    }
    findings
}

/// Missing for the purposes of the required check: an absent value, or
/// text that is empty after trimming.
fn is_blank(value: &CellValue) -> bool {
    match value {
        CellValue::Missing => true,
        CellValue::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Text length cap. Missing values pass; presence is the required
/// check's concern.
pub fn max_length(limit: usize) -> ColumnRule {
    ColumnRule::new(
        "max-length",
        format!("text exceeds {limit} characters"),
        move |value| value.is_missing() || value.display_text().chars().count() <= limit,
    )
}

/// Format rule from a regex pattern. The pattern compiles once, at
/// construction.
pub fn pattern(
    name: impl Into<String>,
    pattern: &str,
    message: impl Into<String>,
) -> Result<ColumnRule, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(ColumnRule::new(name, message, move |value| {
        value.is_missing() || regex.is_match(&value.display_text())
    }))
}

/// Inclusive numeric bounds. Non-numeric present values fail.
pub fn numeric_range(min: f64, max: f64) -> ColumnRule {
    ColumnRule::new(
        "numeric-range",
        format!("value must be between {min} and {max}"),
        move |value| match value {
            CellValue::Int(number) => (*number as f64) >= min && (*number as f64) <= max,
            CellValue::Float(number) => *number >= min && *number <= max,
            CellValue::Missing => true,
            _ => false,
        },
    )
}

/// Membership in a fixed vocabulary, compared case-insensitively.
pub fn one_of(allowed: Vec<String>) -> ColumnRule {
    let allowed: BTreeSet<String> = allowed
        .into_iter()
        .map(|value| value.to_uppercase())
        .collect();
    ColumnRule::new("one-of", "value is not in the allowed set", move |value| {
        value.is_missing() || allowed.contains(&value.display_text().to_uppercase())
    })
}
