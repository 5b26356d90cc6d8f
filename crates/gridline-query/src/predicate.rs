//! Filter compilation.
//!
//! A filter set compiles once into a list of row predicates (closure
//! combinators) joined by the set's connective; the compiled form is
//! then reused across every row of the parallel fan-out. Unknown
//! columns and uncoercible comparison values fail here, before any row
//! is evaluated.

use std::cmp::Ordering;

use rayon::prelude::*;

use gridline_model::{
    CellValue, ColumnDefinition, FilterExpression, FilterOperator, GridError, LogicalOperator, Row,
};

use crate::error::{QueryError, Result};

type RowPredicate = Box<dyn Fn(&Row) -> bool + Send + Sync>;

pub(crate) struct CompiledPredicate {
    predicates: Vec<RowPredicate>,
    connective: LogicalOperator,
}

impl CompiledPredicate {
    pub fn matches(&self, row: &Row) -> bool {
        match self.connective {
            LogicalOperator::And => self.predicates.iter().all(|predicate| predicate(row)),
            LogicalOperator::Or => self.predicates.iter().any(|predicate| predicate(row)),
        }
    }
}

pub(crate) fn compile(
    columns: &[ColumnDefinition],
    filters: &[FilterExpression],
    connective: LogicalOperator,
) -> Result<CompiledPredicate> {
    let predicates = filters
        .iter()
        .map(|filter| compile_one(columns, filter))
        .collect::<Result<Vec<_>>>()?;
    Ok(CompiledPredicate {
        predicates,
        connective,
    })
}

fn compile_one(columns: &[ColumnDefinition], filter: &FilterExpression) -> Result<RowPredicate> {
    let column = columns
        .iter()
        .find(|column| column.name() == filter.column)
        .ok_or_else(|| GridError::UnknownColumn {
            name: filter.column.clone(),
        })?;
    let name = filter.column.clone();

    match filter.operator {
        // The null operators bypass coercion entirely.
        FilterOperator::IsNull => Ok(Box::new(move |row| row.value(&name).is_missing())),
        FilterOperator::IsNotNull => Ok(Box::new(move |row| !row.value(&name).is_missing())),
        FilterOperator::Equals => {
            let target = coerce(column, &filter.value)?;
            Ok(Box::new(move |row| {
                row.value(&name).compare(&target) == Ordering::Equal
            }))
        }
        FilterOperator::NotEquals => {
            let target = coerce(column, &filter.value)?;
            Ok(Box::new(move |row| {
                row.value(&name).compare(&target) != Ordering::Equal
            }))
        }
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            // Text operators compare against the text rendering,
            // case-insensitively.
            let needle = filter.value.display_text().to_lowercase();
            let operator = filter.operator;
            Ok(Box::new(move |row| {
                let haystack = row.value(&name).display_text().to_lowercase();
                match operator {
                    FilterOperator::Contains => haystack.contains(&needle),
                    FilterOperator::StartsWith => haystack.starts_with(&needle),
                    _ => haystack.ends_with(&needle),
                }
            }))
        }
        FilterOperator::GreaterThan
        | FilterOperator::GreaterThanOrEqual
        | FilterOperator::LessThan
        | FilterOperator::LessThanOrEqual => {
            let target = coerce(column, &filter.value)?;
            let operator = filter.operator;
            Ok(Box::new(move |row| {
                let value = row.value(&name);
                if value.is_missing() {
                    return false;
                }
                let ordering = value.compare(&target);
                match operator {
                    FilterOperator::GreaterThan => ordering == Ordering::Greater,
                    FilterOperator::GreaterThanOrEqual => ordering != Ordering::Less,
                    FilterOperator::LessThan => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }
            }))
        }
        FilterOperator::Between => {
            let upper = filter.upper.as_ref().ok_or_else(|| QueryError::InvalidFilter {
                column: filter.column.clone(),
                reason: "between requires an upper bound".to_string(),
            })?;
            let lower = coerce(column, &filter.value)?;
            let upper = coerce(column, upper)?;
            Ok(Box::new(move |row| {
                let value = row.value(&name);
                !value.is_missing()
                    && value.compare(&lower) != Ordering::Less
                    && value.compare(&upper) != Ordering::Greater
            }))
        }
        FilterOperator::In => {
            let targets = filter
                .set
                .iter()
                .map(|value| coerce(column, value))
                .collect::<Result<Vec<_>>>()?;
            Ok(Box::new(move |row| {
                let value = row.value(&name);
                targets
                    .iter()
                    .any(|target| value.compare(target) == Ordering::Equal)
            }))
        }
    }
}

fn coerce(column: &ColumnDefinition, value: &CellValue) -> Result<CellValue> {
    column
        .data_type()
        .coerce(value)
        .ok_or_else(|| {
            QueryError::Grid(GridError::Coercion {
                column: column.name().to_string(),
                expected: column.data_type(),
                value: value.display_text().into_owned(),
            })
        })
}

/// Evaluate the compiled predicate over every row, collecting matching
/// indices in original row order. Fans out across workers at and above
/// the parallel threshold.
pub(crate) fn evaluate(
    rows: &[Row],
    predicate: &CompiledPredicate,
    parallel_threshold: usize,
) -> Vec<usize> {
    if rows.len() >= parallel_threshold.max(1) {
        rows.par_iter()
            .enumerate()
            .filter(|(_, row)| predicate.matches(row))
            .map(|(index, _)| index)
            .collect()
    } else {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| predicate.matches(row))
            .map(|(index, _)| index)
            .collect()
    }
}
