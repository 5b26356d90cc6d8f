//! Filter expressions.
//!
//! A filter set is a flat list of expressions combined by one global
//! connective, evaluated left to right. There is no grouping syntax.

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// Connective applied uniformly across a filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// Every expression must match.
    #[default]
    And,
    /// Any expression may match.
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    In,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// Operators that compare against a value and therefore take part in
    /// type coercion. `IsNull`/`IsNotNull` bypass coercion entirely.
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not-equals",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts-with",
            FilterOperator::EndsWith => "ends-with",
            FilterOperator::GreaterThan => "greater-than",
            FilterOperator::GreaterThanOrEqual => "greater-than-or-equal",
            FilterOperator::LessThan => "less-than",
            FilterOperator::LessThanOrEqual => "less-than-or-equal",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::IsNull => "is-null",
            FilterOperator::IsNotNull => "is-not-null",
        }
    }
}

/// One expression in a flat filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub column: String,
    pub operator: FilterOperator,
    /// Primary comparison value (`Missing` for the null operators).
    pub value: CellValue,
    /// Upper bound, `Between` only.
    pub upper: Option<CellValue>,
    /// Value set, `In` only.
    pub set: Vec<CellValue>,
}

impl FilterExpression {
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<CellValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
            upper: None,
            set: Vec::new(),
        }
    }

    /// `lower <= value <= upper`.
    pub fn between(
        column: impl Into<String>,
        lower: impl Into<CellValue>,
        upper: impl Into<CellValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::Between,
            value: lower.into(),
            upper: Some(upper.into()),
            set: Vec::new(),
        }
    }

    /// Membership in a value set.
    pub fn any_of(column: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::In,
            value: CellValue::Missing,
            upper: None,
            set: values,
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::IsNull,
            value: CellValue::Missing,
            upper: None,
            set: Vec::new(),
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::IsNotNull,
            value: CellValue::Missing,
            upper: None,
            set: Vec::new(),
        }
    }
}
