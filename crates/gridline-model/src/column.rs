//! Column schema.
//!
//! `ColumnDefinition` is an immutable schema descriptor: declared type,
//! required/read-only flags, layout hints, and an ordered list of
//! validation rules. Construction goes through the builder methods; there
//! is no post-construction mutation path.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::finding::Severity;
use crate::value::CellValue;

/// Declared cell type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }

    /// Default value used when padding rows to the minimum row count.
    pub fn default_value(&self) -> CellValue {
        match self {
            DataType::Text => CellValue::Text(String::new()),
            DataType::Integer => CellValue::Int(0),
            DataType::Float => CellValue::Float(0.0),
            DataType::Boolean => CellValue::Bool(false),
            DataType::Date => CellValue::Missing,
        }
    }

    /// Parse raw text into this type. Empty/whitespace text is `Missing`.
    pub fn parse_text(&self, raw: &str) -> Option<CellValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(CellValue::Missing);
        }
        match self {
            DataType::Text => Some(CellValue::Text(raw.to_string())),
            DataType::Integer => trimmed.parse().ok().map(CellValue::Int),
            DataType::Float => trimmed.parse().ok().map(CellValue::Float),
            DataType::Boolean => parse_bool(trimmed).map(CellValue::Bool),
            DataType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(CellValue::Date),
        }
    }

    /// Convert a value to this type, if a lossless conversion exists.
    ///
    /// `Missing` passes through unchanged for every type; presence is the
    /// validation engine's concern, not coercion's.
    pub fn coerce(&self, value: &CellValue) -> Option<CellValue> {
        if value.is_missing() {
            return Some(CellValue::Missing);
        }
        match (self, value) {
            (DataType::Text, v) => Some(CellValue::Text(v.display_text().into_owned())),
            (DataType::Integer, CellValue::Int(n)) => Some(CellValue::Int(*n)),
            (DataType::Integer, CellValue::Float(f)) if f.fract() == 0.0 => {
                Some(CellValue::Int(*f as i64))
            }
            (DataType::Integer, CellValue::Text(s)) => {
                s.trim().parse().ok().map(CellValue::Int)
            }
            (DataType::Float, CellValue::Float(f)) => Some(CellValue::Float(*f)),
            (DataType::Float, CellValue::Int(n)) => Some(CellValue::Float(*n as f64)),
            (DataType::Float, CellValue::Text(s)) => s.trim().parse().ok().map(CellValue::Float),
            (DataType::Boolean, CellValue::Bool(b)) => Some(CellValue::Bool(*b)),
            (DataType::Boolean, CellValue::Text(s)) => parse_bool(s.trim()).map(CellValue::Bool),
            (DataType::Date, CellValue::Date(d)) => Some(CellValue::Date(*d)),
            (DataType::Date, CellValue::Text(s)) => {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .map(CellValue::Date)
            }
            _ => None,
        }
    }

    /// Whether a present value already has this declared type.
    pub fn matches(&self, value: &CellValue) -> bool {
        match (self, value) {
            (_, CellValue::Missing) => true,
            (DataType::Text, CellValue::Text(_)) => true,
            (DataType::Integer, CellValue::Int(_)) => true,
            (DataType::Float, CellValue::Float(_) | CellValue::Int(_)) => true,
            (DataType::Boolean, CellValue::Bool(_)) => true,
            (DataType::Date, CellValue::Date(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Horizontal alignment hint for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Validator signature for a column rule: `true` means the value passes.
pub type RuleCheck = Arc<dyn Fn(&CellValue) -> bool + Send + Sync>;

/// A single per-column validation rule: `(name, message, severity, check)`.
///
/// Rules attached to a column run in declaration order; the first failing
/// rule wins for that column.
#[derive(Clone)]
pub struct ColumnRule {
    name: String,
    message: String,
    severity: Severity,
    check: RuleCheck,
}

impl ColumnRule {
    /// Error-severity rule.
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&CellValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            severity: Severity::Error,
            check: Arc::new(check),
        }
    }

    /// Warning-severity rule.
    pub fn warning(
        name: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&CellValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(name, message, check)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn passes(&self, value: &CellValue) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Immutable column schema descriptor.
///
/// Names must be unique (case-insensitively) within a grid; uniqueness is
/// enforced at [`GridState::new`](crate::state::GridState::new).
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    name: String,
    data_type: DataType,
    required: bool,
    read_only: bool,
    width: Option<u16>,
    alignment: Alignment,
    rules: Vec<ColumnRule>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: false,
            read_only: false,
            width: None,
            alignment: Alignment::default(),
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Append a validation rule. Rules run in append order.
    pub fn rule(mut self, rule: ColumnRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn width_hint(&self) -> Option<u16> {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }
}
