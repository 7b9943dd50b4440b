//! Core data models for in-memory tabular datasets.
//!
//! A [`Table`] is an ordered set of named, typed [`Column`]s of equal length.
//! Tables are built once per run (usually by [`crate::ingest`]) and are never
//! mutated by the quality engine.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DqAuditError, Result};

/// Declared element kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// 64-bit signed integers
    Integer,
    /// 64-bit floating point numbers
    Float,
    /// Booleans
    Boolean,
    /// Free text or mixed values (object columns)
    Text,
    /// Timestamps without timezone
    Temporal,
}

impl ColumnKind {
    /// Returns the dtype label reported by the datatype check.
    pub fn dtype_label(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::Text => "object",
            ColumnKind::Temporal => "datetime64[ns]",
        }
    }

    /// Integer and float columns are numeric; booleans are not.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype_label())
    }
}

/// Concrete kind of a single non-missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// Text value
    Text,
    /// Timestamp value
    Temporal,
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Integer value
    Int(i64),
    /// Floating point value; `NaN` counts as missing
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Text value
    Text(String),
    /// Timestamp value
    Temporal(NaiveDateTime),
}

impl Value {
    /// Returns true for `Null` and for floating point `NaN`.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Concrete kind of the value, `None` when missing.
    pub fn kind(&self) -> Option<ValueKind> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
            Value::Temporal(_) => ValueKind::Temporal,
            Value::Null => return None,
        })
    }

    /// Numeric view of an integer or float value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// Text view of a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Hashable identity used for equality-based rules (duplicates, lookups,
    /// key pairing). Integral floats share the key of the equal integer.
    pub fn key(&self) -> ValueKey {
        match self {
            v if v.is_null() => ValueKey::Null,
            Value::Int(i) => ValueKey::Int(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    ValueKey::Int(*f as i64)
                } else {
                    ValueKey::Float(f.to_bits())
                }
            }
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Temporal(t) => ValueKey::Temporal(*t),
            Value::Null => ValueKey::Null,
        }
    }

    /// JSON representation used in issue samples and JSON output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            v if v.is_null() => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Temporal(t) => serde_json::Value::String(format_temporal(t)),
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// String form of a value, as used by rules that work on text
/// representations: `1`, `1.0`, `True`, `2024-01-01 00:00:00`, and `nan`
/// for missing values.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("nan"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
            Value::Temporal(t) => f.write_str(&format_temporal(t)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Temporal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Hashable identity of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    /// Missing values all share one key
    Null,
    /// Integers and integral floats
    Int(i64),
    /// Non-integral floats by bit pattern
    Float(u64),
    /// Booleans
    Bool(bool),
    /// Text
    Text(String),
    /// Timestamps
    Temporal(NaiveDateTime),
}

/// Formats a float the way Python's `repr` does for common values.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn format_temporal(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A named, typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared element kind
    pub kind: ColumnKind,
    /// Cell values in row order
    pub values: Vec<Value>,
}

impl Column {
    /// Creates a column with an explicit kind.
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Creates a column whose kind is inferred from its values.
    ///
    /// All integers → `Integer`; integers and floats → `Float`; all booleans
    /// → `Boolean`; all timestamps → `Temporal`; anything mixed or textual →
    /// `Text`. A column with no non-missing value is `Float`, matching how an
    /// all-empty CSV column is read.
    pub fn infer(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = infer_kind(&values);
        Self::new(name, kind, values)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true for integer and float columns.
    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Iterates over non-missing values.
    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Number of missing values.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of non-missing values.
    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.non_null().map(Value::key).collect::<HashSet<_>>().len()
    }

    /// Non-missing numeric values in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

fn infer_kind(values: &[Value]) -> ColumnKind {
    let mut kinds = values.iter().filter_map(Value::kind).collect::<HashSet<_>>();
    if kinds.is_empty() {
        return ColumnKind::Float;
    }
    if kinds.len() == 2 && kinds.contains(&ValueKind::Int) && kinds.contains(&ValueKind::Float) {
        return ColumnKind::Float;
    }
    if kinds.len() > 1 {
        return ColumnKind::Text;
    }
    match kinds.drain().next() {
        Some(ValueKind::Int) => ColumnKind::Integer,
        Some(ValueKind::Float) => ColumnKind::Float,
        Some(ValueKind::Bool) => ColumnKind::Boolean,
        Some(ValueKind::Temporal) => ColumnKind::Temporal,
        Some(ValueKind::Text) | None => ColumnKind::Text,
    }
}

/// An immutable, column-typed table.
///
/// # Invariants
/// - All columns have the same number of rows
/// - Column names are unique
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Creates a table, validating equal column lengths and unique names.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(DqAuditError::invalid_table(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DqAuditError::invalid_table(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            columns,
            row_count,
        })
    }

    /// Builds a table from row-major data, inferring each column's kind.
    pub fn from_rows(
        name: impl Into<String>,
        headers: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(DqAuditError::invalid_table(format!(
                    "row {} has {} values, expected {}",
                    index,
                    row.len(),
                    headers.len()
                )));
            }
            for (slot, value) in columns.iter_mut().zip(row) {
                slot.push(value);
            }
        }

        let columns = headers
            .iter()
            .zip(columns)
            .map(|(header, values)| Column::infer(*header, values))
            .collect();
        Self::new(name, columns)
    }

    /// Table name (usually the source file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by position.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true when a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_by_name(name).is_some()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Total number of missing cells.
    pub fn missing_value_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Numeric (integer and float) columns.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// Text (object) columns.
    pub fn text_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Text)
    }

    /// Whether row order can be read as a time axis.
    ///
    /// Without a temporal column the positional order is used and is
    /// trivially monotonic. Otherwise the first temporal column must be
    /// non-decreasing over its non-missing values.
    pub fn row_order_is_monotonic(&self) -> bool {
        let Some(axis) = self.columns.iter().find(|c| c.kind == ColumnKind::Temporal) else {
            return true;
        };

        let stamps: Vec<&NaiveDateTime> = axis
            .values
            .iter()
            .filter_map(|v| match v {
                Value::Temporal(t) => Some(t),
                _ => None,
            })
            .collect();
        stamps.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
