//! File ingestion: raw bytes plus a filename become a [`Table`].
//!
//! Supported formats are chosen by extension:
//! - `.csv`: header row, per-column type inference
//! - `.json`: an array of objects
//! - `.jsonl` / `.ndjson`: one object per line
//!
//! Unknown extensions are read as CSV. Spreadsheet and columnar formats
//! are rejected.
//!
//! Type inference mirrors what a dataframe reader produces: integer
//! columns with missing cells become floats, boolean columns with missing
//! cells become object columns, and a column with no values at all is a
//! float column of missing values.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{DqAuditError, Result};
use crate::models::{Column, ColumnKind, Table, Value};

/// Cell contents read as missing in CSV input.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UNSUPPORTED: &[&str] = &["xlsx", "xls", "parquet"];

/// Reads a table from raw bytes, dispatching on the filename extension.
///
/// # Errors
/// Returns [`DqAuditError::Ingestion`] for unsupported formats and for
/// input that cannot be parsed.
pub fn read_table(bytes: &[u8], filename: &str) -> Result<Table> {
    let path = Path::new(filename);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    tracing::debug!("Reading '{}' as {}", filename, if extension.is_empty() { "csv" } else { &extension });

    let table = match extension.as_str() {
        "json" => read_json(bytes, filename, name),
        "jsonl" | "ndjson" => read_json_lines(bytes, filename, name),
        ext if UNSUPPORTED.contains(&ext) => Err(DqAuditError::unreadable(
            filename,
            format!("unsupported format '.{}'", ext),
        )),
        _ => read_csv(bytes, filename, name),
    }?;

    tracing::info!(
        "Loaded '{}': {} rows, {} columns",
        filename,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Reads a table from a file on disk.
pub async fn read_table_file(path: &Path) -> Result<Table> {
    let bytes = tokio::fs::read(path).await.map_err(|e| DqAuditError::Io {
        context: format!("Failed to read {}", path.display()),
        source: e,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    read_table(&bytes, filename)
}

/// Builds a column, widening kinds the way a dataframe does for missing cells.
fn materialize(name: String, values: Vec<Value>) -> Column {
    let column = Column::infer(name, values);
    let has_missing = column.null_count() > 0;

    match column.kind {
        ColumnKind::Integer if has_missing => {
            let values = column
                .values
                .into_iter()
                .map(|v| match v {
                    Value::Int(i) => Value::Float(i as f64),
                    other => other,
                })
                .collect();
            Column::new(column.name, ColumnKind::Float, values)
        }
        ColumnKind::Boolean if has_missing => Column::new(column.name, ColumnKind::Text, column.values),
        _ => column,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Infers one CSV column from its raw cells.
fn csv_column(name: String, cells: Vec<String>) -> Column {
    let present = || cells.iter().filter(|c| !NA_TOKENS.contains(&c.as_str()));

    let values: Vec<Value> = if present().all(|c| c.parse::<i64>().is_ok()) {
        cells
            .iter()
            .map(|c| c.parse::<i64>().map_or(Value::Null, Value::Int))
            .collect()
    } else if present().all(|c| c.parse::<f64>().is_ok()) {
        cells
            .iter()
            .map(|c| {
                if NA_TOKENS.contains(&c.as_str()) {
                    Value::Null
                } else {
                    c.parse::<f64>().map_or(Value::Null, Value::Float)
                }
            })
            .collect()
    } else if present().all(|c| parse_bool(c).is_some()) {
        cells
            .iter()
            .map(|c| parse_bool(c).map_or(Value::Null, Value::Bool))
            .collect()
    } else {
        cells
            .into_iter()
            .map(|c| {
                if NA_TOKENS.contains(&c.as_str()) {
                    Value::Null
                } else {
                    Value::Text(c)
                }
            })
            .collect()
    };

    materialize(name, values)
}

fn read_csv(bytes: &[u8], filename: &str, name: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DqAuditError::ingestion_failed(filename, "read headers", e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(DqAuditError::unreadable(filename, "no header row"));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            DqAuditError::ingestion_failed(filename, format!("read record {}", index + 1), e)
        })?;
        for (slot, value) in cells.iter_mut().zip(record.iter()) {
            slot.push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(header, column)| csv_column(header, column))
        .collect();
    Table::new(name, columns)
}

fn json_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        nested => Value::Text(nested.to_string()),
    }
}

/// Builds a table from JSON records; keys missing from a record are null.
fn table_from_records(
    records: Vec<serde_json::Map<String, serde_json::Value>>,
    name: &str,
) -> Result<Table> {
    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let columns = headers
        .into_iter()
        .map(|header| {
            let values = records
                .iter()
                .map(|record| record.get(&header).map_or(Value::Null, json_value))
                .collect();
            materialize(header, values)
        })
        .collect();
    Table::new(name, columns)
}

fn as_record(
    value: serde_json::Value,
    filename: &str,
    position: usize,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(DqAuditError::unreadable(
            filename,
            format!("record {} is not an object", position + 1),
        )),
    }
}

fn read_json(bytes: &[u8], filename: &str, name: &str) -> Result<Table> {
    let parsed: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| DqAuditError::ingestion_failed(filename, "parse JSON", e))?;

    let serde_json::Value::Array(items) = parsed else {
        return Err(DqAuditError::unreadable(filename, "expected an array of records"));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| as_record(item, filename, i))
        .collect::<Result<Vec<_>>>()?;
    table_from_records(records, name)
}

fn read_json_lines(bytes: &[u8], filename: &str, name: &str) -> Result<Table> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DqAuditError::ingestion_failed(filename, "decode UTF-8", e))?;

    let records = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value = serde_json::from_str(line).map_err(|e| {
                DqAuditError::ingestion_failed(filename, format!("parse line {}", i + 1), e)
            })?;
            as_record(value, filename, i)
        })
        .collect::<Result<Vec<_>>>()?;
    table_from_records(records, name)
}
