//! Consistency checks: datatype uniformity and contact field formats.
//!
//! Contact columns are selected by name (`email`, `phone`, `mobile`) and
//! every value's string form is matched against a fixed pattern. Missing
//! values never match.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Column, ColumnKind, Table, Value, ValueKind};

use super::config::QualityConfig;
use super::models::{CheckError, ContactRow, ContactType, DatatypeRow, RuleResult};
use super::stats::round2;

const EMAIL_PATTERN: &str = r"^[\w\.-]+@[\w\.-]+\.\w+$";
const PHONE_PATTERN: &str = r"^[0-9\-\+\(\) ]{7,15}$";

/// Compiled contact patterns, shared across threads.
///
/// Uses `OnceLock` for thread-safe lazy initialization.
struct ContactPatterns {
    email: Regex,
    phone: Regex,
}

impl ContactPatterns {
    fn get() -> Result<&'static ContactPatterns, CheckError> {
        static PATTERNS: OnceLock<Result<ContactPatterns, regex::Error>> = OnceLock::new();
        PATTERNS
            .get_or_init(Self::compile)
            .as_ref()
            .map_err(|e| CheckError::Pattern(e.clone()))
    }

    fn compile() -> Result<ContactPatterns, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }

    fn for_type(&self, contact_type: ContactType) -> &Regex {
        match contact_type {
            ContactType::Email => &self.email,
            ContactType::Phone => &self.phone,
        }
    }
}

/// Kind of a value as stored in its column.
///
/// Integer values inside a float column are floats once materialized.
fn stored_kind(column: &Column, value: &Value) -> Option<ValueKind> {
    match (column.kind, value.kind()?) {
        (ColumnKind::Float, ValueKind::Int) => Some(ValueKind::Float),
        (_, kind) => Some(kind),
    }
}

/// Checks that each column's non-null values share one concrete kind.
///
/// The first non-null value sets the expected kind. Fully-null columns
/// report 100%.
pub fn check_datatypes(table: &Table, _config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let rows = table
        .columns()
        .iter()
        .map(|column| {
            let kinds: Vec<ValueKind> = column
                .values
                .iter()
                .filter_map(|v| stored_kind(column, v))
                .collect();

            let valid_percent = match kinds.first() {
                Some(expected) => {
                    let matching = kinds.iter().filter(|k| *k == expected).count();
                    round2(matching as f64 / kinds.len() as f64 * 100.0)
                }
                None => 100.0,
            };

            DatatypeRow {
                column: column.name.clone(),
                dtype: column.kind.dtype_label().to_string(),
                valid_percent,
            }
        })
        .collect();

    Ok(RuleResult::Datatype(rows))
}

fn contact_types_for(name: &str) -> Vec<ContactType> {
    let lower = name.to_lowercase();
    let mut types = Vec::new();
    if lower.contains("email") {
        types.push(ContactType::Email);
    }
    if lower.contains("phone") || lower.contains("mobile") {
        types.push(ContactType::Phone);
    }
    types
}

/// Validates email and phone columns against their format patterns.
pub fn check_contacts(table: &Table, config: &QualityConfig) -> Result<RuleResult, CheckError> {
    if !config.contact_validation {
        return Ok(RuleResult::Contact(Vec::new()));
    }

    let patterns = ContactPatterns::get()?;
    let mut rows = Vec::new();

    // Email columns first, then phone columns
    for contact_type in [ContactType::Email, ContactType::Phone] {
        let pattern = patterns.for_type(contact_type);
        for column in table.columns() {
            if !contact_types_for(&column.name).contains(&contact_type) {
                continue;
            }

            let invalid_count = column
                .values
                .iter()
                .filter(|v| v.is_null() || !pattern.is_match(&v.to_string()))
                .count();

            tracing::trace!(
                "Contact column '{}' ({}) has {} invalid values",
                column.name,
                contact_type.as_str(),
                invalid_count
            );

            rows.push(ContactRow {
                column: column.name.clone(),
                contact_type,
                invalid_count,
            });
        }
    }

    Ok(RuleResult::Contact(rows))
}
