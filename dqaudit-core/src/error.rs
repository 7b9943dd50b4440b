//! Error types for dqaudit operations.
//!
//! Library-level failures (ingestion, configuration, rendering, I/O) surface
//! as [`DqAuditError`]. Failures of an individual rule check never reach this
//! type: they are captured as [`crate::quality::CheckError`] and degraded to
//! an empty result at the aggregation boundary.

use thiserror::Error;

/// Main error type for dqaudit operations.
#[derive(Debug, Error)]
pub enum DqAuditError {
    /// Input bytes could not be turned into a table
    #[error("Ingestion failed for '{filename}': {context}")]
    Ingestion {
        filename: String,
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Table construction violated a structural invariant
    #[error("Invalid table: {message}")]
    InvalidTable { message: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Report rendering failed
    #[error("Report rendering failed: {context}")]
    Render {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `DqAuditError`
pub type Result<T> = std::result::Result<T, DqAuditError>;

impl DqAuditError {
    /// Creates an ingestion error caused by an underlying parser error
    pub fn ingestion_failed<E>(filename: impl Into<String>, context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Ingestion {
            filename: filename.into(),
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an ingestion error without an underlying cause
    pub fn unreadable(filename: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Ingestion {
            filename: filename.into(),
            context: context.into(),
            source: None,
        }
    }

    /// Creates an invalid table error
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a rendering error with context
    pub fn render_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Render {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = DqAuditError::configuration("contamination must be in (0, 0.5]");
        assert!(error.to_string().contains("contamination"));

        let error = DqAuditError::invalid_table("column 'b' has 3 rows, expected 4");
        assert!(error.to_string().starts_with("Invalid table"));
    }

    #[test]
    fn test_ingestion_error_names_file() {
        let error = DqAuditError::unreadable("data.xlsx", "unsupported format");
        let message = error.to_string();
        assert!(message.contains("data.xlsx"));
        assert!(message.contains("unsupported format"));
    }

    #[test]
    fn test_ingestion_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8");
        let error = DqAuditError::ingestion_failed("rows.csv", "read record", io);
        assert!(std::error::Error::source(&error).is_some());
    }
}
