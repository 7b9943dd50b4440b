//! Machine-readable exports.

use crate::error::{DqAuditError, Result};
use crate::quality::{QualityReport, Violation};

/// Writes violations as UTF-8 CSV with a `column,type,details` header.
///
/// An empty list yields empty output, without a header.
pub fn violations_csv(violations: &[Violation]) -> Result<Vec<u8>> {
    if violations.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for violation in violations {
        writer
            .serialize(violation)
            .map_err(|e| DqAuditError::render_failed("Failed to write violation row", e))?;
    }

    writer.into_inner().map_err(|e| DqAuditError::Io {
        context: "Failed to flush violation CSV".to_string(),
        source: e.into_error(),
    })
}

/// Serializes the full report as pretty-printed JSON.
pub fn report_json(report: &QualityReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| DqAuditError::serialization("Failed to serialize quality report", e))
}

/// Compresses bytes with Zstandard at level 3.
#[cfg(feature = "compression")]
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write;

    let mut encoder = zstd::Encoder::new(Vec::new(), 3).map_err(|e| DqAuditError::Io {
        context: "Failed to create compressor".to_string(),
        source: e,
    })?;

    encoder.write_all(data).map_err(|e| DqAuditError::Io {
        context: "Compression failed".to_string(),
        source: e,
    })?;

    encoder.finish().map_err(|e| DqAuditError::Io {
        context: "Compression finalization failed".to_string(),
        source: e,
    })
}
