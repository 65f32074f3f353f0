//! Data models for the scanning pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::invoice::ParsedFields;

/// Outcome of the OCR step for one file.
///
/// Recognition failures are persisted, not dropped: the record keeps a
/// diagnostic marker in `raw_text` and this status makes failed rows
/// filterable downstream without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrStatus {
    /// Recognition produced text.
    Ok,
    /// Recognition failed; `raw_text` carries the diagnostic marker.
    Failed,
}

impl OcrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrStatus::Ok => "ok",
            OcrStatus::Failed => "failed",
        }
    }
}

/// The unit of persistence: one row per source file.
///
/// `filename` is the unique business key. A second persist attempt for the
/// same filename is a silent no-op, never an error or a duplicate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Basename of the source object key. Unique across the store.
    pub filename: String,

    /// Full OCR output, or the diagnostic marker on OCR failure.
    pub raw_text: String,

    /// Whether OCR succeeded for this file.
    pub ocr_status: OcrStatus,

    /// Extracted date token, unvalidated format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_date: Option<String>,

    /// Extracted free-text supplier name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Normalized decimal total, `.` as separator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sum: Option<String>,

    /// Full object key in the store.
    pub source_path: String,
}

impl InvoiceRecord {
    /// Build a record from one file's OCR output and parsed fields.
    pub fn new(
        filename: impl Into<String>,
        source_path: impl Into<String>,
        raw_text: impl Into<String>,
        ocr_status: OcrStatus,
        fields: ParsedFields,
    ) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
            ocr_status,
            parsed_date: fields.date,
            supplier: fields.supplier,
            total_sum: fields.total,
            source_path: source_path.into(),
        }
    }
}

/// One object discovered by the lister. No filtering happens at the listing
/// layer; the scanner decides what is a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full key in the bucket.
    pub key: String,

    /// Object size in bytes.
    pub size: usize,

    /// Last modification time reported by the store.
    pub last_modified: DateTime<Utc>,
}

/// How a scan pass treats its logging.
///
/// Full and incremental passes run identical dedup logic: every listed
/// object is checked against the store. The mode only changes verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// Startup reconciliation pass over the whole prefix.
    Full,
    /// Scheduled pass.
    Incremental,
}

impl PassMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassMode::Full => "full",
            PassMode::Incremental => "incremental",
        }
    }
}

/// Counters for one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Objects returned by the listing.
    pub listed: usize,

    /// Objects rejected by the extension/directory filter.
    pub filtered: usize,

    /// Candidates skipped because a row already exists.
    pub skipped_existing: usize,

    /// Candidates fetched, recognized, and persisted.
    pub processed: usize,

    /// Candidates that errored; each is retried on a later pass if its
    /// relational insert did not happen.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::ParsedFields;

    #[test]
    fn test_record_from_parsed_fields() {
        let fields = ParsedFields {
            date: Some("01.02.2024".to_string()),
            total: Some("99.90".to_string()),
            supplier: None,
        };
        let record = InvoiceRecord::new(
            "a.jpg",
            "invoices/a.jpg",
            "text",
            OcrStatus::Ok,
            fields,
        );

        assert_eq!(record.filename, "a.jpg");
        assert_eq!(record.parsed_date.as_deref(), Some("01.02.2024"));
        assert_eq!(record.total_sum.as_deref(), Some("99.90"));
        assert_eq!(record.supplier, None);
        assert_eq!(record.ocr_status, OcrStatus::Ok);
    }

    #[test]
    fn test_ocr_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OcrStatus::Failed).unwrap(),
            "\"failed\""
        );
        assert_eq!(OcrStatus::Failed.as_str(), "failed");
    }
}
