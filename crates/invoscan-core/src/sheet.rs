//! Spreadsheet mirror of persisted records.
//!
//! The mirror is a best-effort projection of successful relational commits.
//! Append failures are logged by the scanner and never retried; the
//! relational store stays the source of truth for dedup.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::SheetConfig;
use crate::error::{InvoscanError, MirrorError};
use crate::models::InvoiceRecord;

/// Column order of the mirror sheet.
pub const HEADERS: [&str; 7] = [
    "filename",
    "raw_text",
    "ocr_status",
    "parsed_date",
    "supplier",
    "total_sum",
    "source_path",
];

/// Appends records to a spreadsheet mirror.
#[async_trait]
pub trait RecordMirror: Send + Sync {
    async fn append(&self, record: &InvoiceRecord) -> Result<(), MirrorError>;
}

/// Mirror used when no spreadsheet is configured.
pub struct NoopMirror;

#[async_trait]
impl RecordMirror for NoopMirror {
    async fn append(&self, _record: &InvoiceRecord) -> Result<(), MirrorError> {
        Ok(())
    }
}

/// Google-Sheets-style REST mirror. The header row is written once, the
/// first time the sheet is touched by this process.
pub struct SheetClient {
    client: Client,
    endpoint: String,
    spreadsheet_id: String,
    token: String,
    header_ensured: OnceCell<()>,
}

impl SheetClient {
    pub fn new(config: &SheetConfig) -> Result<Self, InvoscanError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| InvoscanError::Config("SHEET_ID is not set".into()))?;
        let token = config
            .token
            .clone()
            .ok_or_else(|| InvoscanError::Config("SHEET_TOKEN is not set".into()))?;

        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            spreadsheet_id,
            token,
            header_ensured: OnceCell::new(),
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.endpoint, self.spreadsheet_id, range
        )
    }

    /// Write the header row if the sheet is still empty.
    async fn ensure_header(&self) -> Result<(), MirrorError> {
        let response = self
            .client
            .get(self.values_url("A1:G1"))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Status { status, body });
        }

        let range: ValueRange = response.json().await?;
        if range.values.is_empty() {
            info!("Mirror sheet is empty, writing header row");
            self.append_row(HEADERS.iter().map(|h| h.to_string()).collect())
                .await?;
        }
        Ok(())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), MirrorError> {
        let url = format!(
            "{}:append?valueInputOption=RAW",
            self.values_url("A1")
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Status { status, body });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Flatten a record into the mirror's column order.
fn record_row(record: &InvoiceRecord) -> Vec<String> {
    vec![
        record.filename.clone(),
        record.raw_text.clone(),
        record.ocr_status.as_str().to_string(),
        record.parsed_date.clone().unwrap_or_default(),
        record.supplier.clone().unwrap_or_default(),
        record.total_sum.clone().unwrap_or_default(),
        record.source_path.clone(),
    ]
}

#[async_trait]
impl RecordMirror for SheetClient {
    async fn append(&self, record: &InvoiceRecord) -> Result<(), MirrorError> {
        self.header_ensured
            .get_or_try_init(|| async {
                self.ensure_header().await?;
                Ok::<_, MirrorError>(())
            })
            .await?;

        self.append_row(record_row(record)).await?;
        debug!("Mirrored '{}'", record.filename);
        Ok(())
    }
}
