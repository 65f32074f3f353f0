//! Scan controller: the list → filter → dedup → fetch → OCR → parse →
//! persist loop, and the scheduler that repeats it.
//!
//! One pass runs to completion before the next is considered; all I/O is
//! sequential. A failure on one file never aborts the pass. The dedup
//! lookup runs for every candidate on every pass; full and incremental
//! modes differ only in log verbosity.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::{PgStore, RecordStore};
use crate::error::{InvoscanError, StoreError};
use crate::invoice::parse_invoice_text;
use crate::models::{InvoiceRecord, OcrStatus, PassMode, PassSummary};
use crate::ocr::{TextExtractor, VisionClient};
use crate::sheet::{NoopMirror, RecordMirror, SheetClient};
use crate::store::{ObjectFetcher, ObjectLister, S3Store};

/// Extensions accepted for processing, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Granularity of the idle loop between passes.
const TICK: Duration = Duration::from_secs(1);

/// Orchestrates scan passes over the configured prefix.
pub struct Scanner {
    lister: Arc<dyn ObjectLister>,
    fetcher: Arc<dyn ObjectFetcher>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn RecordStore>,
    mirror: Arc<dyn RecordMirror>,
    prefix: String,
    language: String,
    interval: Duration,
}

impl Scanner {
    /// Wire the scanner from explicit components. Used directly by tests;
    /// production code goes through [`Scanner::from_config`].
    pub fn new(
        lister: Arc<dyn ObjectLister>,
        fetcher: Arc<dyn ObjectFetcher>,
        extractor: Arc<dyn TextExtractor>,
        store: Arc<dyn RecordStore>,
        mirror: Arc<dyn RecordMirror>,
        prefix: impl Into<String>,
        language: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            lister,
            fetcher,
            extractor,
            store,
            mirror,
            prefix: prefix.into(),
            language: language.into(),
            interval,
        }
    }

    /// Construct all live clients from config. Fails fast on missing OCR
    /// credentials or an unreachable database.
    pub async fn from_config(config: &Config) -> Result<Self, InvoscanError> {
        let s3 = Arc::new(S3Store::new(&config.store)?);
        let extractor = Arc::new(VisionClient::new(&config.ocr)?);
        let store = Arc::new(PgStore::connect(&config.postgres).await?);

        let mirror: Arc<dyn RecordMirror> = if config.sheet.is_configured() {
            Arc::new(SheetClient::new(&config.sheet)?)
        } else {
            info!("No spreadsheet configured, mirror disabled");
            Arc::new(NoopMirror)
        };

        Ok(Self::new(
            s3.clone(),
            s3,
            extractor,
            store,
            mirror,
            config.store.prefix.clone(),
            config.ocr.language.clone(),
            Duration::from_secs(config.scan.interval_seconds),
        ))
    }

    /// Run one scan pass. Only a listing failure is fatal for the pass;
    /// everything after that is isolated per file.
    pub async fn run_pass(&self, mode: PassMode) -> Result<PassSummary, StoreError> {
        let objects = self.lister.list(&self.prefix).await?;
        let mut summary = PassSummary {
            listed: objects.len(),
            ..PassSummary::default()
        };

        if objects.is_empty() {
            info!("No objects under '{}'", self.prefix);
            return Ok(summary);
        }
        debug!("Found {} objects under '{}'", objects.len(), self.prefix);

        for object in &objects {
            let key = object.key.as_str();
            if !is_candidate(key) {
                summary.filtered += 1;
                continue;
            }
            let filename = basename(key);

            if mode == PassMode::Full {
                debug!("Checking '{}' against the database", filename);
            }
            match self.store.exists(filename).await {
                Ok(true) => {
                    if mode == PassMode::Full {
                        debug!("Already stored: '{}'", filename);
                    }
                    summary.skipped_existing += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Cannot tell whether this file was processed before;
                    // skip it for this pass rather than risk a duplicate.
                    warn!("Dedup lookup for '{}' failed, skipping: {}", filename, e);
                    summary.failed += 1;
                    continue;
                }
            }

            info!("Processing '{}'", filename);
            match self.process_file(key, filename).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    error!("Processing '{}' failed: {}", filename, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            mode = mode.as_str(),
            listed = summary.listed,
            filtered = summary.filtered,
            skipped_existing = summary.skipped_existing,
            processed = summary.processed,
            failed = summary.failed,
            "Scan pass finished"
        );
        Ok(summary)
    }

    /// Fetch, recognize, parse, and persist one file. The temporary local
    /// copy is released when this returns, whatever the outcome.
    async fn process_file(&self, key: &str, filename: &str) -> Result<(), InvoscanError> {
        let fetched = self.fetcher.fetch(key).await?;
        let image = fetched.read()?;

        let (raw_text, ocr_status) = match self.extractor.extract(&image, &self.language).await {
            Ok(text) => {
                let head: String = text.chars().take(500).collect();
                debug!("Recognized text for '{}': {}", filename, head);
                (text, OcrStatus::Ok)
            }
            Err(e) => {
                // Persist the failure instead of dropping the file, so a
                // broken scan stays visible in the store.
                warn!("OCR failed for '{}': {}", filename, e);
                (format!("[OCR error: {e}]"), OcrStatus::Failed)
            }
        };

        let fields = parse_invoice_text(&raw_text);
        let record = InvoiceRecord::new(filename, key, raw_text, ocr_status, fields);

        if self.store.insert(&record).await? {
            if let Err(e) = self.mirror.append(&record).await {
                // Best-effort only; the relational row is already durable.
                warn!("Mirror append for '{}' failed: {}", filename, e);
            }
            info!("Stored '{}'", filename);
        } else {
            info!("Insert ignored, '{}' already stored", filename);
        }
        Ok(())
    }

    /// Run the mandatory startup full pass, then an incremental pass every
    /// interval, measured pass-start to pass-start. Never returns except on
    /// a fatal startup condition.
    pub async fn run_forever(&self) -> Result<(), StoreError> {
        info!("Initial pass: checking every object in the bucket");
        let started = Instant::now();
        self.run_pass(PassMode::Full).await?;

        info!(
            "Scanner running, interval {} seconds",
            self.interval.as_secs()
        );
        let mut next = started + self.interval;
        loop {
            tokio::time::sleep(TICK).await;
            if Instant::now() < next {
                continue;
            }
            let started = Instant::now();
            if let Err(e) = self.run_pass(PassMode::Incremental).await {
                // Listing failed; retry on the next tick of the schedule.
                warn!("Scan pass skipped: {}", e);
            }
            next = started + self.interval;
        }
    }
}

/// Extension and directory-marker filter. Listing returns everything under
/// the prefix; only image files are candidates.
fn is_candidate(key: &str) -> bool {
    if key.ends_with('/') {
        return false;
    }
    match key.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Basename of the object key: the dedup key for persistence.
fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
