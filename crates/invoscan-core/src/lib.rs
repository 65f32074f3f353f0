//! Core library for the invoice OCR scanning pipeline.
//!
//! This crate provides:
//! - Bucket scanning (paginated S3 listing, scoped downloads)
//! - OCR via an external vision API
//! - Invoice field extraction (date, supplier, total)
//! - Exactly-once persistence to PostgreSQL with a spreadsheet mirror
//! - The scheduling loop that ties it all together

pub mod config;
pub mod db;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod scanner;
pub mod sheet;
pub mod store;

pub use config::Config;
pub use error::{InvoscanError, Result};
pub use invoice::{ParsedFields, parse_invoice_text};
pub use models::{InvoiceRecord, ObjectInfo, OcrStatus, PassMode, PassSummary};
pub use scanner::Scanner;
