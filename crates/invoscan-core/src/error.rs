//! Error types for the invoscan-core library.

use thiserror::Error;

/// Main error type for the invoscan library.
#[derive(Error, Debug)]
pub enum InvoscanError {
    /// Object store error (listing or download).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// OCR service error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Relational store error.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// Spreadsheet mirror error.
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the object store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The listing call could not complete. Fatal for the current scan pass.
    #[error("listing failed: {0}")]
    Unavailable(#[source] object_store::Error),

    /// A single object could not be downloaded. Per-file, never aborts the pass.
    #[error("fetch of '{key}' failed: {source}")]
    Fetch {
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// Local I/O on the temporary copy failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store client could not be constructed.
    #[error("store not configured: {0}")]
    NotConfigured(String),
}

/// Errors related to the external OCR service.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Transport-level failure reaching the OCR endpoint.
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The OCR service answered with a non-success status.
    #[error("OCR service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response decoded but carried no recognized lines.
    #[error("OCR returned no text lines")]
    NoText,
}

/// Errors related to the relational store.
///
/// Lookup failures are a separate variant because the scanner must skip the
/// file for the pass rather than risk a duplicate-processing decision.
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not establish the connection pool.
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// The dedup point lookup failed.
    #[error("dedup lookup failed: {0}")]
    Lookup(#[source] sqlx::Error),

    /// The insert failed.
    #[error("insert failed: {0}")]
    Insert(#[source] sqlx::Error),
}

/// Errors related to the spreadsheet mirror. Always best-effort.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Transport-level failure reaching the spreadsheet endpoint.
    #[error("mirror request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The spreadsheet endpoint answered with a non-success status.
    #[error("mirror service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Result type for the invoscan library.
pub type Result<T> = std::result::Result<T, InvoscanError>;
