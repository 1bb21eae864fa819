use std::time::Duration;

/// Why a dataset could not be loaded. The current table is never touched when
/// one of these is returned, so the caller can simply retry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("source unreachable: {0}")]
    Unreachable(String),
    #[error("invalid credentials: {0}")]
    BadCredentials(String),
    #[error("worksheet '{0}' not found")]
    MissingWorksheet(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("invalid source locator: {0}")]
    InvalidLocator(String),
    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}
