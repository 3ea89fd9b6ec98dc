// errors.rs
use astra::Response;
use thiserror::Error;

use crate::analytics::EngineError;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),
    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

/// Failures of the parcel store (the dataset access port).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("schema: {0}")]
    Schema(String),
    #[error("connection slot unavailable on this thread")]
    ConnectionUnavailable,
}

impl From<EngineError> for ServerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => ServerError::BadRequest(msg),
            EngineError::Address(e) => ServerError::BadRequest(e.to_string()),
            EngineError::Store(e) => ServerError::DbError(e.to_string()),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::DbError(err.to_string())
    }
}
