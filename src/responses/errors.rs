use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::{error, warn};

pub use crate::errors::ResultResp;

/// Convert a ServerError into a JSON error response. Store and internal
/// failures are logged here and reach the client only as an opaque message.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, message) = match err {
        ServerError::NotFound => (404, "not found".to_string()),
        ServerError::BadRequest(msg) => {
            warn!(reason = %msg, "rejected request");
            (400, msg)
        }
        ServerError::Unauthorized(msg) => (401, msg),
        ServerError::DbError(msg) | ServerError::XlsxError(msg) => {
            error!(detail = %msg, "request failed");
            (500, "internal error".to_string())
        }
        ServerError::InternalError => {
            error!("request failed with internal error");
            (500, "internal error".to_string())
        }
    };

    let body = json!({ "error": message }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("internal error")))
}
