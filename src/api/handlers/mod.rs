mod content;
mod features;
mod folders;

pub use content::*;
pub use features::*;
pub use folders::*;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::Error;

pub(crate) type ApiError = (StatusCode, String);

/// Map a library error to a status and body.
///
/// Caller mistakes are returned verbatim. Storage failures are logged in full
/// and the client only sees a generic message.
pub(crate) fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidOperation(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::WriteConflict => StatusCode::CONFLICT,
        Error::Corrupt(_) | Error::Storage(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request rejected: {}", e);
    (status, e.to_string())
}

/// Query parameters for name searches.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in names.
    pub name: String,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
