use crate::api::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// What the client is told when a store call ran out of time.
pub const TIMED_OUT: &str = "Database operation timed out";

/// Everything a catalog operation can fail with.
///
/// Repositories produce these, handlers pass them through unchanged, and
/// `into_response` is the only place they become status codes.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Client input was malformed: bad id, bad body, blank required field.
    #[error("{0}")]
    Validation(String),

    /// The addressed row does not exist. Holds the resource label.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The database could not complete the statement. `context` is what we
    /// tell the client, `detail` is what we log.
    #[error("{context}: {detail}")]
    Storage { context: String, detail: String },
}

impl CatalogError {
    pub fn storage(context: impl Into<String>, detail: impl ToString) -> Self {
        CatalogError::Storage {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Request must include 'Content-Type: application/json'".to_string()
            }
            JsonRejection::JsonSyntaxError(e) => format!("Malformed JSON: {}", e.body_text()),
            JsonRejection::JsonDataError(e) => format!("Invalid request body: {}", e.body_text()),
            other => format!("Failed to read request body: {}", other.body_text()),
        };
        CatalogError::Validation(message)
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            CatalogError::Validation(message) => message,
            CatalogError::NotFound(label) => format!("{} not found", label),
            CatalogError::Storage { context, detail } => {
                tracing::error!("{}: {}", context, detail);
                context
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
