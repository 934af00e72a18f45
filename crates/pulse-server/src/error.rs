//! API error taxonomy and the uniform JSON envelope.
//!
//! Every handler failure converts to `{"ok": false, "error": "..."}` with
//! the mapped status code. Internal store errors are logged here and
//! surfaced without detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use pulse_types::CellIdError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed cellId, bbox, or vibe value.
    #[error("{0}")]
    InvalidInput(String),

    /// Missing, stale, or bad signature; unknown or disabled device. The
    /// reason is deliberately not distinguished.
    #[error("Unauthorized")]
    Unauthorized,

    /// Vibe submission without current presence.
    #[error("Not present")]
    NotPresent,

    #[error("Not Found")]
    NotFound,

    #[error("Internal error")]
    Internal(#[from] pulse_db::DbError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body.
#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotPresent => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CellIdError> for ApiError {
    fn from(e: CellIdError) -> Self {
        match e {
            CellIdError::Empty => ApiError::InvalidInput("Missing cellId".into()),
            CellIdError::Invalid => ApiError::InvalidInput("Invalid cellId".into()),
        }
    }
}

impl From<pulse_auth::Unauthorized> for ApiError {
    fn from(_: pulse_auth::Unauthorized) -> Self {
        ApiError::Unauthorized
    }
}
