//! Error types for the observer server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//!
//! Status mapping follows the engine's taxonomy: invalid parameters are
//! the client's to fix (400), stepping an uninitialized engine is a state
//! conflict (409), and dimension mismatches are internal faults (500,
//! logged) -- the run is never silently continued with corrupted state.

use atelier_core::SimError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Errors that can occur in the observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The engine rejected an operation.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidBody(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ObserverError {
    /// The HTTP status this error maps to.
    fn status(&self) -> StatusCode {
        match self {
            Self::Sim(SimError::InvalidParameter { .. }) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Sim(SimError::NotInitialized) => StatusCode::CONFLICT,
            Self::Sim(SimError::DimensionMismatch { .. } | SimError::UnknownArtist { .. })
            | Self::Serialization(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Internal observer error");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
