//! HTTP mapping of registry failures.

use crate::catalogue::{ports::ServiceCatalogueError, services::CatalogueServiceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of a registry request.
///
/// Rendered as `{statusCode, error, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The catalogue rejected or failed the operation.
    #[error(transparent)]
    Catalogue(#[from] CatalogueServiceError),

    /// The request body could not be read.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Returns the HTTP status for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Catalogue(CatalogueServiceError::Domain(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Catalogue(err) if err.is_conflict() => StatusCode::CONFLICT,
            Self::Catalogue(
                CatalogueServiceError::NotFound(_)
                | CatalogueServiceError::Repository(ServiceCatalogueError::NotFound(_)),
            ) => StatusCode::NOT_FOUND,
            Self::Catalogue(CatalogueServiceError::Fetch { .. }) => StatusCode::BAD_GATEWAY,
            Self::Catalogue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "registry request failed");
        }
        let body = json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
