use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A provider that could not be configured at startup.
///
/// Recorded once when the state is built and reported on every request that
/// needs the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SetupError(pub String);

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Setup(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Frontend file not found.")]
    FrontendMissing,
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let status = match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Setup(_) => {
                tracing::error!("Setup error: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream(_) => {
                tracing::error!("Upstream error: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::FrontendMissing => {
                tracing::error!("{}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            detail,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
