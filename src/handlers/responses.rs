use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// The only failures the API surfaces. Everything a dependency can do
/// wrong is absorbed upstream by a stage fallback.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingInput(String),
    #[error("{0} is not configured")]
    MissingCredential(&'static str),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingInput(_) => "missing_input",
            ApiError::MissingCredential(_) => "missing_credential",
            ApiError::Unexpected(_) => "unexpected_failure",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCredential(_) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            ApiError::MissingInput(_) => "Invalid request",
            ApiError::MissingCredential(_) => "Server configuration error",
            ApiError::Unexpected(_) => "Analysis failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingInput(details) => warn!("Rejected request: {details}"),
            ApiError::MissingCredential(name) => error!("Missing credential: {name}"),
            ApiError::Unexpected(err) => error!("Unexpected failure: {err:#}"),
        }
        let body = json!({
            "error": self.headline(),
            "details": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}
