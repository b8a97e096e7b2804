//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::gemini::ModelInvocationError;

// Errors

/// Problems with what the user submitted. Always the client's fault.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("No code was provided")]
    EmptyCode,

    #[error("No file was uploaded")]
    MissingFile,

    #[error("Unsupported file {file_name}, expected a .{expected} file")]
    UnsupportedFileType { file_name: String, expected: String },

    #[error("Uploaded file is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("Invalid upload: {0}")]
    Multipart(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        if self.status.is_server_error() {
            tracing::error!("{}", self.error);
        } else {
            tracing::warn!("{}", self.error);
        }

        let error = if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            format!("Something went wrong: {}", self.error)
        } else {
            self.error.to_string()
        };

        (self.status, axum::Json(ErrorResponse { error })).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`. The
/// status code is picked from the underlying error type.
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = if error.is::<SubmissionError>() {
            StatusCode::BAD_REQUEST
        } else if error.is::<ModelInvocationError>() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }
}

// Re-export public types from each route

pub mod review {
    pub use crate::api::routes::review::public::*;
}

pub mod ui {
    pub use crate::api::routes::ui::public::*;
}
