use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{AuthError, ExportError, ImageServiceError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn internal_error(error: &dyn std::error::Error) -> Response {
    tracing::error!(error = %error, "Request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

impl IntoResponse for ImageServiceError {
    fn into_response(self) -> Response {
        match self {
            ImageServiceError::InvalidInput(message) => {
                error_response(StatusCode::BAD_REQUEST, message)
            }
            ImageServiceError::NotFound => error_response(
                StatusCode::NOT_FOUND,
                "Image not found or not accessible",
            ),
            ImageServiceError::NotAnalyzed => error_response(
                StatusCode::CONFLICT,
                "Only analysed images can be renamed",
            ),
            other => internal_error(&other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidInput(message) => error_response(StatusCode::BAD_REQUEST, message),
            AuthError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            AuthError::EmailTaken => error_response(
                StatusCode::CONFLICT,
                "This email address is already registered",
            ),
            AuthError::Unsupported => error_response(StatusCode::NOT_FOUND, "Not found"),
            AuthError::NotConfigured => {
                tracing::error!("Shared password login attempted without app_password");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
            }
            other => internal_error(&other),
        }
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        match self {
            ExportError::NothingToExport => error_response(
                StatusCode::NOT_FOUND,
                "No analysed images available for download",
            ),
            other => internal_error(&other),
        }
    }
}
