use std::io;

use axum::Json;
use axum::extract::{Extension, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::domain::Identity;
use crate::presentation::state::AppState;

use super::error::error_response;

const FILES_FIELD: &str = "files";
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub results: Vec<UploadResult>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum UploadResult {
    #[serde(rename_all = "camelCase")]
    Stored {
        image_id: uuid::Uuid,
        original_name: String,
        message: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        original_name: String,
        error: &'static str,
    },
}

/// Accepts any number of `files` parts; each one is stored independently.
#[tracing::instrument(skip_all)]
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Response {
    let mut results = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                if results.is_empty() {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read multipart: {e}"),
                    );
                }
                break;
            }
        };

        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        tracing::debug!(filename = %original_name, mime_type = %mime_type, "Receiving file");

        let stream = field
            .map_err(|e| io::Error::other(e.to_string()))
            .boxed();

        let result = match state
            .image_service
            .upload(&identity, &original_name, &mime_type, stream)
            .await
        {
            Ok(image) => UploadResult::Stored {
                image_id: image.id.as_uuid(),
                original_name,
                message: "Upload successful",
            },
            Err(e) => {
                tracing::error!(error = %e, filename = %original_name, "Upload failed");
                UploadResult::Failed {
                    original_name,
                    error: "Upload failed",
                }
            }
        };
        results.push(result);
    }

    if results.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No files uploaded");
    }

    Json(UploadResponse {
        message: "Upload completed",
        results,
    })
    .into_response()
}
