use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::{ImageView, SweepReport};
use crate::domain::{Identity, ImageId};
use crate::presentation::state::AppState;

use super::error::error_response;

#[derive(Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageView>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub image_id: Option<String>,
    pub new_name: Option<String>,
}

#[derive(Serialize)]
pub struct RenameResponse {
    pub message: &'static str,
    pub image: ImageView,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub image_ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SweepReport,
}

pub async fn list_images_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.image_service.list(&identity).await {
        Ok(images) => Json(ImagesResponse {
            images: images.iter().map(ImageView::from).collect(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn rename_image_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<RenameRequest>,
) -> Response {
    let (Some(image_id), Some(new_name)) = (request.image_id, request.new_name) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Image ID and new name are required",
        );
    };
    let Some(id) = parse_image_id(&image_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid image ID");
    };

    match state.image_service.rename(&identity, id, &new_name).await {
        Ok(image) => Json(RenameResponse {
            message: "Name updated successfully",
            image: ImageView::from(&image),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[tracing::instrument(skip(state, identity))]
pub async fn delete_image_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_image_id(&id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid image ID");
    };

    match state.image_service.delete(&identity, id).await {
        Ok(()) => Json(DeleteResponse {
            success: true,
            message: "Image deleted".to_string(),
            deleted_count: None,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn batch_delete_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<BatchDeleteRequest>,
) -> Response {
    let ids: Option<Vec<ImageId>> = request
        .image_ids
        .iter()
        .map(|id| parse_image_id(id))
        .collect();
    let Some(ids) = ids else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid image ID");
    };

    match state.image_service.batch_delete(&identity, &ids).await {
        Ok(count) => Json(DeleteResponse {
            success: true,
            message: format!("{count} image(s) deleted"),
            deleted_count: Some(count),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_all_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.image_service.delete_all(&identity).await {
        Ok(0) => Json(DeleteResponse {
            success: true,
            message: "No images to delete".to_string(),
            deleted_count: Some(0),
        })
        .into_response(),
        Ok(count) => Json(DeleteResponse {
            success: true,
            message: format!("All {count} images deleted"),
            deleted_count: Some(count),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Runs the retention sweep now instead of waiting for the next tick.
pub async fn cleanup_handler(State(state): State<AppState>) -> Response {
    match state.retention_sweeper.sweep_once().await {
        Ok(report) => Json(CleanupResponse {
            success: true,
            report,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_image_id(raw: &str) -> Option<ImageId> {
    Uuid::parse_str(raw.trim()).ok().map(ImageId::from_uuid)
}
