use axum::extract::{Extension, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::domain::Identity;
use crate::presentation::state::AppState;

pub async fn export_csv_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.export_service.csv(&identity).await {
        Ok(body) => attachment("text/csv; charset=utf-8", "image-analysis", "csv", body),
        Err(e) => e.into_response(),
    }
}

pub async fn export_json_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.export_service.json(&identity).await {
        Ok(body) => attachment("application/json", "image-analysis", "json", body),
        Err(e) => e.into_response(),
    }
}

pub async fn export_zip_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.export_service.zip(&identity).await {
        Ok(body) => attachment("application/zip", "renamed-images", "zip", body),
        Err(e) => e.into_response(),
    }
}

fn attachment(
    content_type: &'static str,
    stem: &str,
    extension: &str,
    body: impl Into<axum::body::Body>,
) -> Response {
    let millis = chrono::Utc::now().timestamp_millis();
    let disposition = format!("attachment; filename=\"{stem}-{millis}.{extension}\"");
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body.into(),
    )
        .into_response()
}
