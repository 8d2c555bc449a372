use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Identity, ImageId};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeParams {
    pub image_id: Option<String>,
}

/// Streams analysis progress as server-sent events until the terminal
/// `completed` or `error` event.
#[tracing::instrument(skip(state, identity, params))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<AnalyzeParams>,
) -> Response {
    let Some(raw_id) = params.image_id.filter(|id| !id.trim().is_empty()) else {
        return bad_request("Image ID required");
    };
    let Ok(uuid) = Uuid::parse_str(raw_id.trim()) else {
        return bad_request("Invalid image ID");
    };

    let mut events = state
        .analysis_service
        .start(&identity, ImageId::from_uuid(uuid));

    let stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            yield Event::default().json_data(&event);
        }
    };

    Sse::new(stream).into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "status": "error", "message": message })),
    )
        .into_response()
}
