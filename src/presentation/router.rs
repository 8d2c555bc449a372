use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    analyze_handler, batch_delete_handler, cleanup_handler, delete_all_handler,
    delete_image_handler, export_csv_handler, export_json_handler, export_zip_handler,
    health_handler, list_images_handler, login_handler, logout_handler, me_handler,
    register_handler, rename_image_handler, upload_handler,
};
use crate::presentation::session::require_session;
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let protected = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route("/api/upload", post(upload_handler))
        .route(
            "/api/images",
            get(list_images_handler).patch(rename_image_handler),
        )
        .route("/api/images/{id}", delete(delete_image_handler))
        .route("/api/images/batch-delete", post(batch_delete_handler))
        .route("/api/images/delete-all", post(delete_all_handler))
        .route("/api/images/cleanup", post(cleanup_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/export/csv", get(export_csv_handler))
        .route("/api/export/json", get(export_json_handler))
        .route("/api/export/zip", get(export_zip_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .merge(protected)
        .layer(DefaultBodyLimit::max(
            state.settings.storage.max_upload_size_bytes,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
