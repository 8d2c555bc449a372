use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::application::services::{AuthError, SignedIn, UserSummary};
use crate::domain::Identity;
use crate::presentation::session::{expired_session_cookie, session_cookie};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct SignedInResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<uuid::Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub shared: bool,
}

#[tracing::instrument(skip_all)]
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Response {
    let result = state
        .auth_service
        .register(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
            request.name.as_deref(),
        )
        .await;

    match result {
        Ok(signed_in) => sign_in(&state, jar, signed_in, StatusCode::CREATED),
        Err(e) => e.into_response(),
    }
}

#[tracing::instrument(skip_all)]
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) else {
        return AuthError::InvalidInput("Password is required".to_string()).into_response();
    };

    match state
        .auth_service
        .login(request.email.as_deref(), password)
        .await
    {
        Ok(signed_in) => sign_in(&state, jar, signed_in, StatusCode::OK),
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            e.into_response()
        }
    }
}

pub async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(expired_session_cookie()),
        Json(serde_json::json!({ "success": true })),
    )
}

pub async fn me_handler(Extension(identity): Extension<Identity>) -> Json<MeResponse> {
    let response = match identity {
        Identity::User { user_id, email } => MeResponse {
            user_id: Some(user_id.as_uuid()),
            email: Some(email),
            shared: false,
        },
        Identity::Shared => MeResponse {
            user_id: None,
            email: None,
            shared: true,
        },
    };
    Json(response)
}

fn sign_in(state: &AppState, jar: CookieJar, signed_in: SignedIn, status: StatusCode) -> Response {
    let token = state.sessions.issue(&signed_in.identity);
    let cookie = session_cookie(token, state.settings.environment.secure_cookies());
    (
        status,
        jar.add(cookie),
        Json(SignedInResponse {
            success: true,
            user: signed_in.user,
        }),
    )
        .into_response()
}
