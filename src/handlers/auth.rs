//! Login, logout and session restoration.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::session::{cookies, Session};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub nip: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login
///
/// On success the response sets both session cookies and tells the client
/// where to land, based on the role the core API reported.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = state.sessions.login(&body.nip, &body.password).await?;
    let minted = cookies::build(&session.token, &session.profile, &state.config.cookies)
        .map_err(|e| ApiError::internal_server_error(format!("could not encode session: {}", e)))?;

    let mut response = ApiResponse::ok(json!({
        "user": session.profile,
        "redirect": session.profile.role.home_path(),
    }))
    .into_response();
    cookies::append(response.headers_mut(), &minted);
    Ok(response)
}

/// POST /api/auth/logout
///
/// Idempotent: expires the cookies whether or not a session existed, so a
/// half-dead browser state always converges on signed-out.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let nip = cookies::read(&jar)
        .and_then(|raw| cookies::parse_profile(&raw.user_raw))
        .map(|profile| profile.nip);
    state.sessions.logout(nip.as_deref());

    let mut response = ApiResponse::ok(json!({ "redirect": "/login" })).into_response();
    cookies::append(response.headers_mut(), &cookies::removals());
    response
}

/// GET /api/auth/session
///
/// Re-validates the presented token against the core API and returns a
/// fresh profile. Fails closed with 401 on any upstream trouble; the
/// session middleware expires the cookies on the way out.
pub async fn session(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, ApiError> {
    let refreshed = state.sessions.initialize(&session.token).await?;

    // Re-mint the user cookie so the browser snapshot tracks upstream
    let minted = cookies::build(&refreshed.token, &refreshed.profile, &state.config.cookies)
        .map_err(|e| ApiError::internal_server_error(format!("could not encode session: {}", e)))?;

    let mut response = ApiResponse::ok(json!({ "user": refreshed.profile })).into_response();
    cookies::append(response.headers_mut(), &minted);
    Ok(response)
}
