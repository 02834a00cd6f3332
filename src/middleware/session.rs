//! Session extraction for the JSON API surface.
//!
//! `require_session` authenticates the request from its cookies and stores
//! a [`Session`] in request extensions for handlers to pull out. Any 401
//! leaving this layer also expires the session cookies, so a dead token is
//! removed from the browser the first time it is seen.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::session::{cookies, Session};
use crate::types::Role;

/// Authenticate from cookies or answer 401. The profile in the session is
/// the cookie snapshot; handlers that need fresh numbers re-fetch through
/// the session manager.
pub async fn require_session(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let session = match authenticate(&jar) {
        Ok(session) => session,
        Err(err) => return clearing(err.into_response()),
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    // A 401 from any handler means the upstream rejected the token;
    // expire the cookies so the browser stops presenting it.
    if response.status() == StatusCode::UNAUTHORIZED {
        return clearing(response);
    }
    response
}

fn authenticate(jar: &CookieJar) -> Result<Session, ApiError> {
    let raw = cookies::read(jar)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let profile = cookies::parse_profile(&raw.user_raw)
        .ok_or_else(|| ApiError::unauthorized("Session cookies are unreadable"))?;
    Ok(Session {
        token: raw.token,
        profile,
    })
}

fn clearing(mut response: Response) -> Response {
    cookies::append(response.headers_mut(), &cookies::removals());
    response
}

/// Restrict a route subtree to branch managers
pub async fn require_bm(request: Request, next: Next) -> Response {
    require_role(Role::Bm, request, next).await
}

/// Restrict a route subtree to marketing staff
pub async fn require_marketing(request: Request, next: Next) -> Response {
    require_role(Role::Marketing, request, next).await
}

async fn require_role(role: Role, request: Request, next: Next) -> Response {
    match request.extensions().get::<Session>() {
        Some(session) if session.profile.role == role => next.run(request).await,
        Some(session) => {
            tracing::debug!(
                required = %role,
                actual = %session.profile.role,
                "role check refused request"
            );
            ApiError::forbidden("You do not have access to this resource").into_response()
        }
        // require_session must run first
        None => ApiError::unauthorized("Authentication required").into_response(),
    }
}
