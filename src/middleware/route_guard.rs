//! Turns [`guard::decide`] into HTTP. Layered over the navigation routes
//! only; the JSON API uses `require_session` instead and answers 401 rather
//! than redirecting.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::guard::{self, GuardDecision};
use crate::session::cookies;

pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let token = jar.get(cookies::TOKEN_COOKIE).map(|c| c.value().to_string());
    let user = jar.get(cookies::USER_COOKIE).map(|c| c.value().to_string());

    match guard::decide(&path, token.as_deref(), user.as_deref()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect { to } => {
            tracing::debug!(%path, %to, "navigation redirected");
            Redirect::temporary(&to).into_response()
        }
        GuardDecision::ClearSessionAndRedirect => {
            let mut response = Redirect::temporary(guard::LOGIN_PATH).into_response();
            cookies::append(response.headers_mut(), &cookies::removals());
            response
        }
    }
}
