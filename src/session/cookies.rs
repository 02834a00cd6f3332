//! The two session cookies and how they are minted, read and revoked.
//!
//! `token` carries the opaque bearer token for the core API; `user` carries
//! the JSON profile snapshot so pages can render identity without a round
//! trip. Both share the same attributes and always move together.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::CookieJar;
use cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::CookieConfig;
use crate::upstream::Profile;

pub const TOKEN_COOKIE: &str = "token";
pub const USER_COOKIE: &str = "user";

/// Raw cookie pair as presented by the browser. `user_raw` is still
/// percent-encoded JSON at this point; `parse_profile` decodes it.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    pub token: String,
    pub user_raw: String,
}

/// Pull both session cookies out of the jar. Either one missing means no
/// session.
pub fn read(jar: &CookieJar) -> Option<SessionCookies> {
    let token = jar.get(TOKEN_COOKIE)?.value().to_string();
    let user_raw = jar.get(USER_COOKIE)?.value().to_string();
    Some(SessionCookies { token, user_raw })
}

/// Decode the `user` cookie back into a profile. None on any decoding or
/// shape failure; callers treat that as a corrupted session.
pub fn parse_profile(user_raw: &str) -> Option<Profile> {
    let decoded = Cookie::parse_encoded(format!("{USER_COOKIE}={user_raw}")).ok()?;
    serde_json::from_str(decoded.value()).ok()
}

fn attributes(mut cookie: Cookie<'static>, cfg: &CookieConfig) -> Cookie<'static> {
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Strict);
    cookie.set_secure(cfg.secure);
    cookie.set_max_age(Duration::days(cfg.max_age_days));
    cookie
}

/// Mint the cookie pair for a fresh session.
pub fn build(token: &str, profile: &Profile, cfg: &CookieConfig) -> Result<Vec<Cookie<'static>>, serde_json::Error> {
    let user_json = serde_json::to_string(profile)?;
    Ok(vec![
        attributes(Cookie::new(TOKEN_COOKIE, token.to_string()), cfg),
        attributes(Cookie::new(USER_COOKIE, user_json), cfg),
    ])
}

/// Expired replacements that tell the browser to drop both cookies.
pub fn removals() -> Vec<Cookie<'static>> {
    [TOKEN_COOKIE, USER_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = Cookie::new(name, "");
            cookie.set_path("/");
            cookie.set_max_age(Duration::ZERO);
            cookie
        })
        .collect()
}

/// Append Set-Cookie headers, percent-encoding values so the JSON profile
/// survives the cookie grammar.
pub fn append(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie.encoded().to_string()) {
            headers.append(SET_COOKIE, value);
        }
    }
}
