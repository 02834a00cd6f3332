//! Route guard for the navigation surface.
//!
//! The decision logic is a pure function over the request path and the raw
//! session cookies, so every ordering rule is testable without a server.
//! The middleware layer turns decisions into 307 redirects and Set-Cookie
//! removals.

use crate::session::cookies;
use crate::types::Role;

pub const LOGIN_PATH: &str = "/login";

/// Path prefixes and the roles allowed under them, checked in order with
/// first match winning. Paths matching no entry are open to any
/// authenticated user.
pub const ROUTE_PERMISSIONS: &[(&str, &[Role])] = &[
    ("/dashboard/marketing", &[Role::Marketing]),
    ("/dashboard/manager", &[Role::Bm]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through
    Allow,
    /// 307 to `to`, cookies untouched
    Redirect { to: String },
    /// 307 to the login page and expire both session cookies; the stored
    /// session is unusable
    ClearSessionAndRedirect,
}

impl GuardDecision {
    fn redirect(to: impl Into<String>) -> Self {
        GuardDecision::Redirect { to: to.into() }
    }
}

/// Decide what to do with a navigation request.
///
/// Checks run in a fixed order: the root page is public, then missing
/// cookies, then a corrupted `user` cookie, then login-while-authenticated,
/// then the role table. Each rule only runs if every earlier one passed.
pub fn decide(path: &str, token: Option<&str>, user_raw: Option<&str>) -> GuardDecision {
    if path == "/" {
        return GuardDecision::Allow;
    }

    let user_raw = match (token, user_raw) {
        (Some(t), Some(u)) if !t.is_empty() => u,
        _ => {
            if path == LOGIN_PATH {
                return GuardDecision::Allow;
            }
            return GuardDecision::redirect(LOGIN_PATH);
        }
    };

    let profile = match cookies::parse_profile(user_raw) {
        Some(profile) => profile,
        None => {
            tracing::warn!(path, "unreadable user cookie; forcing re-login");
            return GuardDecision::ClearSessionAndRedirect;
        }
    };

    if path == LOGIN_PATH {
        return GuardDecision::redirect(profile.role.home_path());
    }

    for (prefix, allowed) in ROUTE_PERMISSIONS {
        if path.starts_with(prefix) {
            if allowed.contains(&profile.role) {
                return GuardDecision::Allow;
            }
            return GuardDecision::redirect(profile.role.home_path());
        }
    }

    GuardDecision::Allow
}
