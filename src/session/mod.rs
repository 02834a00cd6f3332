//! Session lifecycle: login, restore-on-load and logout.
//!
//! A session is the pair of cookies plus a cached profile snapshot. The
//! manager owns the refresh flow: it never hands out a session unless the
//! core API confirmed the token, and it fails closed when it cannot tell.

pub mod cache;
pub mod cookies;

use std::sync::Arc;

pub use cache::ProfileCache;
pub use cookies::{SessionCookies, TOKEN_COOKIE, USER_COOKIE};

use crate::error::ApiError;
use crate::upstream::{Profile, UpstreamApi, UpstreamError};

/// An authenticated caller, as carried through request extensions.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

pub struct SessionManager {
    upstream: Arc<dyn UpstreamApi>,
    profiles: Arc<ProfileCache>,
}

impl SessionManager {
    pub fn new(upstream: Arc<dyn UpstreamApi>, profiles: Arc<ProfileCache>) -> Self {
        Self { upstream, profiles }
    }

    /// Exchange credentials for a session. The profile fetch must succeed
    /// before any session exists; a token without an identity is useless
    /// to the route guard.
    pub async fn login(&self, nip: &str, password: &str) -> Result<Session, ApiError> {
        if nip.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation_error("NIP and password are required", None));
        }

        let token = self.upstream.login(nip, password).await.map_err(|err| {
            tracing::info!(nip = %nip, error = %err, "login refused");
            ApiError::from(err)
        })?;

        let ticket = self.profiles.begin();
        let profile = self.upstream.profile(&token).await?;
        self.profiles.store(ticket, profile.clone());

        tracing::info!(nip = %profile.nip, role = %profile.role, "session established");
        Ok(Session { token, profile })
    }

    /// Re-validate a token presented in cookies and return a fresh profile.
    ///
    /// Runs on every dashboard load. Fails closed: any upstream error, not
    /// just a 401, means no session. Concurrent refreshes are resolved by
    /// the cache's sequence guard, so a stale response can never shadow a
    /// newer one.
    pub async fn initialize(&self, token: &str) -> Result<Session, ApiError> {
        let ticket = self.profiles.begin();
        let profile = match self.upstream.profile(token).await {
            Ok(profile) => profile,
            Err(UpstreamError::Unauthorized { message }) => {
                return Err(ApiError::unauthorized(message));
            }
            Err(err) => {
                tracing::warn!(error = %err, "session validation failed; treating as signed out");
                return Err(ApiError::unauthorized("Could not validate your session"));
            }
        };

        if !self.profiles.store(ticket, profile.clone()) {
            if let Some(newer) = self.profiles.get(&profile.nip) {
                return Ok(Session {
                    token: token.to_string(),
                    profile: newer,
                });
            }
        }

        Ok(Session {
            token: token.to_string(),
            profile,
        })
    }

    /// Forget a user locally. Idempotent; there is no upstream logout
    /// endpoint, revocation is purely cookie removal.
    pub fn logout(&self, nip: Option<&str>) {
        if let Some(nip) = nip {
            self.profiles.invalidate(nip);
            tracing::info!(nip = %nip, "session ended");
        }
    }
}
