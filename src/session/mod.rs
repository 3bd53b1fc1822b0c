//! Encrypted, cookie-backed session state.
//!
//! The session travels entirely in one authenticated-encrypted cookie; the
//! server keeps nothing in memory between requests. A request loads the
//! session once, mutates the in-memory view, and flushes it with a single
//! `persist` at the end — nothing is visible to other requests until the
//! client resends the rewritten cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::crypto::{CryptoError, CryptoService};

pub const SESSION_COOKIE: &str = "boardglance_session";

const SESSION_TTL_DAYS: i64 = 7;

/// The authenticated principal's tokens and profile, as carried in the
/// sealed cookie. Fields fill in incrementally as the OAuth callback
/// progresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cloud_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        self.access_token = Some(access_token);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
    }

    pub fn store_cloud_id(&mut self, cloud_id: String) {
        self.cloud_id = Some(cloud_id);
    }

    pub fn store_user_details(&mut self, user_id: String, user_name: String) {
        self.user_id = Some(user_id);
        self.user_name = Some(user_name);
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn cloud_id(&self) -> Option<&str> {
        self.cloud_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Seals sessions into the cookie jar and reads them back.
#[derive(Clone)]
pub struct SessionStore {
    crypto: CryptoService,
    secure_cookies: bool,
}

impl SessionStore {
    pub fn new(crypto: CryptoService, secure_cookies: bool) -> Self {
        Self {
            crypto,
            secure_cookies,
        }
    }

    /// An absent cookie, a tampered blob, and an unparseable payload all
    /// read as "no session" — never an error the caller has to handle.
    pub fn load(&self, jar: &CookieJar) -> Option<Session> {
        let cookie = jar.get(SESSION_COOKIE)?;

        let plaintext = match self.crypto.decrypt(cookie.value()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to unseal session cookie, treating as logged out");
                return None;
            }
        };

        match serde_json::from_slice(&plaintext) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse session payload, treating as logged out");
                None
            }
        }
    }

    /// Seal the session into its cookie, or delete the cookie when the
    /// session is empty.
    pub fn persist(&self, jar: CookieJar, session: &Session) -> Result<CookieJar, CryptoError> {
        if session.is_empty() {
            return Ok(self.destroy(jar));
        }

        let payload = serde_json::to_vec(session).map_err(|_| CryptoError::Encryption)?;
        let sealed = self.crypto.encrypt(&payload)?;

        let cookie = Cookie::build((SESSION_COOKIE, sealed))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::days(SESSION_TTL_DAYS))
            .build();

        Ok(jar.add(cookie))
    }

    pub fn destroy(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build())
    }
}
