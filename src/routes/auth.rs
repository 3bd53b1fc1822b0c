//! Three-legged OAuth flow against Atlassian, plus the auth-status endpoint.
//!
//! Flow outcomes are always redirects: to the dashboard on success, or to
//! the login page with a machine-readable `error` code (and a URL-encoded
//! `message` where the flow produced one). Raw errors never reach the
//! browser.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::error::Error;
use crate::session::Session;
use crate::AppState;

const STATE_COOKIE: &str = "jira_oauth_state";
const STATE_TTL: Duration = Duration::minutes(5);

#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// `GET /auth/redirect` — mint the CSRF state and send the user to the
/// authorization server.
pub async fn redirect(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let oauth_state = Uuid::new_v4().to_string();

    let cookie = Cookie::build((STATE_COOKIE, oauth_state.clone()))
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(STATE_TTL)
        .build();

    let url = state.jira.authorization_url(&oauth_state);
    (jar.add(cookie), Redirect::to(&url))
}

/// `GET /auth/callback` — consume the state cookie, exchange the code, and
/// populate the session.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    // The state cookie is single-use: read and deleted together whatever
    // the outcome, so a replayed callback can never match again.
    let stored_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path("/").build());

    if let Some(code) = params.error {
        let message = params.error_description.unwrap_or_else(|| code.clone());
        tracing::warn!(%code, %message, "authorization server returned an error");
        return (
            jar,
            login_error(&state.config.app_url, &Error::UpstreamOAuth { code, message }),
        );
    }

    let state_matches = matches!(
        (&params.state, &stored_state),
        (Some(received), Some(stored)) if received == stored
    );
    if !state_matches {
        tracing::warn!("OAuth state missing or mismatched");
        return (jar, login_error(&state.config.app_url, &Error::InvalidState));
    }

    let Some(code) = params.code else {
        return (jar, login_error(&state.config.app_url, &Error::MissingCode));
    };

    let session = match complete_login(&state, &code).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth callback failed");
            return (
                state.sessions.destroy(jar),
                login_error(&state.config.app_url, &e),
            );
        }
    };

    match state.sessions.persist(jar.clone(), &session) {
        Ok(jar) => {
            tracing::info!("login completed");
            (
                jar,
                Redirect::to(&format!("{}/dashboard", state.config.app_url)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to seal session");
            (
                state.sessions.destroy(jar),
                login_error(
                    &state.config.app_url,
                    &Error::internal("failed to persist session"),
                ),
            )
        }
    }
}

/// Token exchange and the session-population tail.
///
/// Cloud-id and profile lookups use the token returned by the exchange
/// directly: the session is only sealed by the caller afterwards, so a
/// session re-read here would observe stale state.
async fn complete_login(state: &AppState, code: &str) -> Result<Session, Error> {
    let tokens = state.jira.exchange_code(code).await?;

    let mut session = Session::new();
    session.store_tokens(tokens.access_token.clone(), tokens.refresh_token.clone());

    state
        .jira
        .resolve_cloud_id(&mut session, Some(&tokens.access_token))
        .await?;

    let user = state.jira.current_user(&tokens.access_token).await?;
    session.store_user_details(user.account_id, user.display_name);

    Ok(session)
}

/// `GET /auth/logout` — drop the session and bounce to the login page.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (
        state.sessions.destroy(jar),
        Redirect::to(&format!("{}/login?message=logged_out", state.config.app_url)),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
}

/// `GET /api/auth/user` — authentication status for the UI. Answers 200
/// with `isAuthenticated: false` rather than 401, so the login page can
/// poll it without error handling.
pub async fn user(State(state): State<AppState>, jar: CookieJar) -> Json<AuthStatus> {
    let session = state.sessions.load(&jar).unwrap_or_default();

    if !session.is_authenticated() {
        return Json(AuthStatus {
            is_authenticated: false,
            user: None,
            cloud_id: None,
        });
    }

    // A session can hold tokens but no profile if the callback tail was
    // interrupted; report it as authenticated with no user object.
    let user = session.user_id().map(|id| AuthUser {
        id: id.to_string(),
        name: session.user_name().unwrap_or_default().to_string(),
    });

    Json(AuthStatus {
        is_authenticated: true,
        user,
        cloud_id: session.cloud_id().map(str::to_string),
    })
}

fn login_error(app_url: &str, error: &Error) -> Redirect {
    let url = match error {
        Error::InvalidState | Error::MissingCode => {
            format!("{}/login?error={}", app_url, error.login_code())
        }
        _ => format!(
            "{}/login?error={}&message={}",
            app_url,
            error.login_code(),
            urlencoding::encode(&error.to_string()),
        ),
    };
    Redirect::to(&url)
}
