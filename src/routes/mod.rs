//! HTTP surface: OAuth flow, auth status, and the boards API.

pub mod auth;
pub mod boards;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/redirect", get(auth::redirect))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/api/auth/user", get(auth::user))
        .route("/api/jira/boards", get(boards::list))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
