//! Protected boards endpoint: board list plus per-column issue counts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tokio::time::timeout;

use crate::error::Error;
use crate::jira::boards::{boards_with_details, BOARD_LIST_TIMEOUT};
use crate::jira::types::BoardWithDetails;
use crate::session::Session;
use crate::AppState;

/// `GET /api/jira/boards` — 401 without a token, 200 with the aggregated
/// board list, 500 with structured detail on upstream failure.
pub async fn list(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(mut session) = state
        .sessions
        .load(&jar)
        .filter(Session::is_authenticated)
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    };

    match fetch_boards(&state, &mut session).await {
        Ok(boards) => {
            // Reseal so a freshly resolved cloud id is reused next request.
            match state.sessions.persist(jar, &session) {
                Ok(jar) => (jar, Json(boards)).into_response(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to reseal session after board fetch");
                    Json(boards).into_response()
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to aggregate boards");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to fetch Jira boards",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn fetch_boards(
    state: &AppState,
    session: &mut Session,
) -> Result<Vec<BoardWithDetails>, Error> {
    let token = session
        .access_token()
        .ok_or(Error::NotAuthenticated)?
        .to_string();
    let cloud_id = state.jira.resolve_cloud_id(session, None).await?;

    let boards = timeout(BOARD_LIST_TIMEOUT, state.jira.boards(&token, &cloud_id))
        .await
        .map_err(|_| Error::internal("timed out listing boards"))??;

    Ok(boards_with_details(
        &state.jira,
        &token,
        &cloud_id,
        boards,
        state.config.board_concurrency,
    )
    .await)
}
