//! Fan-out aggregation of board configuration and issues into per-column
//! issue counts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use super::client::JiraClient;
use super::types::{Board, BoardConfiguration, BoardWithDetails, ColumnSummary, Issue};
use crate::error::Error;

/// Deadline for the outer board-list call.
pub const BOARD_LIST_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for one board's configuration+issues pair.
const BOARD_DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch column summaries for every board, preserving input order.
///
/// Boards are processed concurrently, at most `max_in_flight` at a time
/// (two Jira calls each). A board whose detail fetch fails or times out
/// degrades to an empty column list instead of failing the batch.
pub async fn boards_with_details(
    client: &JiraClient,
    token: &str,
    cloud_id: &str,
    boards: Vec<Board>,
    max_in_flight: usize,
) -> Vec<BoardWithDetails> {
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));

    let fetches = boards.into_iter().map(|board| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            // The semaphore is never closed, so acquisition cannot fail.
            let _permit = semaphore.acquire().await.ok();
            board_details(client, token, cloud_id, board).await
        }
    });

    join_all(fetches).await
}

async fn board_details(
    client: &JiraClient,
    token: &str,
    cloud_id: &str,
    board: Board,
) -> BoardWithDetails {
    let details = timeout(BOARD_DETAIL_TIMEOUT, async {
        tokio::try_join!(
            client.board_configuration(token, cloud_id, board.id),
            client.board_issues(token, cloud_id, board.id),
        )
    })
    .await
    .map_err(|_| Error::internal("board detail fetch timed out"))
    .and_then(|result| result);

    match details {
        Ok((config, issues)) => {
            let columns = summarize_columns(&config, &issues);
            BoardWithDetails { board, columns }
        }
        Err(e) => {
            tracing::warn!(
                board_id = board.id,
                error = %e,
                "board detail fetch failed, degrading to empty columns"
            );
            BoardWithDetails {
                board,
                columns: Vec::new(),
            }
        }
    }
}

/// Count issues into columns by status-id membership.
///
/// Column status sets are disjoint in Jira board configurations, so an
/// issue lands in at most one column; issues matching no column are
/// counted nowhere.
fn summarize_columns(config: &BoardConfiguration, issues: &[Issue]) -> Vec<ColumnSummary> {
    config
        .column_config
        .columns
        .iter()
        .map(|column| {
            let status_ids: HashSet<&str> =
                column.statuses.iter().map(|s| s.id.as_str()).collect();
            let issue_count = issues
                .iter()
                .filter(|issue| status_ids.contains(issue.status_id()))
                .count();

            ColumnSummary {
                name: column.name.clone(),
                issue_count,
                statuses: column.statuses.iter().map(|s| s.id.clone()).collect(),
            }
        })
        .collect()
}
