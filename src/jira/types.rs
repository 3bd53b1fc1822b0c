//! Typed subset of the Atlassian OAuth and Jira agile API payloads.

use serde::{Deserialize, Serialize};

/// Reply from the authorization-code token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

/// One entry from the accessible-resources endpoint; `id` is the cloud id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudResource {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Consumed subset of the Atlassian user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<BoardLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Paged reply from the board-list endpoint.
#[derive(Debug, Deserialize)]
pub struct BoardsPage {
    #[serde(default)]
    pub values: Vec<Board>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfiguration {
    pub column_config: ColumnConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

/// A board column and the issue statuses mapped into it.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub statuses: Vec<StatusRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRef {
    pub id: String,
}

/// Paged reply from the board-issues endpoint.
#[derive(Debug, Deserialize)]
pub struct IssuesPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub fields: IssueFields,
}

impl Issue {
    pub fn status_id(&self) -> &str {
        &self.fields.status.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    pub status: IssueStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueStatus {
    pub id: String,
}

/// A board enriched with per-column issue counts, as served to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct BoardWithDetails {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    pub issue_count: usize,
    /// Status ids mapped into this column, in configuration order.
    pub statuses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_response_deserialization() {
        let json = json!({
            "access_token": "eyJ...",
            "refresh_token": "refresh123",
            "expires_in": 3600,
            "scope": "read:jira-work read:jira-user",
        });

        let tokens: TokenResponse = serde_json::from_value(json).unwrap();
        assert_eq!(tokens.access_token, "eyJ...");
        assert_eq!(tokens.refresh_token, Some("refresh123".into()));
    }

    #[test]
    fn test_token_response_without_refresh() {
        let json = json!({ "access_token": "eyJ..." });

        let tokens: TokenResponse = serde_json::from_value(json).unwrap();
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.expires_in.is_none());
    }

    #[test]
    fn test_board_page_deserialization() {
        let json = json!({
            "maxResults": 50,
            "startAt": 0,
            "isLast": true,
            "values": [{
                "id": 7,
                "self": "https://example.atlassian.net/rest/agile/1.0/board/7",
                "name": "Platform",
                "type": "kanban",
                "location": {
                    "projectId": 10000,
                    "projectKey": "PLAT",
                    "projectName": "Platform",
                    "displayName": "Platform (PLAT)",
                },
            }],
        });

        let page: BoardsPage = serde_json::from_value(json).unwrap();
        assert_eq!(page.values.len(), 1);
        assert_eq!(page.values[0].id, 7);
        assert_eq!(page.values[0].board_type, "kanban");
        let location = page.values[0].location.as_ref().unwrap();
        assert_eq!(location.project_key.as_deref(), Some("PLAT"));
    }

    #[test]
    fn test_board_without_location() {
        let json = json!({ "id": 1, "name": "Ops", "type": "scrum" });

        let board: Board = serde_json::from_value(json).unwrap();
        assert!(board.location.is_none());
    }

    #[test]
    fn test_board_configuration_deserialization() {
        let json = json!({
            "id": 7,
            "name": "Platform",
            "columnConfig": {
                "constraintType": "issueCount",
                "columns": [
                    {
                        "name": "To Do",
                        "statuses": [{ "id": "1", "self": "..." }, { "id": "2", "self": "..." }],
                    },
                    { "name": "Done", "statuses": [{ "id": "3", "self": "..." }] },
                ],
            },
        });

        let config: BoardConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(config.column_config.columns.len(), 2);
        assert_eq!(config.column_config.columns[0].statuses[1].id, "2");
    }

    #[test]
    fn test_issue_status_id() {
        let json = json!({
            "id": "10001",
            "key": "PLAT-1",
            "fields": {
                "summary": "Fix the bug",
                "status": { "id": "3", "name": "Done" },
            },
        });

        let issue: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(issue.status_id(), "3");
    }

    #[test]
    fn test_board_with_details_serializes_camel_case() {
        let details = BoardWithDetails {
            board: Board {
                id: 7,
                name: "Platform".into(),
                board_type: "kanban".into(),
                location: None,
            },
            columns: vec![ColumnSummary {
                name: "To Do".into(),
                issue_count: 3,
                statuses: vec!["1".into(), "2".into()],
            }],
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "kanban");
        assert_eq!(json["columns"][0]["issueCount"], 3);
        assert_eq!(json["columns"][0]["statuses"][1], "2");
    }
}
