//! Jira API client with Atlassian three-legged OAuth support.

use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use super::types::{
    Board, BoardConfiguration, BoardsPage, CloudResource, Issue, IssuesPage, JiraUser,
    TokenResponse,
};
use crate::config::AppConfig;
use crate::error::Error;
use crate::session::Session;

const ATLASSIAN_AUTH_BASE: &str = "https://auth.atlassian.com";
const ATLASSIAN_API_BASE: &str = "https://api.atlassian.com";

/// Scopes requested during authorization. `offline_access` yields the
/// refresh token stored alongside the access token.
const OAUTH_SCOPES: [&str; 4] = ["read:jira-user", "read:jira-work", "offline_access", "read:me"];

const BOARDS_PAGE_SIZE: u32 = 100;
const ISSUES_PAGE_SIZE: u32 = 500;

#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base: String,
    api_base: String,
}

impl JiraClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_base: ATLASSIAN_AUTH_BASE.to_string(),
            api_base: ATLASSIAN_API_BASE.to_string(),
        }
    }

    /// Point the client at different base URLs (tests aim this at a mock
    /// server).
    pub fn with_base_urls(
        mut self,
        auth_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.auth_base = auth_base.into();
        self.api_base = api_base.into();
        self
    }

    /// Authorization endpoint URL for one login attempt.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?audience=api.atlassian.com&client_id={}&scope={}&redirect_uri={}&state={}&response_type=code&prompt=consent",
            self.auth_base,
            self.client_id,
            urlencoding::encode(&OAUTH_SCOPES.join(" ")),
            urlencoding::encode(&self.redirect_uri),
            state,
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.auth_base))
            .json(&serde_json::json!({
                "grant_type": "authorization_code",
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "code": code,
                "redirect_uri": self.redirect_uri,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = match response.json::<serde_json::Value>().await {
                Ok(body) => body["error_description"]
                    .as_str()
                    .or_else(|| body["error"].as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {status}")),
                Err(_) => format!("HTTP {status}"),
            };
            return Err(Error::TokenExchangeFailed { detail });
        }

        Ok(response.json().await?)
    }

    /// Resolve the tenant cloud id, caching it in the session.
    ///
    /// Without an explicit token the cached session value wins and no
    /// network call is made. An explicit token (fresh from the token
    /// exchange) always fetches fresh. The first accessible resource is
    /// selected deterministically.
    pub async fn resolve_cloud_id(
        &self,
        session: &mut Session,
        explicit_token: Option<&str>,
    ) -> Result<String, Error> {
        if explicit_token.is_none() {
            if let Some(cached) = session.cloud_id() {
                return Ok(cached.to_string());
            }
        }

        let token = match explicit_token {
            Some(token) => token.to_string(),
            None => session
                .access_token()
                .ok_or(Error::NotAuthenticated)?
                .to_string(),
        };

        let resources = self.accessible_resources(&token).await?;
        let first = resources
            .into_iter()
            .next()
            .ok_or_else(|| Error::internal("no accessible Jira resources for this user"))?;

        session.store_cloud_id(first.id.clone());
        Ok(first.id)
    }

    pub async fn accessible_resources(&self, token: &str) -> Result<Vec<CloudResource>, Error> {
        let url = format!("{}/oauth/token/accessible-resources", self.api_base);
        self.get(&url, token, "accessible resources").await
    }

    pub async fn current_user(&self, token: &str) -> Result<JiraUser, Error> {
        let url = format!("{}/me", self.api_base);
        self.get(&url, token, "user profile").await
    }

    pub async fn boards(&self, token: &str, cloud_id: &str) -> Result<Vec<Board>, Error> {
        let url = format!(
            "{}/ex/jira/{}/rest/agile/1.0/board?maxResults={}",
            self.api_base, cloud_id, BOARDS_PAGE_SIZE
        );
        let page: BoardsPage = self.get(&url, token, "boards").await?;
        Ok(page.values)
    }

    pub async fn board_configuration(
        &self,
        token: &str,
        cloud_id: &str,
        board_id: u64,
    ) -> Result<BoardConfiguration, Error> {
        let url = format!(
            "{}/ex/jira/{}/rest/agile/1.0/board/{}/configuration",
            self.api_base, cloud_id, board_id
        );
        self.get(&url, token, "board configuration").await
    }

    pub async fn board_issues(
        &self,
        token: &str,
        cloud_id: &str,
        board_id: u64,
    ) -> Result<Vec<Issue>, Error> {
        let url = format!(
            "{}/ex/jira/{}/rest/agile/1.0/board/{}/issue?maxResults={}",
            self.api_base, cloud_id, board_id, ISSUES_PAGE_SIZE
        );
        let page: IssuesPage = self.get(&url, token, "board issues").await?;
        Ok(page.issues)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        resource: &'static str,
    ) -> Result<T, Error> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ResourceFetchFailed {
                resource,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
