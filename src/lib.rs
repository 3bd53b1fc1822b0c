// Library entry point for the boardglance service
pub mod config;
pub mod crypto;
pub mod error;
pub mod jira;
pub mod routes;
pub mod session;

use std::sync::Arc;

use config::AppConfig;
use crypto::{CryptoError, CryptoService};
use jira::JiraClient;
use session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub jira: JiraClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, CryptoError> {
        let crypto = CryptoService::from_secret(&config.session_secret)?;
        let sessions = SessionStore::new(crypto, config.secure_cookies);
        let jira = JiraClient::new(&config);

        Ok(Self {
            config: Arc::new(config),
            sessions,
            jira,
        })
    }

    /// Swap the Jira client (tests point it at a mock server).
    pub fn with_jira_client(mut self, jira: JiraClient) -> Self {
        self.jira = jira;
        self
    }
}
