//! Crate-wide error taxonomy for the OAuth flow and Jira API calls.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("OAuth state missing or mismatched")]
    InvalidState,

    #[error("authorization code missing from callback")]
    MissingCode,

    #[error("{message}")]
    UpstreamOAuth { code: String, message: String },

    #[error("token exchange failed: {detail}")]
    TokenExchangeFailed { detail: String },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("failed to fetch {resource} (HTTP {status})")]
    ResourceFetchFailed { resource: &'static str, status: u16 },

    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable code carried in the `error` query parameter of
    /// login-page redirects.
    pub fn login_code(&self) -> &'static str {
        match self {
            Self::InvalidState => "invalid_state",
            Self::MissingCode => "missing_code",
            Self::UpstreamOAuth { .. } => "atlassian_error",
            Self::TokenExchangeFailed { .. } => "token_exchange_failed",
            Self::NotAuthenticated => "not_authenticated",
            Self::ResourceFetchFailed { .. } | Self::Internal { .. } => "internal_server_error",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
