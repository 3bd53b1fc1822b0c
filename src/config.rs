//! Service configuration read from the environment and validated before the
//! listener binds.

use thiserror::Error;

/// Minimum length for the session secret; shorter values make the derived
/// AES key trivially guessable.
const MIN_SESSION_SECRET_LEN: usize = 32;

const REQUIRED_VARS: [&str; 5] = [
    "JIRA_CLIENT_ID",
    "JIRA_CLIENT_SECRET",
    "JIRA_REDIRECT_URI",
    "APP_URL",
    "SESSION_SECRET",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    Missing(String),

    #[error("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} characters")]
    SessionSecretTooShort,

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base URL the browser is redirected back to (`/login`, `/dashboard`).
    pub app_url: String,
    pub session_secret: String,
    pub host: String,
    pub port: u16,
    pub secure_cookies: bool,
    /// Maximum number of boards whose detail fetches run at once.
    pub board_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(name).is_none_or(|v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing.join(", ")));
        }

        let require = |name: &str| get(name).unwrap_or_default();

        let session_secret = require("SESSION_SECRET");
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::SessionSecretTooShort);
        }

        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 3000,
        };

        let board_concurrency = match get("BOARD_CONCURRENCY") {
            Some(value) => value.parse::<usize>().ok().filter(|&n| n > 0).ok_or(
                ConfigError::Invalid {
                    name: "BOARD_CONCURRENCY",
                    value,
                },
            )?,
            None => 8,
        };

        let secure_cookies = get("SECURE_COOKIES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            client_id: require("JIRA_CLIENT_ID"),
            client_secret: require("JIRA_CLIENT_SECRET"),
            redirect_uri: require("JIRA_REDIRECT_URI"),
            app_url: require("APP_URL").trim_end_matches('/').to_string(),
            session_secret,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            secure_cookies,
            board_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("JIRA_CLIENT_ID", "client-id"),
            ("JIRA_CLIENT_SECRET", "client-secret"),
            ("JIRA_REDIRECT_URI", "http://localhost:3000/auth/callback"),
            ("APP_URL", "http://localhost:3000/"),
            ("SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
    }

    fn from_vars(vars: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_complete_config() {
        let config = from_vars(&base_vars()).unwrap();
        assert_eq!(config.client_id, "client-id");
        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.board_concurrency, 8);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_missing_variables_reported_together() {
        let mut vars = base_vars();
        vars.remove("JIRA_CLIENT_ID");
        vars.remove("SESSION_SECRET");

        match from_vars(&vars) {
            Err(ConfigError::Missing(list)) => {
                assert!(list.contains("JIRA_CLIENT_ID"));
                assert!(list.contains("SESSION_SECRET"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert("APP_URL", "");

        match from_vars(&vars) {
            Err(ConfigError::Missing(list)) => assert!(list.contains("APP_URL")),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn test_short_session_secret_rejected() {
        let mut vars = base_vars();
        vars.insert("SESSION_SECRET", "too-short");

        assert!(matches!(
            from_vars(&vars),
            Err(ConfigError::SessionSecretTooShort)
        ));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = base_vars();
        vars.insert("PORT", "not-a-port");

        assert!(matches!(
            from_vars(&vars),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("HOST", "0.0.0.0");
        vars.insert("PORT", "8080");
        vars.insert("SECURE_COOKIES", "true");
        vars.insert("BOARD_CONCURRENCY", "2");

        let config = from_vars(&vars).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.secure_cookies);
        assert_eq!(config.board_concurrency, 2);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut vars = base_vars();
        vars.insert("BOARD_CONCURRENCY", "0");

        assert!(matches!(
            from_vars(&vars),
            Err(ConfigError::Invalid {
                name: "BOARD_CONCURRENCY",
                ..
            })
        ));
    }
}
