//! Metadata service authentication.
//!
//! Credentials are never stored in `pinaudit.toml`. The config names an
//! environment variable (`token-env`, default `PINAUDIT_TOKEN`) whose value is
//! sent as a bearer token, or as the password when `username` is also set:
//!
//! ```toml
//! [source]
//! kind = "http"
//! url = "https://metadata.example.com/api"
//! token-env = "METADATA_TOKEN"
//! ```

use pinaudit_core::config::SourceConfig;
use reqwest::blocking::RequestBuilder;

/// Credentials sent with every metadata request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Anonymous,
    Bearer(String),
    Basic {
        username: String,
        password: Option<String>,
    },
}

impl Credentials {
    /// Build credentials from the source config, reading the secret from the
    /// environment variable it names.
    pub fn from_config(config: &SourceConfig) -> Self {
        let secret = std::env::var(&config.token_env)
            .ok()
            .filter(|s| !s.is_empty());
        Self::from_parts(config.username.clone(), secret)
    }

    pub fn from_parts(username: Option<String>, secret: Option<String>) -> Self {
        match (username, secret) {
            (Some(username), password) => Credentials::Basic { username, password },
            (None, Some(token)) => Credentials::Bearer(token),
            (None, None) => Credentials::Anonymous,
        }
    }
}

/// Apply authentication to a request.
pub fn apply_auth(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials {
        Credentials::Basic { username, password } => {
            request.basic_auth(username, password.as_deref())
        }
        Credentials::Bearer(token) => request.bearer_auth(token),
        Credentials::Anonymous => request,
    }
}
