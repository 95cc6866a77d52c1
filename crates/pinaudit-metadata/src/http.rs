//! Client for the remote dependency metadata service.
//!
//! The service exposes the two metadata tables as JSON, keyed by package name
//! and exact version:
//!
//! - `GET {base}/packages/{name}/{version}/dependencies` returns
//!   `[{"targetFramework", "dependencyName", "dependencyVersionRange"}]`
//! - `GET {base}/packages/{name}/{version}/assemblies` returns
//!   `[{"assemblyName", "assemblyVersion", "libraryDirectoryPath"}]`
//!
//! A 404 means the service does not know the pair and yields no rows.

use std::time::Duration;

use pinaudit_core::config::SourceConfig;
use pinaudit_core::source::{AssemblyRow, DependencyRow, DependencySource};
use pinaudit_util::errors::AuditError;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::auth::{self, Credentials};

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Blocking HTTP implementation of [`DependencySource`].
pub struct HttpSource {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    retries: u32,
    retry_delay: Duration,
}

impl HttpSource {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
        retries: u32,
    ) -> miette::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| AuditError::Config {
            message: format!("Invalid metadata service URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AuditError::Config {
                message: format!("Metadata service URL '{base_url}' cannot be a base URL"),
            }
            .into());
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pinaudit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuditError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url,
            credentials,
            retries,
            retry_delay: RETRY_DELAY,
        })
    }

    pub fn from_config(config: &SourceConfig) -> miette::Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| AuditError::Config {
            message: "`source.url` is required when `source.kind = \"http\"`".to_string(),
        })?;
        Self::new(
            url,
            Credentials::from_config(config),
            Duration::from_secs(config.timeout_secs),
            config.retries,
        )
    }

    /// Override the pause between attempts (grows linearly per attempt).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// URL of a per-package table endpoint, with name and version
    /// percent-encoded as path segments.
    pub fn table_url(&self, name: &str, version: &str, table: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["packages", name, version, table]);
        }
        url
    }

    /// GET a JSON document, retrying server errors, timeouts and refused
    /// connections up to `retries` times after the first attempt. Returns
    /// `Ok(None)` for 404.
    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> miette::Result<Option<T>> {
        let mut last_err = String::new();

        for attempt in 0..=self.retries {
            if attempt > 0 {
                tracing::debug!(%url, attempt, "retrying metadata query");
                std::thread::sleep(self.retry_delay * attempt);
            }

            let request = auth::apply_auth(self.client.get(url.clone()), &self.credentials);
            match request.send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_server_error() {
                        last_err = format!("HTTP {status} from {url}");
                        continue;
                    }
                    if !status.is_success() {
                        return Err(AuditError::Query {
                            message: format!("HTTP {status} fetching {url}"),
                        }
                        .into());
                    }
                    let body = resp.json::<T>().map_err(|e| AuditError::Query {
                        message: format!("Invalid response from {url}: {e}"),
                    })?;
                    return Ok(Some(body));
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_err = format!("{e}");
                    continue;
                }
                Err(e) => {
                    return Err(AuditError::Query {
                        message: format!("Request to {url} failed: {e}"),
                    }
                    .into());
                }
            }
        }

        Err(AuditError::Query {
            message: format!(
                "Failed after {} attempts for {url}: {last_err}",
                self.retries + 1
            ),
        }
        .into())
    }
}

impl DependencySource for HttpSource {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
        if version.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.table_url(name, version, "dependencies");
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
        if version.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.table_url(name, version, "assemblies");
        Ok(self.get_json(&url)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> HttpSource {
        HttpSource::new(base, Credentials::Anonymous, Duration::from_secs(5), 3).unwrap()
    }

    #[test]
    fn table_url_layout() {
        let s = source("https://metadata.example.com/api/");
        assert_eq!(
            s.table_url("Newtonsoft.Json", "13.0.3", "dependencies").as_str(),
            "https://metadata.example.com/api/packages/Newtonsoft.Json/13.0.3/dependencies"
        );
    }

    #[test]
    fn table_url_encodes_segments() {
        let s = source("https://metadata.example.com");
        assert_eq!(
            s.table_url("My Pkg", "1.0.0+build/7", "assemblies").as_str(),
            "https://metadata.example.com/packages/My%20Pkg/1.0.0+build%2F7/assemblies"
        );
    }

    #[test]
    fn invalid_url_is_config_error() {
        let err = HttpSource::new("not a url", Credentials::Anonymous, Duration::from_secs(1), 1)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Config error"), "got: {err}");
    }

    #[test]
    fn missing_url_in_config() {
        let err = HttpSource::from_config(&SourceConfig::default()).err().unwrap();
        assert!(err.to_string().contains("source.url"), "got: {err}");
    }

    #[test]
    fn empty_version_skips_the_request() {
        // Port 9 (discard) is never contacted because the pin is empty.
        let s = source("http://127.0.0.1:9");
        assert!(s.fetch_dependencies("Lib", "").unwrap().is_empty());
        assert!(s.fetch_assemblies("Lib", "").unwrap().is_empty());
    }
}
