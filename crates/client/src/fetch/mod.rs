//! HTTP fetch with bounded retries.
//!
//! ### Retry policy
//! - Retries on statuses 429, 500, 502, 503, 504 and on connection failures.
//! - Exponential backoff: `backoff * 2^attempt` between attempts.
//! - Connect and read timeouts are returned at once, never retried, so one
//!   fetch never runs longer than a single `timeout`.
//! - Any other non-2xx status fails without retry.

pub mod error;
pub mod url;

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, header};

pub use error::FetchError;
pub use url::{certificate_url, registry_url};

use garanti_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,

    /// Per-request timeout (default: 8s)
    pub timeout: Duration,

    /// Retries after the first attempt (default: 3)
    pub max_retries: u32,

    /// Base backoff delay (default: 300ms)
    pub backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self::from(&app)
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.certificate_timeout(),
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// A successful text response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub final_url: reqwest::Url,
    pub status: StatusCode,
    pub body: String,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub fetch_ms: u64,
}

/// HTTP GET client with retry and backoff.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &reqwest::Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            let outcome = self.attempt(url).await;
            let retryable = match &outcome {
                Ok(_) => false,
                Err(err) => err.is_retryable(),
            };

            if !retryable || attempt >= self.config.max_retries {
                let fetch_ms = start.elapsed().as_millis() as u64;
                return outcome.map(|(final_url, status, body)| {
                    tracing::debug!(url = %url, status = status.as_u16(), fetch_ms, attempts = attempt + 1, "fetched");
                    FetchResponse { final_url, status, body, attempts: attempt + 1, fetch_ms }
                });
            }

            let delay = self.backoff_for(attempt);
            if let Err(err) = &outcome {
                tracing::debug!(url = %url, attempt = attempt + 1, error = %err, ?delay, "retrying");
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &reqwest::Url) -> Result<(reqwest::Url, StatusCode, String), FetchError> {
        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        Ok((final_url, status, body))
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.config.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn quick_client(max_retries: u32) -> FetchClient {
        FetchClient::new(FetchConfig {
            timeout: Duration::from_millis(500),
            max_retries,
            backoff: Duration::from_millis(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(8));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff, Duration::from_millis(300));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_backoff_doubles() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        assert_eq!(client.backoff_for(0), Duration::from_millis(300));
        assert_eq!(client.backoff_for(1), Duration::from_millis(600));
        assert_eq!(client.backoff_for(2), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_get_text_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sorgu/R0000000000001").header_exists("user-agent");
            then.status(200).body("<html>ok</html>");
        });

        let url = reqwest::Url::parse(&server.url("/sorgu/R0000000000001")).unwrap();
        let response = quick_client(3).get_text(&url).await.unwrap();

        mock.assert();
        assert_eq!(response.body, "<html>ok</html>");
        assert_eq!(response.attempts, 1);
    }

    #[tokio::test]
    async fn test_retries_on_503_then_gives_up() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/busy");
            then.status(503);
        });

        let url = reqwest::Url::parse(&server.url("/busy")).unwrap();
        let result = quick_client(2).get_text(&url).await;

        assert!(matches!(result, Err(FetchError::Status(503))));
        mock.assert_hits(3);
    }

    #[tokio::test]
    async fn test_no_retry_on_404() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let url = reqwest::Url::parse(&server.url("/missing")).unwrap();
        let result = quick_client(3).get_text(&url).await;

        assert!(matches!(result, Err(FetchError::Status(404))));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(1500)).body("late");
        });

        let url = reqwest::Url::parse(&server.url("/slow")).unwrap();
        let result = quick_client(3).get_text(&url).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let url = reqwest::Url::parse("http://127.0.0.1:9/unreachable").unwrap();
        let result = quick_client(1).get_text(&url).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
