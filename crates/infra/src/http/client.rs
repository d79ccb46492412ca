use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use studyhub_domain::constants::{CLIENT_INFO, CLIENT_INFO_HEADER, RETRY_BASE_BACKOFF_MS};
use studyhub_domain::{BackendConfig, StudyHubError};
use tracing::debug;

use crate::errors::InfraError;

/// Header carrying the project's public anon key on every backend request.
pub const API_KEY_HEADER: &str = "apikey";

/// HTTP client for the hosted backend.
///
/// Every request carries the `apikey` and client-info headers. Gateway
/// failures and dropped connections are retried with exponential backoff up
/// to `max_attempts` times.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Client for the backend described by `config`.
    pub fn for_backend(config: &BackendConfig) -> Result<Self, StudyHubError> {
        Self::with_backoff(config, Duration::from_millis(RETRY_BASE_BACKOFF_MS))
    }

    fn with_backoff(config: &BackendConfig, base_backoff: Duration) -> Result<Self, StudyHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), header_value(&config.anon_key)?);
        headers.insert(HeaderName::from_static(CLIENT_INFO_HEADER), header_value(CLIENT_INFO)?);

        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(CLIENT_INFO)
            .default_headers(headers)
            .no_proxy()
            .build()
            .map_err(|err| StudyHubError::from(InfraError::from(err)))?;

        Ok(Self { client, max_attempts: config.max_attempts.max(1), base_backoff })
    }

    /// Start a request against the backend.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying server errors and transport failures.
    ///
    /// Any other response, error statuses included, goes back to the caller
    /// unchanged.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, StudyHubError> {
        let mut attempt = 1;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    StudyHubError::Internal("streaming request bodies cannot be retried".into())
                })?
                .build()
                .map_err(|err| StudyHubError::from(InfraError::from(err)))?;
            let method = request.method().clone();
            let url = redact_query(request.url());
            let last_attempt = attempt >= self.max_attempts;

            match self.client.execute(request).await {
                Ok(response) if last_attempt || !is_retryable_status(response.status()) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "backend responded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "backend unavailable; retrying");
                }
                Err(err) if last_attempt || !is_retryable_error(&err) => {
                    debug!(attempt, %method, %url, error = %err, "backend request failed");
                    return Err(InfraError::from(err).into());
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "backend unreachable; retrying");
                }
            }

            tokio::time::sleep(self.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Pause after failed attempt number `attempt`, doubling each time.
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << doublings)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StudyHubError> {
    HeaderValue::from_str(value)
        .map_err(|_| StudyHubError::Config("header value contains invalid characters".into()))
}

/// URL for logs: query strings can carry identity ids, so only the path is
/// kept.
fn redact_query(url: &reqwest::Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
