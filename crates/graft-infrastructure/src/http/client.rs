//! Authenticated, retrying HTTP client for the Grafana REST API.

use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

use graft_core::config::{EndpointConfig, MigrationSettings, RetrySettings};
use graft_core::error::{GraftError, Result};

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: usize = 10_000;

/// Why a request did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// The request never got an HTTP answer (DNS, connect, timeout).
    Transport { message: String },
    /// The server answered with a non-success status.
    Status { status: StatusCode, message: String },
    /// The body could not be decoded.
    Decode { message: String },
}

impl HttpFailure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "request failed: {}", message),
            Self::Status { status, message } => write!(f, "HTTP {}: {}", status.as_u16(), message),
            Self::Decode { message } => write!(f, "invalid response body: {}", message),
        }
    }
}

/// Client bound to one Grafana instance.
#[derive(Clone)]
pub struct GrafanaClient {
    client: Client,
    api_root: String,
    api_key: String,
    retry: RetrySettings,
    request_timeout: Duration,
}

impl GrafanaClient {
    /// Creates a client for `endpoint` with the request timeout and retry
    /// policy from `settings`.
    pub fn new(endpoint: &EndpointConfig, settings: &MigrationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| GraftError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_root: api_root(&endpoint.url),
            api_key: endpoint.api_key.clone(),
            retry: settings.retry,
            request_timeout: settings.request_timeout(),
        })
    }

    /// Absolute URL of `path` below `/api`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    /// Sends a GET request and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, HttpFailure> {
        let url = self.api_url(path);
        let response = self
            .send_with_retry(|| self.authorized(self.client.get(&url)).query(query))
            .await?;
        decode(response).await
    }

    /// Sends a POST request with a JSON body and decodes the JSON answer.
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, HttpFailure> {
        let url = self.api_url(path);
        let response = self
            .send_with_retry(|| self.authorized(self.client.post(&url)).json(body))
            .await?;
        decode(response).await
    }

    /// Fetches every page of a `limit`/`page` paginated listing.
    ///
    /// Stops at the first page shorter than `page_size`.
    pub async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        page_size: usize,
    ) -> std::result::Result<Vec<T>, HttpFailure> {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let mut paged_query = query.to_vec();
            paged_query.push(("limit", page_size.to_string()));
            paged_query.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &paged_query).await?;
            let short_page = batch.len() < page_size;
            items.extend(batch);

            if short_page {
                return Ok(items);
            }
        }

        tracing::warn!(path, "Stopped paging after {} pages", MAX_PAGES);
        Ok(items)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
    }

    /// Sends the request built by `build`, retrying transient failures.
    ///
    /// Only success responses are returned as `Ok`.
    async fn send_with_retry<F>(&self, build: F) -> std::result::Result<Response, HttpFailure>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;

        loop {
            let (failure, retryable, retry_after) = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(parse_retry_after);
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    let failure = HttpFailure::Status {
                        status,
                        message: error_message(&body),
                    };
                    (failure, is_retryable_status(status), retry_after)
                }
                Err(err) => {
                    let retryable = err.is_connect() || err.is_timeout();
                    let failure = HttpFailure::Transport {
                        message: err.to_string(),
                    };
                    (failure, retryable, None)
                }
            };

            if !retryable || attempt >= self.retry.max_retries {
                return Err(failure);
            }

            attempt += 1;
            let delay = retry_delay(retry_after, self.retry.backoff(attempt), self.request_timeout);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Retrying after transient failure: {}",
                failure
            );
            tokio::time::sleep(delay).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, HttpFailure> {
    response.json::<T>().await.map_err(|e| HttpFailure::Decode {
        message: e.to_string(),
    })
}

/// `<base>/api` with any trailing slash removed from `base`.
pub(crate) fn api_root(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{}/api", base)
    }
}

/// Prefers Grafana's `{"message": ...}` error field over the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Wait before the next attempt.
///
/// A server-supplied `Retry-After` is honored up to the larger of the
/// computed backoff and the request timeout.
pub(crate) fn retry_delay(
    retry_after: Option<Duration>,
    backoff: Duration,
    request_timeout: Duration,
) -> Duration {
    match retry_after {
        Some(requested) => requested.min(backoff.max(request_timeout)),
        None => backoff,
    }
}

fn parse_retry_after(header: &HeaderValue) -> Option<Duration> {
    let value = header.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> GrafanaClient {
        GrafanaClient::new(
            &EndpointConfig::new(url, "key"),
            &MigrationSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_api_root_normalization() {
        assert_eq!(api_root("http://grafana:3000"), "http://grafana:3000/api");
        assert_eq!(api_root("http://grafana:3000/"), "http://grafana:3000/api");
        assert_eq!(api_root("http://grafana:3000/api/"), "http://grafana:3000/api");
        assert_eq!(
            api_root(" https://example.com/grafana "),
            "https://example.com/grafana/api"
        );
    }

    #[test]
    fn test_api_url_joins_paths() {
        let client = client("http://source-grafana:3000/");
        assert_eq!(client.api_url("folders"), "http://source-grafana:3000/api/folders");
        assert_eq!(
            client.api_url("/dashboards/uid/d1"),
            "http://source-grafana:3000/api/dashboards/uid/d1"
        );
    }

    #[test]
    fn test_error_message_prefers_grafana_message() {
        assert_eq!(
            error_message(r#"{"message":"Dashboard not found"}"#),
            "Dashboard not found"
        );
        assert_eq!(error_message("  plain failure \n"), "plain failure");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::CONFLICT));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_parse_retry_after() {
        let header = HeaderValue::from_static("3");
        assert_eq!(parse_retry_after(&header), Some(Duration::from_secs(3)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(&date), None);
    }

    #[test]
    fn test_retry_delay_caps_server_hint() {
        let backoff = Duration::from_millis(250);
        let timeout = Duration::from_secs(30);

        assert_eq!(retry_delay(None, backoff, timeout), backoff);
        assert_eq!(
            retry_delay(Some(Duration::from_secs(2)), backoff, timeout),
            Duration::from_secs(2)
        );
        assert_eq!(
            retry_delay(Some(Duration::from_secs(3600)), backoff, timeout),
            timeout
        );
        assert_eq!(
            retry_delay(Some(Duration::from_secs(3600)), Duration::from_secs(60), timeout),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = HttpFailure::Status {
            status: StatusCode::CONFLICT,
            message: "a folder with the same uid already exists".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "HTTP 409: a folder with the same uid already exists"
        );
        assert_eq!(failure.status(), Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let settings = MigrationSettings {
            request_timeout_secs: 2,
            retry: RetrySettings {
                max_retries: 0,
                initial_backoff_ms: 1,
            },
            ..MigrationSettings::default()
        };
        // Port 9 (discard) on localhost is closed in test environments.
        let client =
            GrafanaClient::new(&EndpointConfig::new("http://127.0.0.1:9", "key"), &settings)
                .unwrap();

        let result: std::result::Result<Vec<serde_json::Value>, HttpFailure> =
            client.get_json("folders", &[]).await;

        assert!(matches!(result, Err(HttpFailure::Transport { .. })));
    }
}
