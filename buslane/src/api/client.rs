//! HTTP client abstraction for the arrival feed.
//!
//! The poller depends on the [`ArrivalsApi`] trait rather than a concrete
//! client, so tests can inject scripted responses without a network.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use super::models::ArrivalResponse;

/// Default arrival feed endpoint.
pub const DEFAULT_BASE_URL: &str = "https://arrivelah2.busrouter.sg/";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from fetching or decoding an arrival snapshot.
///
/// All of these are transient: the poller reports them as an error status
/// and retries on a shorter schedule. None are fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed before a response arrived (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The response body was not a valid arrival payload.
    #[error("malformed arrival payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Trait for fetching arrival snapshots.
///
/// Object-safe with a boxed future so the poller can hold any client behind
/// a shared reference.
pub trait ArrivalsApi: Send + Sync {
    /// Fetch the current arrival snapshot for a stop.
    fn fetch<'a>(
        &'a self,
        stop_code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ArrivalResponse, FetchError>> + Send + 'a>>;
}

/// Production arrival feed client backed by reqwest.
pub struct HttpArrivalsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArrivalsApi {
    /// Create a client against the default endpoint.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl ArrivalsApi for HttpArrivalsApi {
    fn fetch<'a>(
        &'a self,
        stop_code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ArrivalResponse, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}?id={}", self.base_url, stop_code);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Http(format!("request to {} failed: {}", url, e)))?;

            if !response.status().is_success() {
                return Err(FetchError::Status(response.status().as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Http(format!("failed to read response: {}", e)))?;

            Ok(serde_json::from_slice(&body)?)
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Mock client returning a fixed JSON body or error message.
    pub struct MockArrivalsApi {
        pub body: Result<String, String>,
    }

    impl ArrivalsApi for MockArrivalsApi {
        fn fetch<'a>(
            &'a self,
            _stop_code: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<ArrivalResponse, FetchError>> + Send + 'a>>
        {
            Box::pin(async move {
                match &self.body {
                    Ok(json) => Ok(serde_json::from_str(json)?),
                    Err(message) => Err(FetchError::Http(message.clone())),
                }
            })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockArrivalsApi {
            body: Ok(r#"{"services":[{"no":"10"}]}"#.to_string()),
        };

        let response = mock.fetch("97309").await.unwrap();
        assert_eq!(response.services.len(), 1);
        assert_eq!(response.services[0].no, "10");
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockArrivalsApi {
            body: Err("connection refused".to_string()),
        };

        let result = mock.fetch("97309").await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let mock = MockArrivalsApi {
            body: Ok("not json".to_string()),
        };

        let result = mock.fetch("97309").await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status(502);
        assert!(err.to_string().contains("502"));

        let err = FetchError::Http("timed out".to_string());
        assert!(err.to_string().contains("timed out"));
    }
}
