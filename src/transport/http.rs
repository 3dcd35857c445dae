// src/transport/http.rs
// =============================================================================
// The production transport: GET requests through one shared reqwest client.
//
// Key functionality:
// - Builds a single reqwest::Client (connection pool shared by every request)
// - Downloads the full body, so the cache behind the URL sees a real visit
// - Treats every HTTP status as a response, even 404 or 500
// - Categorizes transport errors (timeout, redirects, connect, ...)
//
// Rust concepts:
// - async/await: for concurrent network I/O
// - Result<T, E>: a failure is a value, not a panic
// - Trait implementation: ReqwestTransport implements Transport
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use super::{FailureKind, RequestFailure, Transport, TransportOptions, WarmResponse};
use crate::error::{Result, WarmerError};

/// A [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the client from `options`.
    ///
    /// Fails with [`WarmerError::Configuration`] for a header that is not
    /// valid HTTP or a client reqwest refuses to build.
    pub fn new(options: &TransportOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(options)?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Builds a reqwest client honouring every field of `options`.
///
/// Shared with the sitemap resolver so both fetch documents the same way.
pub(crate) fn build_client(options: &TransportOptions) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| WarmerError::Configuration(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| WarmerError::Configuration(format!("invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    Client::builder()
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .redirect(reqwest::redirect::Policy::limited(options.redirect_limit))
        .user_agent(options.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(|e| WarmerError::Configuration(format!("failed to build HTTP client: {}", e)))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<WarmResponse, RequestFailure> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();

        // Read the whole body; a half-read response may not be cached.
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                categorize_error(e)
            } else {
                RequestFailure::new(FailureKind::Body, e.to_string())
            }
        })?;

        Ok(WarmResponse {
            status,
            headers,
            final_url,
            body,
        })
    }
}

// Categorizes the different error types reqwest can report
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: reqwest::Error) -> RequestFailure {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_redirect() {
        FailureKind::Redirect
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_body() || error.is_decode() {
        FailureKind::Body
    } else {
        FailureKind::Request
    };

    RequestFailure::new(kind, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_header_name() {
        let options = TransportOptions {
            headers: vec![("bad header".to_string(), "x".to_string())],
            ..TransportOptions::default()
        };
        let err = ReqwestTransport::new(&options).unwrap_err();
        assert!(matches!(err, WarmerError::Configuration(_)));
    }

    #[test]
    fn test_accepts_custom_headers() {
        let options = TransportOptions {
            headers: vec![("X-Warmup".to_string(), "1".to_string())],
            ..TransportOptions::default()
        };
        assert!(ReqwestTransport::new(&options).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failure() {
        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        // Port 9 (discard) on localhost is closed on any sane test machine
        let err = transport.get("http://127.0.0.1:9/").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Connect);
    }
}
