// src/transport/mod.rs
// =============================================================================
// The HTTP side of warming: one GET per URL.
//
// The engine only ever talks to the `Transport` trait, so tests can swap the
// real reqwest client for an in-memory fake.
//
// Submodules:
// - http: the reqwest-backed transport used in production
//
// Rust concepts:
// - Traits: the seam between the scheduler and the network
// - async-trait: async methods on a trait object
// - thiserror: deriving std::error::Error for our failure type
// =============================================================================

mod http;

pub use http::ReqwestTransport;
pub(crate) use http::build_client;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Settings forwarded to the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Whole-request timeout, body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Redirects followed before the request fails
    pub redirect_limit: usize,
    pub user_agent: String,
    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
    /// Skip TLS certificate validation (staging servers, self-signed certs)
    pub accept_invalid_certs: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            user_agent: concat!("cache-warmer/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: Vec::new(),
            accept_invalid_certs: false,
        }
    }
}

/// A completed response, whatever its status code.
#[derive(Debug, Clone)]
pub struct WarmResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// URL after redirects
    pub final_url: String,
    pub body: Bytes,
}

impl WarmResponse {
    pub fn new(status: StatusCode, final_url: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            final_url: final_url.into(),
            body: Bytes::new(),
        }
    }
}

/// Why a request could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    /// Too many redirects, or a redirect loop
    Redirect,
    /// DNS, refused connection, TLS handshake
    Connect,
    /// Headers arrived but the body could not be read
    Body,
    /// Anything else reqwest reports
    Request,
}

/// A transport-level failure for one URL. Never an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Performs the GET for a single URL.
///
/// `Ok` means a response came back, including 4xx and 5xx ones. `Err` is
/// reserved for requests that never produced a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<WarmResponse, RequestFailure>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<WarmResponse, RequestFailure> {
        (**self).get(url).await
    }
}
