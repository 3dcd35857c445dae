// src/lib.rs
// =============================================================================
// cache-warmer: request every page of a site so caches are hot before real
// visitors arrive.
//
// Modules:
// - warmer: the Warmer facade, its URL queue, observers and request pool
// - transport: the HTTP client seam and its reqwest implementation
// - sitemap: sitemap (and sitemap index) expansion
// - error: the library's error type
// =============================================================================

pub mod error;
pub mod sitemap;
pub mod transport;
pub mod warmer;

pub use error::{Result, WarmerError};
pub use sitemap::{HttpSitemapResolver, SitemapOptions, SitemapResolver};
pub use transport::{
    FailureKind, RequestFailure, ReqwestTransport, Transport, TransportOptions, WarmResponse,
};
pub use warmer::{
    normalize_url, IgnorePattern, NoopObserver, Observer, RequestOutcome, RequestPool, UrlSet,
    WarmHandle, Warmer, WarmerConfig,
};

// Re-exported so callers can cancel a run without depending on tokio-util.
pub use tokio_util::sync::CancellationToken;
