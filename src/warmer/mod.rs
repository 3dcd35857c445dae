// src/warmer/mod.rs
// =============================================================================
// The Warmer: the public face of the library.
//
// A Warmer owns the queue of URLs and its ignore rules, knows how to fill the
// queue from a sitemap, and starts warming runs.
//
// Submodules:
// - url_set: the ordered queue and its ignore lists
// - observer: the callbacks a run reports through
// - pool: the bounded-concurrency scheduler behind warm()
//
// Typical use:
//
//   let mut warmer = Warmer::new(WarmerConfig::default())?.with_observer(MyObserver);
//   warmer.parse_sitemap("https://example.com/sitemap.xml", SitemapOptions::default()).await?;
//   warmer.ignore_regex(r"/\.pdf$/")?;
//   warmer.warm().await;
// =============================================================================

mod observer;
mod pool;
mod url_set;

pub use observer::{NoopObserver, Observer, RequestOutcome};
pub use pool::{RequestPool, WarmHandle};
pub use url_set::{normalize_url, IgnorePattern, UrlSet};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, WarmerError};
use crate::sitemap::{HttpSitemapResolver, SitemapOptions, SitemapResolver};
use crate::transport::{ReqwestTransport, Transport, TransportOptions};

/// Settings fixed for the lifetime of a [`Warmer`].
#[derive(Debug, Clone)]
pub struct WarmerConfig {
    /// Maximum number of requests in flight at once
    pub concurrency: usize,
    pub transport: TransportOptions,
}

impl WarmerConfig {
    pub const DEFAULT_CONCURRENCY: usize = 25;

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(WarmerError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WarmerConfig {
    fn default() -> Self {
        Self {
            concurrency: Self::DEFAULT_CONCURRENCY,
            transport: TransportOptions::default(),
        }
    }
}

/// Queues URLs and requests them all with bounded concurrency.
///
/// The queue must be filled before [`Warmer::warm`] is called: a run works on
/// a snapshot, so later changes only affect later runs.
pub struct Warmer {
    config: WarmerConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    urls: UrlSet,
}

impl Warmer {
    /// Creates a warmer backed by a reqwest client built from `config.transport`.
    pub fn new(config: WarmerConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.transport)?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Creates a warmer that sends its requests through `transport`.
    ///
    /// `config.transport` is still used for sitemap fetches.
    pub fn with_transport(config: WarmerConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    fn assemble(config: WarmerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(NoopObserver),
            urls: UrlSet::new(),
        }
    }

    /// Sets the observer every later run reports to.
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn config(&self) -> &WarmerConfig {
        &self.config
    }

    pub fn add_url(&mut self, url: &str) -> &mut Self {
        self.urls.add(url);
        self
    }

    pub fn add_urls<I, S>(&mut self, urls: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.urls.add_all(urls);
        self
    }

    /// Fetches a sitemap (following nested indexes) and queues its pages.
    ///
    /// On error nothing is queued.
    pub async fn parse_sitemap(&mut self, sitemap_url: &str, options: SitemapOptions) -> Result<&mut Self> {
        let resolver = HttpSitemapResolver::from_options(&options, &self.config.transport)?;
        self.parse_sitemap_with(&resolver, sitemap_url).await
    }

    /// Like [`Warmer::parse_sitemap`], with a caller-supplied resolver.
    pub async fn parse_sitemap_with(
        &mut self,
        resolver: &dyn SitemapResolver,
        sitemap_url: &str,
    ) -> Result<&mut Self> {
        let urls = resolver.resolve(sitemap_url).await?;
        let queued = self.urls.add_all(&urls);
        info!(sitemap = sitemap_url, found = urls.len(), queued, "sitemap added to queue");
        Ok(self)
    }

    /// Ignores one exact URL (trailing slashes don't matter).
    pub fn ignore_url(&mut self, url: &str) -> &mut Self {
        let removed = self.urls.ignore_exact(url);
        debug!(url, removed, "ignoring url");
        self
    }

    pub fn ignore_urls<I, S>(&mut self, urls: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            self.ignore_url(url.as_ref());
        }
        self
    }

    /// Ignores every URL matching `pattern`, a delimited regex such as
    /// `/\.pdf$/i` (everything after the closing delimiter is flags).
    pub fn ignore_regex(&mut self, pattern: &str) -> Result<&mut Self> {
        let removed = self.urls.ignore_pattern(pattern)?;
        debug!(pattern, removed, "ignoring pattern");
        Ok(self)
    }

    /// Registers patterns in order. On the first invalid one, the patterns
    /// before it stay registered and the error is returned.
    pub fn ignore_regexes<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.ignore_regex(pattern.as_ref())?;
        }
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.urls.len()
    }

    /// The queued URLs, in the order they will be dispatched.
    pub fn urls(&self) -> &[String] {
        self.urls.as_slice()
    }

    pub fn url_set(&self) -> &UrlSet {
        &self.urls
    }

    /// Starts requesting every queued URL and returns at once.
    ///
    /// The handle resolves after each URL has produced exactly one observer
    /// callback, or immediately when the queue is empty. Must be called from
    /// within a tokio runtime unless the queue is empty.
    pub fn warm(&self) -> WarmHandle {
        self.warm_with_cancellation(CancellationToken::new())
    }

    /// Like [`Warmer::warm`]; cancelling `token` stops new requests from
    /// starting.
    pub fn warm_with_cancellation(&self, token: CancellationToken) -> WarmHandle {
        RequestPool::new(self.transport.clone(), self.observer.clone(), self.config.concurrency)
            .spawn(self.urls.as_slice().to_vec(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RequestFailure, WarmResponse};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AlwaysOk;

    #[async_trait]
    impl Transport for AlwaysOk {
        async fn get(&self, url: &str) -> std::result::Result<WarmResponse, RequestFailure> {
            Ok(WarmResponse::new(StatusCode::OK, url))
        }
    }

    struct StaticResolver(std::result::Result<Vec<String>, WarmerError>);

    #[async_trait]
    impl SitemapResolver for StaticResolver {
        async fn resolve(&self, _sitemap_url: &str) -> Result<Vec<String>> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn on_fulfilled(&self, _response: WarmResponse, _url: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_zero_concurrency_is_a_configuration_error() {
        let config = WarmerConfig {
            concurrency: 0,
            ..WarmerConfig::default()
        };
        assert!(matches!(
            Warmer::new(config.clone()),
            Err(WarmerError::Configuration(_))
        ));
        assert!(matches!(
            Warmer::with_transport(config, AlwaysOk),
            Err(WarmerError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_concurrency() {
        let warmer = Warmer::new(WarmerConfig::default()).unwrap();
        assert_eq!(warmer.config().concurrency, 25);
    }

    #[test]
    fn test_queue_and_filters_chain() {
        let mut warmer = Warmer::with_transport(WarmerConfig::default(), AlwaysOk).unwrap();
        warmer
            .add_urls(["http://x.test/a/", "http://x.test/a.pdf", "http://x.test/b.html"])
            .ignore_urls(["http://x.test/a"])
            .ignore_regexes([r"/\.pdf$/"])
            .unwrap()
            .add_url("http://x.test/c.pdf");

        assert_eq!(warmer.urls(), ["http://x.test/b.html"]);
        assert_eq!(warmer.size(), 1);
    }

    #[test]
    fn test_invalid_regex_keeps_earlier_rules() {
        let mut warmer = Warmer::with_transport(WarmerConfig::default(), AlwaysOk).unwrap();
        warmer.add_urls(["http://x.test/a.pdf", "http://x.test/b.html"]);

        let err = warmer.ignore_regexes([r"/\.pdf$/", "/(bad/"]).err();
        assert!(matches!(err, Some(WarmerError::InvalidPattern { .. })));
        assert_eq!(warmer.urls(), ["http://x.test/b.html"]);
    }

    #[tokio::test]
    async fn test_sitemap_urls_go_through_filters() {
        let mut warmer = Warmer::with_transport(WarmerConfig::default(), AlwaysOk).unwrap();
        warmer.ignore_url("https://x.test/private");

        let resolver = StaticResolver(Ok(vec![
            "https://x.test/".to_string(),
            "https://x.test/private/".to_string(),
        ]));
        warmer.parse_sitemap_with(&resolver, "https://x.test/sitemap.xml").await.unwrap();

        assert_eq!(warmer.urls(), ["https://x.test"]);
    }

    #[tokio::test]
    async fn test_failed_sitemap_queues_nothing() {
        let mut warmer = Warmer::with_transport(WarmerConfig::default(), AlwaysOk).unwrap();
        let resolver = StaticResolver(Err(WarmerError::SitemapParse {
            url: "https://x.test/sitemap.xml".to_string(),
            message: "bad".to_string(),
        }));

        let result = warmer.parse_sitemap_with(&resolver, "https://x.test/sitemap.xml").await;
        assert!(matches!(result, Err(WarmerError::SitemapParse { .. })));
        assert_eq!(warmer.size(), 0);
    }

    #[tokio::test]
    async fn test_warm_reports_every_url() {
        let counter = Arc::new(Counter::default());
        let mut warmer = Warmer::with_transport(
            WarmerConfig {
                concurrency: 2,
                ..WarmerConfig::default()
            },
            AlwaysOk,
        )
        .unwrap()
        .with_observer(counter.clone());

        warmer.add_urls(["https://x.test/1", "https://x.test/2", "https://x.test/3"]);
        warmer.warm().await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_warm_on_empty_queue() {
        let counter = Arc::new(Counter::default());
        let warmer = Warmer::with_transport(WarmerConfig::default(), AlwaysOk)
            .unwrap()
            .with_observer(counter.clone());

        let handle = warmer.warm();
        assert!(handle.is_finished());
        handle.await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
