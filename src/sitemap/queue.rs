// src/sitemap/queue.rs
// =============================================================================
// Walks a sitemap tree breadth-first over HTTP.
//
// How it works:
// 1. Start with the root sitemap in a queue
// 2. Fetch the document and parse it
// 3. Page URLs go to the result (first occurrence wins)
// 4. Nested sitemaps go to the back of the queue (if not visited and within
//    the depth limit)
// 5. Repeat until the queue is empty
//
// Any document that cannot be fetched or parsed fails the whole walk: the
// caller then enqueues nothing rather than a partial site.
//
// Rust concepts:
// - HashSet: to track visited documents and returned pages (O(1) lookup)
// - VecDeque: double-ended queue for breadth-first traversal
// =============================================================================

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::parse::{parse_document, SitemapDocument};
use super::{SitemapOptions, SitemapResolver};
use crate::error::{Result, WarmerError};
use crate::transport::{build_client, TransportOptions};

// A sitemap waiting to be fetched
#[derive(Debug, Clone)]
struct QueueItem {
    url: Url,
    depth: usize, // 1 for the root sitemap
}

/// The default [`SitemapResolver`]: fetches documents with reqwest.
#[derive(Debug, Clone)]
pub struct HttpSitemapResolver {
    client: Client,
    max_depth: usize,
}

impl HttpSitemapResolver {
    pub fn new(transport: &TransportOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(transport)?,
            max_depth: SitemapOptions::default().max_depth,
        })
    }

    /// Builds a resolver from `options`, falling back to `default_transport`
    /// when the options carry no HTTP settings of their own.
    pub fn from_options(options: &SitemapOptions, default_transport: &TransportOptions) -> Result<Self> {
        let transport = options.transport.as_ref().unwrap_or(default_transport);
        Ok(Self::new(transport)?.with_max_depth(options.max_depth))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let fetch_error = |message: String| WarmerError::SitemapFetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[async_trait]
impl SitemapResolver for HttpSitemapResolver {
    async fn resolve(&self, sitemap_url: &str) -> Result<Vec<String>> {
        let root = Url::parse(sitemap_url).map_err(|e| WarmerError::SitemapFetch {
            url: sitemap_url.to_string(),
            message: format!("invalid URL: {}", e),
        })?;

        let mut queue = VecDeque::new();
        queue.push_back(QueueItem { url: root, depth: 1 });

        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut pages = Vec::new();

        while let Some(item) = queue.pop_front() {
            if !visited.insert(item.url.to_string()) {
                continue;
            }

            debug!(sitemap = %item.url, depth = item.depth, "fetching sitemap");
            let body = self.fetch(&item.url).await?;

            let document = parse_document(&body, &item.url).map_err(|message| {
                WarmerError::SitemapParse {
                    url: item.url.to_string(),
                    message,
                }
            })?;

            match document {
                SitemapDocument::Pages(urls) => {
                    debug!(sitemap = %item.url, pages = urls.len(), "sitemap parsed");
                    for url in urls {
                        if seen.insert(url.clone()) {
                            pages.push(url);
                        }
                    }
                }
                SitemapDocument::Index(children) => {
                    debug!(sitemap = %item.url, children = children.len(), "sitemap index parsed");
                    for child in children {
                        if item.depth >= self.max_depth {
                            warn!(sitemap = %child, max_depth = self.max_depth, "sitemap nested too deep, skipped");
                            continue;
                        }
                        // parse_document only returns absolute URLs
                        if let Ok(url) = Url::parse(&child) {
                            queue.push_back(QueueItem {
                                url,
                                depth: item.depth + 1,
                            });
                        }
                    }
                }
            }
        }

        info!(sitemap = sitemap_url, documents = visited.len(), pages = pages.len(), "sitemap resolved");
        Ok(pages)
    }
}
