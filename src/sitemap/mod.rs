// src/sitemap/mod.rs
// =============================================================================
// This module turns a sitemap URL into the list of pages it advertises.
//
// Features:
// - XML <urlset> sitemaps and plain-text (one URL per line) sitemaps
// - Recursive expansion of <sitemapindex> documents, breadth-first
// - De-duplicated output in first-seen order
// - A depth limit so a misconfigured index cannot send us around forever
//
// Submodules:
// - parse: reads one downloaded document
// - queue: walks the tree of documents over HTTP
// =============================================================================

mod parse;
mod queue;

pub use queue::HttpSitemapResolver;

use async_trait::async_trait;

use crate::error::Result;
use crate::transport::TransportOptions;

/// Expands a sitemap into a flat list of page URLs.
///
/// Fails with [`WarmerError::SitemapFetch`](crate::WarmerError::SitemapFetch)
/// or [`WarmerError::SitemapParse`](crate::WarmerError::SitemapParse); a
/// failure anywhere in the tree fails the whole call.
#[async_trait]
pub trait SitemapResolver: Send + Sync {
    async fn resolve(&self, sitemap_url: &str) -> Result<Vec<String>>;
}

/// Options for [`Warmer::parse_sitemap`](crate::Warmer::parse_sitemap).
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// HTTP settings for fetching the sitemaps; `None` reuses the warmer's
    pub transport: Option<TransportOptions>,
    /// How many levels of documents to read, the root sitemap being level 1
    pub max_depth: usize,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            transport: None,
            max_depth: 8,
        }
    }
}
