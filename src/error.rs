// src/error.rs
// =============================================================================
// Errors surfaced by the library.
//
// Only configuration-time and sitemap-time problems are errors. A request
// that fails while warming is not an error of the warmer: it is reported to
// the observer as a RequestFailure (see transport/mod.rs).
// =============================================================================

use thiserror::Error;

/// Everything that can go wrong before or around a warming run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarmerError {
    /// Invalid construction parameters (zero concurrency, bad header, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An ignore pattern that does not compile.
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A sitemap document could not be downloaded.
    #[error("failed to fetch sitemap {url}: {message}")]
    SitemapFetch { url: String, message: String },

    /// A sitemap document was downloaded but is not a sitemap.
    #[error("failed to parse sitemap {url}: {message}")]
    SitemapParse { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, WarmerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = WarmerError::InvalidPattern {
            pattern: "(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid ignore pattern '(': unclosed group");

        let err = WarmerError::SitemapFetch {
            url: "https://x.test/sitemap.xml".to_string(),
            message: "HTTP 404".to_string(),
        };
        assert!(err.to_string().contains("https://x.test/sitemap.xml"));
    }
}
