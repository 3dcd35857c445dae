// src/sitemap/parse.rs
// =============================================================================
// Reads one sitemap document.
//
// We use the `scraper` crate here too. Its html5ever parser is forgiving
// enough to read sitemap XML: unknown tags like <urlset> and <loc> become
// ordinary elements we can select with CSS selectors, and entities such
// as &amp; are decoded for us.
//
// Things html5ever does not understand are fixed up first:
// - a leading byte-order mark
// - <![CDATA[ ... ]]> sections, which HTML treats as comments
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// What a single sitemap document contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SitemapDocument {
    /// Page URLs, from a <urlset> or a plain-text sitemap
    Pages(Vec<String>),
    /// Nested sitemap URLs, from a <sitemapindex>
    Index(Vec<String>),
}

// The selectors are constants, so failing to parse them is a programmer
// error rather than something a sitemap can cause.
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

/// Parses `body`, resolving relative entries against `base`.
///
/// Returns a human-readable message when the document is not a sitemap.
pub(crate) fn parse_document(body: &str, base: &Url) -> Result<SitemapDocument, String> {
    let body = body.trim_start_matches('\u{feff}').trim();

    if body.is_empty() {
        return Ok(SitemapDocument::Pages(Vec::new()));
    }

    if body.starts_with('<') {
        parse_xml(body, base)
    } else {
        parse_text(body)
    }
}

fn parse_xml(body: &str, base: &Url) -> Result<SitemapDocument, String> {
    let body = body.replace("<![CDATA[", "").replace("]]>", "");
    let document = Html::parse_document(&body);

    let root_has = |css: &str| document.select(&selector(css)).next().is_some();

    let locs = |css: &str| -> Vec<String> {
        document
            .select(&selector(css))
            .filter_map(|loc| {
                let text = loc.text().collect::<String>();
                resolve_loc(base, text.trim())
            })
            .collect()
    };

    if root_has("urlset") {
        Ok(SitemapDocument::Pages(locs("urlset > url > loc")))
    } else if root_has("sitemapindex") {
        Ok(SitemapDocument::Index(locs("sitemapindex > sitemap > loc")))
    } else {
        Err("expected a <urlset> or <sitemapindex> document".to_string())
    }
}

fn parse_text(body: &str) -> Result<SitemapDocument, String> {
    let urls: Vec<String> = body
        .lines()
        .map(str::trim)
        .filter_map(|line| Url::parse(line).ok())
        .filter(is_web_url)
        .map(String::from)
        .collect();

    if urls.is_empty() {
        return Err("document is neither XML nor a list of URLs".to_string());
    }

    Ok(SitemapDocument::Pages(urls))
}

// Resolves a possibly-relative <loc> value to an absolute http(s) URL
fn resolve_loc(base: &Url, loc: &str) -> Option<String> {
    if loc.is_empty() {
        return None;
    }

    base.join(loc)
        .ok()
        .filter(is_web_url)
        .map(String::from)
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
