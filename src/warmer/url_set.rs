// src/warmer/url_set.rs
// =============================================================================
// The ordered queue of URLs to warm, plus its two ignore lists.
//
// Rules:
// - Every URL is normalized by trimming trailing slashes
// - Exact ignore rules compare against the normalized URL
// - Regex ignore rules are matched against the normalized URL
// - A new rule purges matching URLs already queued, and filters later adds
// - Duplicates are kept: de-duplication is the caller's business
//
// Rust concepts:
// - Vec::retain: rebuild a vector in place, keeping what passes a test
// - Result: registering a bad regex is the one operation here that can fail
// =============================================================================

use regex::{Regex, RegexBuilder};

use crate::error::{Result, WarmerError};

/// Trims every trailing `/` so `https://x.test/a/` and `https://x.test/a`
/// compare equal.
pub fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// A compiled regex ignore rule, remembering the pattern it was built from.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    source: String,
    regex: Regex,
}

impl IgnorePattern {
    /// Compiles a delimited regex such as `/\.pdf$/` or `#^https://x\.test/admin#i`.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = compile_pattern(pattern)?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

// A pattern is always `<delim>body<delim>flags`. The opening delimiter is any
// char but alphanumerics, backslash and whitespace; brackets close with
// their pair, `{...}`, `(...)`, `[...]`, `<...>`.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let invalid = |message: String| WarmerError::InvalidPattern {
        pattern: pattern.to_string(),
        message,
    };

    let (body, flags) = split_delimited(pattern).map_err(|message| invalid(message.to_string()))?;

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            // regex is Unicode-aware already
            'u' => &mut builder,
            other => return Err(invalid(format!("unknown modifier '{}'", other))),
        };
    }

    builder.build().map_err(|e| invalid(e.to_string()))
}

// "/body/flags" -> ("body", "flags")
fn split_delimited(pattern: &str) -> std::result::Result<(&str, &str), &'static str> {
    let open = pattern.chars().next().ok_or("empty pattern")?;
    if open.is_alphanumeric() || open == '\\' || open.is_whitespace() {
        return Err("delimiter must not be alphanumeric, backslash or whitespace");
    }

    let close = match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        '<' => '>',
        other => other,
    };

    let start = open.len_utf8();
    let end = pattern[start..]
        .rfind(close)
        .map(|i| i + start)
        .ok_or("no ending delimiter")?;

    Ok((&pattern[start..end], &pattern[end + close.len_utf8()..]))
}

/// Ordered collection of URLs waiting to be warmed.
#[derive(Debug, Clone, Default)]
pub struct UrlSet {
    urls: Vec<String>,
    ignored: Vec<String>,
    patterns: Vec<IgnorePattern>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` unless an ignore rule matches it.
    ///
    /// Returns whether the URL was queued. Filtering is silent policy, so a
    /// filtered URL is not an error.
    pub fn add(&mut self, url: &str) -> bool {
        let url = normalize_url(url);
        if self.is_ignored(url) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    /// Applies [`UrlSet::add`] to each URL in order; returns how many were queued.
    pub fn add_all<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .filter(|url| self.add(url.as_ref()))
            .count()
    }

    /// Records an exact ignore rule and purges queued URLs equal to it.
    ///
    /// Returns how many queued URLs were removed.
    pub fn ignore_exact(&mut self, url: &str) -> usize {
        let url = normalize_url(url).to_string();
        let before = self.urls.len();
        self.urls.retain(|queued| *queued != url);
        self.ignored.push(url);
        before - self.urls.len()
    }

    /// Records a regex ignore rule and purges queued URLs matching it.
    ///
    /// A pattern that does not compile is rejected here and no rule is kept.
    pub fn ignore_pattern(&mut self, pattern: &str) -> Result<usize> {
        let pattern = IgnorePattern::new(pattern)?;
        let before = self.urls.len();
        self.urls.retain(|queued| !pattern.is_match(queued));
        self.patterns.push(pattern);
        Ok(before - self.urls.len())
    }

    /// Whether an already-normalized URL matches any rule.
    pub fn is_ignored(&self, url: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == url)
            || self.patterns.iter().any(|pattern| pattern.is_match(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Read-only view in dispatch order.
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.urls.iter()
    }

    pub fn ignored_urls(&self) -> &[String] {
        &self.ignored
    }

    pub fn ignored_patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }
}
