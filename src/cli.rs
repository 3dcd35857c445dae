// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Arguments shared by several subcommands live in their own structs and are
// pulled in with #[command(flatten)], so `warm` and `list` always accept the
// same sources and filters.
// =============================================================================

use clap::{ArgAction, Args, Parser, Subcommand};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "cache-warmer",
    version,
    about = "Warm HTTP caches by requesting every URL of a site",
    long_about = "cache-warmer requests a list of URLs, or every page listed in a sitemap, \
                  with a bounded number of requests in flight. Run it after a deploy so \
                  visitors never hit a cold cache."
)]
pub struct Cli {
    /// Increase log output on stderr (-v info, -vv debug)
    ///
    /// RUST_LOG, when set, takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request every queued URL and report the outcome of each
    ///
    /// Example: cache-warmer warm --sitemap https://example.com/sitemap.xml --concurrency 10
    Warm {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        http: HttpArgs,

        /// Maximum number of requests in flight at once
        #[arg(short, long, default_value_t = 25)]
        concurrency: usize,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the URLs that would be warmed, without requesting them
    ///
    /// Example: cache-warmer list --sitemap https://example.com/sitemap.xml --ignore-regex '/\.pdf$/'
    List {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        http: HttpArgs,

        /// Output the URLs as a JSON array
        #[arg(long)]
        json: bool,
    },
}

/// Where URLs come from and which ones to leave out.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// URLs to queue directly
    pub urls: Vec<String>,

    /// Sitemap (or sitemap index) to read URLs from; repeatable
    #[arg(long = "sitemap", value_name = "URL")]
    pub sitemaps: Vec<String>,

    /// How many levels of nested sitemap indexes to follow
    #[arg(long, default_value_t = 8, value_name = "LEVELS")]
    pub sitemap_depth: usize,

    /// Exact URL to skip (trailing slashes are ignored); repeatable
    #[arg(long = "ignore", value_name = "URL")]
    pub ignore: Vec<String>,

    /// Delimited regex of URLs to skip, e.g. '/\.pdf$/' or '#/admin/#i'; repeatable
    #[arg(long = "ignore-regex", value_name = "PATTERN")]
    pub ignore_regex: Vec<String>,
}

/// HTTP client settings, used for sitemaps and for warming.
#[derive(Args, Debug)]
pub struct HttpArgs {
    /// Per-request timeout in seconds, body included
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    pub connect_timeout: u64,

    /// Maximum number of redirects to follow
    #[arg(long, default_value_t = 10)]
    pub max_redirects: usize,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Extra header as "Name: value"; repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}
