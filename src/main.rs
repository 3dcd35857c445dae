// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays clean for --json)
// 3. Build the queue from URLs, sitemaps and ignore rules
// 4. Warm it (or just list it) and print the results
// 5. Exit with proper code (0 = all warmed, 1 = some failed, 2 = error)
// =============================================================================

mod cli;
mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cache_warmer::{SitemapOptions, TransportOptions, Warmer, WarmerConfig};
use clap::Parser;
use cli::{Cli, Commands, HttpArgs, SourceArgs};
use report::ReportObserver;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info,hyper=warn,reqwest=warn",
        _ => "debug,hyper=info,reqwest=info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// Returns:
//   Ok(0) = every URL was warmed
//   Ok(1) = at least one request failed
//   Err = configuration, pattern or sitemap error
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Warm {
            source,
            http,
            concurrency,
            json,
        } => handle_warm(&source, &http, concurrency, json).await,
        Commands::List { source, http, json } => handle_list(&source, &http, json).await,
    }
}

async fn handle_warm(source: &SourceArgs, http: &HttpArgs, concurrency: usize, json: bool) -> Result<i32> {
    let report = Arc::new(ReportObserver::default());
    let config = WarmerConfig {
        concurrency,
        transport: transport_options(http)?,
    };
    let mut warmer = Warmer::new(config)?.with_observer(report.clone());

    fill_queue(&mut warmer, source).await?;

    if warmer.size() == 0 {
        if json {
            report::print_results(&[], true)?;
        } else {
            println!("⚠️  Nothing to warm");
        }
        return Ok(0);
    }

    if !json {
        println!(
            "🔥 Warming {} URL(s), up to {} at a time...\n",
            warmer.size(),
            concurrency
        );
    }

    warmer.warm().await;

    let records = report.take();
    report::print_results(&records, json)?;

    let failed = records.iter().filter(|r| !r.is_ok()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

async fn handle_list(source: &SourceArgs, http: &HttpArgs, json: bool) -> Result<i32> {
    let config = WarmerConfig {
        transport: transport_options(http)?,
        ..WarmerConfig::default()
    };
    let mut warmer = Warmer::new(config)?;

    fill_queue(&mut warmer, source).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(warmer.urls())?);
    } else {
        for url in warmer.urls() {
            println!("{}", url);
        }
        eprintln!("📋 {} URL(s) queued", warmer.size());
    }

    Ok(0)
}

// Ignore rules go in first; the final queue would be the same either way,
// but the sitemap log lines then report what was really queued.
async fn fill_queue(warmer: &mut Warmer, source: &SourceArgs) -> Result<()> {
    warmer.ignore_urls(&source.ignore);
    warmer.ignore_regexes(&source.ignore_regex)?;
    warmer.add_urls(&source.urls);

    for sitemap in &source.sitemaps {
        let options = SitemapOptions {
            max_depth: source.sitemap_depth,
            ..SitemapOptions::default()
        };
        warmer
            .parse_sitemap(sitemap, options)
            .await
            .with_context(|| format!("could not read sitemap {}", sitemap))?;
    }

    Ok(())
}

fn transport_options(http: &HttpArgs) -> Result<TransportOptions> {
    let mut options = TransportOptions {
        timeout: Duration::from_secs(http.timeout),
        connect_timeout: Duration::from_secs(http.connect_timeout),
        redirect_limit: http.max_redirects,
        accept_invalid_certs: http.insecure,
        ..TransportOptions::default()
    };

    if let Some(user_agent) = &http.user_agent {
        options.user_agent = user_agent.clone();
    }

    for header in &http.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("invalid header '{}', expected \"Name: value\"", header);
        };
        options
            .headers
            .push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_args(headers: &[&str]) -> HttpArgs {
        HttpArgs {
            timeout: 5,
            connect_timeout: 2,
            max_redirects: 3,
            user_agent: Some("warmer-test".to_string()),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            insecure: false,
        }
    }

    #[test]
    fn test_transport_options_from_args() {
        let options = transport_options(&http_args(&["X-Warmup: 1", "Cookie:a=b"])).unwrap();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.redirect_limit, 3);
        assert_eq!(options.user_agent, "warmer-test");
        assert_eq!(
            options.headers,
            vec![
                ("X-Warmup".to_string(), "1".to_string()),
                ("Cookie".to_string(), "a=b".to_string())
            ]
        );
    }

    #[test]
    fn test_header_without_colon_is_rejected() {
        assert!(transport_options(&http_args(&["nonsense"])).is_err());
    }
}
