//! npsites - Browse US national park sites by state
//!
//! A line-based CLI that lists the national park sites of a state, scraped
//! from nps.gov, and shows places near a chosen site using the MapQuest
//! search API. Every fetch is cached in a local JSON file.

use std::io::{self, IsTerminal};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use npsites::cache::ResponseCache;
use npsites::cli::{Cli, StartupConfig};
use npsites::data::{NpsClient, PlacesClient};
use npsites::session::Session;

/// Sets up logging to stderr so prompts and listings on stdout stay clean.
/// Defaults to `info`, which reports cache hits and fetches; override with `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    init_logging();

    if config.api_key.is_none() {
        tracing::warn!("no MapQuest API key configured; nearby places are only available from the cache");
    }

    let mut cache = ResponseCache::load(&config.cache_file);
    let nps = NpsClient::new()?;
    let places = PlacesClient::new(config.api_key.clone(), config.api_secret.clone())
        .with_radius(config.radius)
        .with_max_matches(config.max_matches);

    let stdin = io::stdin();
    let result = Session::new(&mut cache, &nps, &places)
        .run(stdin.lock(), io::stdout())
        .await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}
