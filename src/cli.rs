//! Command-line interface parsing for npsites
//!
//! The program runs without any flags. Every option has a default and can
//! also be set through an environment variable, which is how the places API
//! credentials are normally supplied.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_FILE;
use crate::data::places::{DEFAULT_MAX_MATCHES, DEFAULT_RADIUS};

/// Largest number of matches the radius search accepts
pub const MAX_MATCHES_LIMIT: u32 = 4000;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The search radius must be positive
    #[error("Invalid radius: {0}. The radius must be at least 1 mile")]
    InvalidRadius(u32),

    /// The match limit is outside what the API accepts
    #[error("Invalid max matches: {0}. Must be between 1 and 4000")]
    InvalidMaxMatches(u32),
}

/// npsites - Browse national park sites by state and find places nearby
#[derive(Parser, Debug)]
#[command(name = "npsites")]
#[command(about = "Browse US national park sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// JSON file used to cache every fetched page and API response
    #[arg(long, env = "NPSITES_CACHE_FILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// MapQuest API key used for nearby-places searches
    #[arg(long, env = "MAPQUEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// MapQuest API secret; when set, requests are OAuth 1.0 signed
    #[arg(long, env = "MAPQUEST_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Search radius around a site, in miles
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: u32,

    /// Maximum number of nearby places to return
    #[arg(long, default_value_t = DEFAULT_MAX_MATCHES)]
    pub max_matches: u32,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub cache_file: PathBuf,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub radius: u32,
    pub max_matches: u32,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            api_key: None,
            api_secret: None,
            radius: DEFAULT_RADIUS,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

/// Treats blank credentials the same as missing ones
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.radius == 0 {
            return Err(CliError::InvalidRadius(cli.radius));
        }
        if !(1..=MAX_MATCHES_LIMIT).contains(&cli.max_matches) {
            return Err(CliError::InvalidMaxMatches(cli.max_matches));
        }

        Ok(StartupConfig {
            cache_file: cli.cache_file.clone(),
            api_key: non_empty(&cli.api_key),
            api_secret: non_empty(&cli.api_secret),
            radius: cli.radius,
            max_matches: cli.max_matches,
        })
    }
}
