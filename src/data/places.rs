//! MapQuest radius search client
//!
//! Looks up points of interest around a site's zip code. The response is
//! returned untouched so it can be cached verbatim.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::oauth::{self, Credentials};
use super::{NearbyPlaces, SiteRecord};

/// Endpoint of the MapQuest radius search API
pub const MAPQUEST_RADIUS_URL: &str = "https://www.mapquestapi.com/search/v2/radius";

/// Default search radius in miles
pub const DEFAULT_RADIUS: u32 = 10;

/// Default maximum number of places returned
pub const DEFAULT_MAX_MATCHES: u32 = 10;

/// Errors that can occur when querying the places API
#[derive(Debug, Error)]
pub enum PlacesError {
    /// No API key was configured
    #[error("missing API key: set MAPQUEST_API_KEY or pass --api-key")]
    MissingApiKey,

    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-zero status in its `info` block
    #[error("places API returned status {code}: {message}")]
    ApiStatus { code: i64, message: String },
}

/// Client for the MapQuest radius search API
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http_client: Client,
    api_key: Option<String>,
    /// When set, requests also carry an OAuth 1.0 signature
    api_secret: Option<String>,
    radius: u32,
    max_matches: u32,
    base_url: String,
}

impl Default for PlacesClient {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PlacesClient {
    /// Creates a client with the default radius and match limit
    pub fn new(api_key: Option<String>, api_secret: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            api_secret,
            radius: DEFAULT_RADIUS,
            max_matches: DEFAULT_MAX_MATCHES,
            base_url: MAPQUEST_RADIUS_URL.to_string(),
        }
    }

    /// Sets the search radius in miles
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the maximum number of places returned
    pub fn with_max_matches(mut self, max_matches: u32) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Replaces the underlying HTTP client
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Overrides the endpoint (for testing against a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Query parameters for a search centred on `site`
    fn query(&self, api_key: &str, site: &SiteRecord) -> Vec<(&'static str, String)> {
        vec![
            ("key", api_key.to_string()),
            ("origin", site.zipcode.clone()),
            ("radius", self.radius.to_string()),
            ("maxMatches", self.max_matches.to_string()),
            ("ambiguities", "ignore".to_string()),
            ("outFormat", "json".to_string()),
        ]
    }

    /// Fetches the places near a site
    ///
    /// # Returns
    /// * `Ok(NearbyPlaces)` - the raw API response document
    /// * `Err(PlacesError)` - if no key is configured, the request fails, or
    ///   the API reports an error; error responses are never returned as places
    pub async fn fetch_nearby(&self, site: &SiteRecord) -> Result<NearbyPlaces, PlacesError> {
        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let query = self.query(api_key, site);

        let mut request = self.http_client.get(&self.base_url).query(&query);
        if let Some(secret) = &self.api_secret {
            let credentials = Credentials {
                consumer_key: api_key.to_string(),
                consumer_secret: secret.clone(),
            };
            request = request.header(
                AUTHORIZATION,
                oauth::authorization_header("GET", &self.base_url, &query, &credentials),
            );
        }

        let document = request
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        check_status(&document)?;
        Ok(NearbyPlaces(document))
    }
}

/// Rejects documents whose `info.statuscode` is set and non-zero
fn check_status(document: &Value) -> Result<(), PlacesError> {
    let code = document
        .pointer("/info/statuscode")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if code == 0 {
        return Ok(());
    }

    let message = document
        .pointer("/info/messages")
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default();
    Err(PlacesError::ApiStatus { code, message })
}
