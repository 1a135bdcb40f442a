//! Cache-backed lookups
//!
//! Every network fetch goes through the same policy: check the cache by key,
//! return the cached value on a hit, otherwise fetch, store the result and
//! return it. The sources are traits so the session can run against fakes.

use std::future::Future;

use thiserror::Error;

use crate::cache::{CacheError, Cacheable, ResponseCache, STATE_DIRECTORY_KEY};
use crate::data::{
    NearbyPlaces, NpsClient, NpsError, PlacesClient, PlacesError, SiteRecord, StateDirectory,
};

/// Errors that can occur during a lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// Scraping nps.gov failed
    #[error(transparent)]
    Nps(#[from] NpsError),

    /// The places API request failed
    #[error(transparent)]
    Places(#[from] PlacesError),

    /// The fetched value could not be stored
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Where state directories, state listings and site pages come from
#[allow(async_fn_in_trait)]
pub trait SiteSource {
    async fn fetch_state_directory(&self) -> Result<StateDirectory, NpsError>;

    async fn fetch_site_links(&self, state_url: &str) -> Result<Vec<String>, NpsError>;

    async fn fetch_site(&self, site_url: &str) -> Result<SiteRecord, NpsError>;
}

/// Where nearby-places responses come from
#[allow(async_fn_in_trait)]
pub trait PlacesSource {
    async fn fetch_nearby(&self, site: &SiteRecord) -> Result<NearbyPlaces, PlacesError>;
}

impl SiteSource for NpsClient {
    async fn fetch_state_directory(&self) -> Result<StateDirectory, NpsError> {
        NpsClient::fetch_state_directory(self).await
    }

    async fn fetch_site_links(&self, state_url: &str) -> Result<Vec<String>, NpsError> {
        NpsClient::fetch_site_links(self, state_url).await
    }

    async fn fetch_site(&self, site_url: &str) -> Result<SiteRecord, NpsError> {
        NpsClient::fetch_site(self, site_url).await
    }
}

impl PlacesSource for PlacesClient {
    async fn fetch_nearby(&self, site: &SiteRecord) -> Result<NearbyPlaces, PlacesError> {
        PlacesClient::fetch_nearby(self, site).await
    }
}

async fn cached_or_fetch<T, F, Fut, E>(
    cache: &mut ResponseCache,
    key: &str,
    fetch: F,
) -> Result<T, LookupError>
where
    T: Cacheable + Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    LookupError: From<E>,
{
    if let Some(value) = cache.get_typed::<T>(key) {
        tracing::info!(key, "using cache");
        return Ok(value);
    }

    tracing::info!(key, "fetching");
    let value = fetch().await?;
    cache.put_typed(key, &value)?;
    Ok(value)
}

/// Returns the state name to state page mapping
pub async fn state_directory<S: SiteSource>(
    cache: &mut ResponseCache,
    source: &S,
) -> Result<StateDirectory, LookupError> {
    cached_or_fetch(cache, STATE_DIRECTORY_KEY, || source.fetch_state_directory()).await
}

/// Returns the record for one site page, keyed by its URL
pub async fn site<S: SiteSource>(
    cache: &mut ResponseCache,
    source: &S,
    site_url: &str,
) -> Result<SiteRecord, LookupError> {
    cached_or_fetch(cache, site_url, || source.fetch_site(site_url)).await
}

/// Returns every site listed on a state page, keyed by the state page URL
///
/// On a miss each site is resolved through [`site`], so individual site
/// pages are cached as well as the whole listing.
pub async fn sites_for_state<S: SiteSource>(
    cache: &mut ResponseCache,
    source: &S,
    state_url: &str,
) -> Result<Vec<SiteRecord>, LookupError> {
    if let Some(sites) = cache.get_typed::<Vec<SiteRecord>>(state_url) {
        tracing::info!(key = state_url, sites = sites.len(), "using cache");
        return Ok(sites);
    }

    tracing::info!(key = state_url, "fetching");
    let links = source.fetch_site_links(state_url).await?;

    let mut sites = Vec::with_capacity(links.len());
    for link in &links {
        sites.push(site(cache, source, link).await?);
    }

    cache.put_typed(state_url, &sites)?;
    Ok(sites)
}

/// Returns the places near a site, keyed by the site's name
pub async fn nearby_places<P: PlacesSource>(
    cache: &mut ResponseCache,
    places: &P,
    site: &SiteRecord,
) -> Result<NearbyPlaces, LookupError> {
    cached_or_fetch(cache, &site.name, || places.fetch_nearby(site)).await
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-memory sources that count how often they are asked to fetch

    use std::cell::Cell;
    use std::collections::BTreeMap;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    #[derive(Debug, Default)]
    pub struct FakeSites {
        pub directory: StateDirectory,
        pub links: BTreeMap<String, Vec<String>>,
        pub sites: BTreeMap<String, SiteRecord>,
        pub directory_fetches: Cell<usize>,
        pub link_fetches: Cell<usize>,
        pub site_fetches: Cell<usize>,
    }

    impl FakeSites {
        /// A directory with one state whose page lists `count` sites
        pub fn with_state(state: &str, state_url: &str, count: usize) -> Self {
            let mut fake = FakeSites::default();
            fake.directory
                .0
                .insert(state.to_lowercase(), state_url.to_string());

            let mut links = Vec::new();
            for n in 1..=count {
                let url = format!("https://example.org/site/{}", n);
                fake.sites.insert(
                    url.clone(),
                    SiteRecord {
                        category: "National Park".to_string(),
                        name: format!("Site {}", n),
                        address: "Houghton, MI".to_string(),
                        zipcode: format!("4993{}", n),
                        phone: "555-0100".to_string(),
                    },
                );
                links.push(url);
            }
            fake.links.insert(state_url.to_string(), links);
            fake
        }

        pub fn total_fetches(&self) -> usize {
            self.directory_fetches.get() + self.link_fetches.get() + self.site_fetches.get()
        }
    }

    impl SiteSource for FakeSites {
        async fn fetch_state_directory(&self) -> Result<StateDirectory, NpsError> {
            self.directory_fetches.set(self.directory_fetches.get() + 1);
            Ok(self.directory.clone())
        }

        async fn fetch_site_links(&self, state_url: &str) -> Result<Vec<String>, NpsError> {
            self.link_fetches.set(self.link_fetches.get() + 1);
            Ok(self.links.get(state_url).cloned().unwrap_or_default())
        }

        async fn fetch_site(&self, site_url: &str) -> Result<SiteRecord, NpsError> {
            self.site_fetches.set(self.site_fetches.get() + 1);
            Ok(self.sites.get(site_url).cloned().unwrap_or_default())
        }
    }

    /// HTTP client for talking to [`serve_once`], bypassing any proxy settings
    pub fn local_client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to build HTTP client")
    }

    /// Serves a single JSON response on a local port
    ///
    /// Returns the endpoint URL and a handle resolving to the request head
    /// (request line and headers) that the server received.
    pub async fn serve_once(status: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind local listener");
        let addr = listener.local_addr().expect("listener has an address");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("Failed to accept");
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.expect("Failed to read request");
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("Failed to write response");
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{}/search/v2/radius", addr), handle)
    }

    #[derive(Debug, Default)]
    pub struct FakePlaces {
        pub fetches: Cell<usize>,
        pub requested: std::cell::RefCell<Vec<String>>,
    }

    impl PlacesSource for FakePlaces {
        async fn fetch_nearby(&self, site: &SiteRecord) -> Result<NearbyPlaces, PlacesError> {
            self.fetches.set(self.fetches.get() + 1);
            self.requested.borrow_mut().push(site.name.clone());
            Ok(NearbyPlaces(json!({
                "searchResults": [{
                    "name": format!("Diner near {}", site.name),
                    "fields": {
                        "group_sic_code_name": "Eating Places",
                        "address": "1 Main St",
                        "city": "Houghton"
                    }
                }]
            })))
        }
    }
}
