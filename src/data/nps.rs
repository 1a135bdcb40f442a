//! National Park Service website scraper
//!
//! Fetches pages from nps.gov and extracts the state directory, the site
//! links listed on a state page, and the fields of a single site page.

use std::collections::BTreeMap;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use super::{SiteRecord, StateDirectory, BLANK};

/// Base URL of the National Park Service website
pub const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Errors that can occur when scraping nps.gov
#[derive(Debug, Error)]
pub enum NpsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A URL could not be built from the page
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The page is missing an element the listing depends on
    #[error("Page {url} has no element matching '{selector}'")]
    MissingElement { url: String, selector: &'static str },
}

const STATE_MENU: &str = "ul.dropdown-menu.SearchBar-keywordSearch";
const PARK_LIST: &str = "ul#list_parks";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Collects the trimmed text of an element, treating empty text as absent
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn first_text(document: &Html, css: &'static str) -> Option<String> {
    document.select(&selector(css)).next().and_then(element_text)
}

/// Extracts the state name to state page mapping from the nps.gov home page
///
/// Each entry of the state search menu becomes one lower-cased state name
/// whose link is resolved against `base_url`.
pub fn parse_state_directory(html: &str, base_url: &Url) -> Result<StateDirectory, NpsError> {
    let document = Html::parse_document(html);
    let menu = document
        .select(&selector(STATE_MENU))
        .next()
        .ok_or_else(|| NpsError::MissingElement {
            url: base_url.to_string(),
            selector: STATE_MENU,
        })?;

    let link = selector("a[href]");
    let mut states = BTreeMap::new();

    for item in menu.child_elements().filter(|e| e.value().name() == "li") {
        let Some(anchor) = item.select(&link).next() else {
            continue;
        };
        let Some(name) = element_text(item) else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        states.insert(name.to_lowercase(), base_url.join(href)?.to_string());
    }

    Ok(StateDirectory(states))
}

/// Extracts the site page URLs listed on a state page
pub fn parse_site_links(html: &str, page_url: &Url) -> Result<Vec<String>, NpsError> {
    let document = Html::parse_document(html);
    let parks = document
        .select(&selector(PARK_LIST))
        .next()
        .ok_or_else(|| NpsError::MissingElement {
            url: page_url.to_string(),
            selector: PARK_LIST,
        })?;

    let heading_link = selector("h3 a[href]");
    let mut links = Vec::new();

    for item in parks
        .child_elements()
        .filter(|e| e.value().name() == "li" && e.value().classes().any(|c| c == "clearfix"))
    {
        if let Some(href) = item
            .select(&heading_link)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            links.push(page_url.join(href)?.to_string());
        }
    }

    Ok(links)
}

/// Extracts a site record from a site page
///
/// Fields that are missing or empty on the page are set to the blank
/// placeholder; a malformed page never fails the whole record.
pub fn parse_site_page(html: &str) -> SiteRecord {
    let document = Html::parse_document(html);
    let field = |css| first_text(&document, css).unwrap_or_else(|| BLANK.to_string());

    let address = match (
        first_text(&document, "span[itemprop=\"addressLocality\"]"),
        first_text(&document, "span.region[itemprop=\"addressRegion\"]"),
    ) {
        (Some(city), Some(region)) => format!("{}, {}", city, region),
        _ => BLANK.to_string(),
    };

    SiteRecord {
        category: field("span.Hero-designation"),
        name: field("div.Hero-titleContainer a"),
        address,
        zipcode: field("span.postal-code[itemprop=\"postalCode\"]"),
        phone: field("span.tel[itemprop=\"telephone\"]"),
    }
}

/// Client for scraping nps.gov
#[derive(Debug, Clone)]
pub struct NpsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Home page of the site; state and park links are resolved against it
    base_url: Url,
}

impl NpsClient {
    /// Creates a client for the public nps.gov website
    pub fn new() -> Result<Self, NpsError> {
        Self::with_base_url(NPS_BASE_URL)
    }

    /// Creates a client for a different host (e.g. a local mirror)
    pub fn with_base_url(base_url: &str) -> Result<Self, NpsError> {
        Ok(Self {
            http_client: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch_page(&self, url: &str) -> Result<String, NpsError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches the home page and extracts the state directory
    pub async fn fetch_state_directory(&self) -> Result<StateDirectory, NpsError> {
        let html = self.fetch_page(self.base_url.as_str()).await?;
        parse_state_directory(&html, &self.base_url)
    }

    /// Fetches a state page and extracts the links to its sites
    pub async fn fetch_site_links(&self, state_url: &str) -> Result<Vec<String>, NpsError> {
        let page_url = Url::parse(state_url)?;
        let html = self.fetch_page(state_url).await?;
        parse_site_links(&html, &page_url)
    }

    /// Fetches a site page and extracts its record
    pub async fn fetch_site(&self, site_url: &str) -> Result<SiteRecord, NpsError> {
        let html = self.fetch_page(site_url).await?;
        Ok(parse_site_page(&html))
    }
}
