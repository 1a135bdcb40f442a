//! Core data models for npsites
//!
//! This module contains the records scraped from nps.gov, the state directory,
//! and the nearby-places response returned by the MapQuest search API.

pub mod nps;
pub mod oauth;
pub mod places;

pub use nps::{NpsClient, NpsError};
pub use places::{PlacesClient, PlacesError};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder stored in any site field that could not be extracted
pub const BLANK: &str = "BLANK";

/// Category shown for a nearby place with no classification
pub const NO_CATEGORY: &str = "no category";

/// Address shown for a nearby place with no classification
pub const NO_ADDRESS: &str = "no address, no city";

fn blank() -> String {
    BLANK.to_string()
}

/// A single national park service unit
///
/// Every field falls back to [`BLANK`] when it is missing, both when scraping
/// a page and when rebuilding a record from the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Designation of the site (e.g. "National Park"), blank for some sites
    #[serde(default = "blank")]
    pub category: String,
    /// Name of the site (e.g. "Isle Royale")
    #[serde(default = "blank")]
    pub name: String,
    /// City and state (e.g. "Houghton, MI")
    #[serde(default = "blank")]
    pub address: String,
    /// Zip code (e.g. "49931" or "82190-0168")
    #[serde(default = "blank")]
    pub zipcode: String,
    /// Phone number (e.g. "(906) 482-0984")
    #[serde(default = "blank")]
    pub phone: String,
}

impl Default for SiteRecord {
    fn default() -> Self {
        Self {
            category: blank(),
            name: blank(),
            address: blank(),
            zipcode: blank(),
            phone: blank(),
        }
    }
}

impl SiteRecord {
    /// One-line summary used in state listings
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name, self.category, self.address, self.zipcode
        )
    }
}

/// Mapping from lower-cased state name to that state's listing page URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDirectory(pub BTreeMap<String, String>);

impl StateDirectory {
    /// Looks up a state by name, ignoring case and surrounding whitespace
    pub fn url_for(&self, state_name: &str) -> Option<&str> {
        self.0
            .get(&state_name.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw response document from the places search API
///
/// Kept as an untyped JSON value so the cache stores exactly what the API
/// returned; [`NearbyPlaces::places`] derives the fields shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NearbyPlaces(pub Value);

/// A point of interest near a site, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyPlace {
    pub name: String,
    pub category: String,
    pub address: String,
}

impl NearbyPlaces {
    /// Extracts the displayable places from the `searchResults` array
    ///
    /// A response without `searchResults` (e.g. an API error document)
    /// yields no places.
    pub fn places(&self) -> Vec<NearbyPlace> {
        self.0
            .get("searchResults")
            .and_then(Value::as_array)
            .map(|results| results.iter().map(NearbyPlace::from_result).collect())
            .unwrap_or_default()
    }
}

impl NearbyPlace {
    fn from_result(result: &Value) -> Self {
        let text = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let fields = result.get("fields");
        let field = |name: &str| text(fields.and_then(|f| f.get(name)));

        let name = text(result.get("name"));
        let category = field("group_sic_code_name");

        if category.is_empty() {
            Self {
                name,
                category: NO_CATEGORY.to_string(),
                address: NO_ADDRESS.to_string(),
            }
        } else {
            Self {
                name,
                category,
                address: format!("{}, {}", field("address"), field("city")),
            }
        }
    }

    /// One-line summary used in nearby-places listings
    pub fn info(&self) -> String {
        format!("- {} ({}): {}", self.name, self.category, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn isle_royale() -> SiteRecord {
        SiteRecord {
            category: "National Park".to_string(),
            name: "Isle Royale".to_string(),
            address: "Houghton, MI".to_string(),
            zipcode: "49931".to_string(),
            phone: "(906) 482-0984".to_string(),
        }
    }

    #[test]
    fn test_site_info_format() {
        assert_eq!(
            isle_royale().info(),
            "Isle Royale (National Park): Houghton, MI 49931"
        );
    }

    #[test]
    fn test_default_site_is_all_blank() {
        let site = SiteRecord::default();
        assert_eq!(site.category, BLANK);
        assert_eq!(site.name, BLANK);
        assert_eq!(site.address, BLANK);
        assert_eq!(site.zipcode, BLANK);
        assert_eq!(site.phone, BLANK);
    }

    #[test]
    fn test_site_missing_fields_deserialize_as_blank() {
        let site: SiteRecord =
            serde_json::from_value(json!({"name": "Pictured Rocks", "zipcode": "49862"}))
                .expect("partial record should deserialize");

        assert_eq!(site.name, "Pictured Rocks");
        assert_eq!(site.zipcode, "49862");
        assert_eq!(site.category, BLANK);
        assert_eq!(site.address, BLANK);
        assert_eq!(site.phone, BLANK);
    }

    #[test]
    fn test_site_serializes_as_plain_fields() {
        let value = serde_json::to_value(isle_royale()).unwrap();
        assert_eq!(
            value,
            json!({
                "category": "National Park",
                "name": "Isle Royale",
                "address": "Houghton, MI",
                "zipcode": "49931",
                "phone": "(906) 482-0984"
            })
        );
    }

    #[test]
    fn test_state_directory_lookup_ignores_case() {
        let mut map = BTreeMap::new();
        map.insert(
            "michigan".to_string(),
            "https://www.nps.gov/state/mi/index.htm".to_string(),
        );
        let directory = StateDirectory(map);

        assert_eq!(
            directory.url_for("Michigan"),
            Some("https://www.nps.gov/state/mi/index.htm")
        );
        assert_eq!(
            directory.url_for("  MICHIGAN \n"),
            Some("https://www.nps.gov/state/mi/index.htm")
        );
        assert_eq!(directory.url_for("michigana"), None);
    }

    #[test]
    fn test_nearby_places_with_category() {
        let response = NearbyPlaces(json!({
            "searchResults": [{
                "name": "Keweenaw Brewing",
                "fields": {
                    "group_sic_code_name": "Eating Places",
                    "address": "408 Shelden Ave",
                    "city": "Houghton"
                }
            }]
        }));

        let places = response.places();
        assert_eq!(places.len(), 1);
        assert_eq!(
            places[0].info(),
            "- Keweenaw Brewing (Eating Places): 408 Shelden Ave, Houghton"
        );
    }

    #[test]
    fn test_nearby_places_empty_category_uses_placeholders() {
        let response = NearbyPlaces(json!({
            "searchResults": [{
                "name": "Unnamed Spot",
                "fields": {
                    "group_sic_code_name": "",
                    "address": "1 Main St",
                    "city": "Houghton"
                }
            }]
        }));

        let places = response.places();
        assert_eq!(places[0].category, NO_CATEGORY);
        assert_eq!(places[0].address, NO_ADDRESS);
    }

    #[test]
    fn test_nearby_places_missing_fields_object() {
        let response = NearbyPlaces(json!({"searchResults": [{"name": "Lonely"}]}));
        let places = response.places();
        assert_eq!(places[0].name, "Lonely");
        assert_eq!(places[0].category, NO_CATEGORY);
    }

    #[test]
    fn test_nearby_places_without_results_is_empty() {
        let response = NearbyPlaces(json!({
            "info": {"statuscode": 401, "messages": ["The AppKey submitted with this request is invalid."]}
        }));
        assert!(response.places().is_empty());
    }
}
