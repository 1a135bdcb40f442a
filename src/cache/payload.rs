//! Typed payloads stored in the response cache
//!
//! On disk every entry is an untyped JSON value. `CachePayload` names the four
//! shapes the application stores and converts each one to and from JSON.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::data::{NearbyPlaces, SiteRecord, StateDirectory};

/// The kind of value stored under a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    StateDirectory,
    SiteList,
    Site,
    NearbyPlaces,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::StateDirectory => "state directory",
            PayloadKind::SiteList => "site list",
            PayloadKind::Site => "site record",
            PayloadKind::NearbyPlaces => "nearby places",
        };
        f.write_str(name)
    }
}

/// Errors converting between payloads and their JSON form
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A cached value does not have the shape expected for its kind
    #[error("cached {kind} has an unexpected shape: {source}")]
    Shape {
        kind: PayloadKind,
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be converted to JSON
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: PayloadKind,
        #[source]
        source: serde_json::Error,
    },
}

/// A value the application keeps in the response cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachePayload {
    /// State name to state page URL, stored under a fixed key
    StateDirectory(StateDirectory),
    /// All sites of one state, keyed by the state page URL
    SiteList(Vec<SiteRecord>),
    /// One site, keyed by the site page URL
    Site(SiteRecord),
    /// Places API response, keyed by site name
    NearbyPlaces(NearbyPlaces),
}

impl CachePayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            CachePayload::StateDirectory(_) => PayloadKind::StateDirectory,
            CachePayload::SiteList(_) => PayloadKind::SiteList,
            CachePayload::Site(_) => PayloadKind::Site,
            CachePayload::NearbyPlaces(_) => PayloadKind::NearbyPlaces,
        }
    }

    /// Converts the payload to the JSON value written to disk
    ///
    /// Site records become plain field objects and places responses are
    /// passed through untouched.
    pub fn encode(&self) -> Result<Value, PayloadError> {
        let encoded = match self {
            CachePayload::StateDirectory(directory) => serde_json::to_value(directory),
            CachePayload::SiteList(sites) => serde_json::to_value(sites),
            CachePayload::Site(site) => serde_json::to_value(site),
            CachePayload::NearbyPlaces(places) => return Ok(places.0.clone()),
        };

        encoded.map_err(|source| PayloadError::Encode {
            kind: self.kind(),
            source,
        })
    }

    /// Rebuilds a payload of the given kind from a cached JSON value
    ///
    /// Site fields missing from the value are filled with the blank
    /// placeholder. Any JSON value is accepted as a places response.
    pub fn decode(kind: PayloadKind, value: &Value) -> Result<Self, PayloadError> {
        let shape = |source: serde_json::Error| PayloadError::Shape { kind, source };

        match kind {
            PayloadKind::StateDirectory => serde_json::from_value(value.clone())
                .map(CachePayload::StateDirectory)
                .map_err(shape),
            PayloadKind::SiteList => serde_json::from_value(value.clone())
                .map(CachePayload::SiteList)
                .map_err(shape),
            PayloadKind::Site => serde_json::from_value(value.clone())
                .map(CachePayload::Site)
                .map_err(shape),
            PayloadKind::NearbyPlaces => Ok(CachePayload::NearbyPlaces(NearbyPlaces(value.clone()))),
        }
    }
}

/// A type stored in the cache as one particular [`CachePayload`] variant
pub trait Cacheable: Sized {
    const KIND: PayloadKind;

    fn into_payload(self) -> CachePayload;

    fn from_payload(payload: CachePayload) -> Option<Self>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            const KIND: PayloadKind = PayloadKind::$variant;

            fn into_payload(self) -> CachePayload {
                CachePayload::$variant(self)
            }

            fn from_payload(payload: CachePayload) -> Option<Self> {
                match payload {
                    CachePayload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(StateDirectory, StateDirectory);
cacheable!(Vec<SiteRecord>, SiteList);
cacheable!(SiteRecord, Site);
cacheable!(NearbyPlaces, NearbyPlaces);
