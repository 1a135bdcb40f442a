//! Text rendering for npsites
//!
//! Listings are written as plain lines to any `Write` so the session can be
//! driven against an in-memory buffer in tests.

use std::io::{self, Write};

use crate::data::{NearbyPlaces, SiteRecord};

/// Horizontal rule printed around listing headers
pub const RULE: &str = "-----------------------------------";

/// Renders the numbered list of sites in a state
///
/// Numbers start at 1 and match the selection the user types next.
pub fn render_site_list<W: Write>(
    out: &mut W,
    state_name: &str,
    sites: &[SiteRecord],
) -> io::Result<()> {
    writeln!(out, "List of national sites in {}", state_name)?;
    writeln!(out, "{}", RULE)?;
    for (i, site) in sites.iter().enumerate() {
        writeln!(out, "[{}] {}", i + 1, site.info())?;
    }
    Ok(())
}

/// Renders the places found near a site
pub fn render_nearby_places<W: Write>(
    out: &mut W,
    site: &SiteRecord,
    nearby: &NearbyPlaces,
) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "places near {}", site.name)?;
    writeln!(out, "{}", RULE)?;

    let places = nearby.places();
    if places.is_empty() {
        writeln!(out, "(no places found)")?;
    }
    for place in places {
        writeln!(out, "{}", place.info())?;
    }
    Ok(())
}
