//! Place detail enrichment.
//!
//! A bare place id from the timeline is turned into a name, address and
//! map link through a [`PlaceLookup`]. Lookups are independent calls: no
//! cache, no shared mutable state. A failed lookup only costs the event
//! its extra detail.

mod google;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_LANGUAGE_KEY;
use crate::error::PlaceDetailsError;

pub use google::GooglePlacesClient;

/// Human-readable details for a place id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    /// (latitude, longitude)
    pub geo: Option<(f64, f64)>,
    /// Category tags, e.g. `cafe`, `point_of_interest`
    pub types: Vec<String>,
    /// Canonical map URL
    pub url: Option<String>,
}

/// The single capability the pipeline needs from a place service.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn lookup(
        &self,
        place_id: &str,
        language: Option<&str>,
    ) -> Result<PlaceDetails, PlaceDetailsError>;
}

/// Request language for a zone: its override, else the `"default"` entry,
/// else none.
pub fn select_language<'a>(
    overrides: &'a HashMap<String, String>,
    zone: Option<&str>,
) -> Option<&'a str> {
    zone.and_then(|zone| {
        overrides.get(zone).or_else(|| {
            overrides
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(zone))
                .map(|(_, language)| language)
        })
    })
    .or_else(|| overrides.get(DEFAULT_LANGUAGE_KEY))
    .map(String::as_str)
}

/// Look up `place_id` unless enrichment is disabled.
///
/// `Ok(None)` means lookup was disabled and no call was made.
pub async fn enrich(
    lookup: &dyn PlaceLookup,
    place_id: &str,
    zone: Option<&str>,
    enabled: bool,
    language_overrides: &HashMap<String, String>,
) -> Result<Option<PlaceDetails>, PlaceDetailsError> {
    if !enabled {
        return Ok(None);
    }

    let language = select_language(language_overrides, zone);
    debug!(place_id, ?language, "looking up place details");

    lookup.lookup(place_id, language).await.map(Some)
}
