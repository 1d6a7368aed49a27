//! Google Places Details API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::{PlaceDetails, PlaceLookup};
use crate::error::{PlaceDetailsError, TimelineError, TimelineResult};

const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DETAILS_FIELDS: &str = "place_id,name,formatted_address,geometry,types,url";

/// Stateless client: every lookup is an independent request.
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<RawPlace>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct RawPlace {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<RawGeometry>,
    #[serde(default)]
    types: Vec<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct RawGeometry {
    location: RawLatLng,
}

#[derive(Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

impl GooglePlacesClient {
    pub fn new(api_key: &str, timeout: Duration) -> TimelineResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("timeline-ics/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TimelineError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(GooglePlacesClient {
            http,
            api_key: api_key.to_string(),
            endpoint: DETAILS_URL.to_string(),
        })
    }

    /// Point the client at a different details endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn details_url(&self, place_id: &str, language: Option<&str>) -> Result<Url, PlaceDetailsError> {
        let mut params = vec![
            ("place_id", place_id),
            ("fields", DETAILS_FIELDS),
            ("key", self.api_key.as_str()),
        ];
        if let Some(language) = language {
            params.push(("language", language));
        }

        Url::parse_with_params(&self.endpoint, &params).map_err(|e| PlaceDetailsError::Api {
            place_id: place_id.to_string(),
            message: format!("invalid endpoint: {e}"),
        })
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn lookup(
        &self,
        place_id: &str,
        language: Option<&str>,
    ) -> Result<PlaceDetails, PlaceDetailsError> {
        let api_error = |message: String| PlaceDetailsError::Api {
            place_id: place_id.to_string(),
            message,
        };

        let url = self.details_url(place_id, language)?;

        // The URL carries the API key; keep it out of error messages

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| api_error(format!("request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            return Err(api_error(format!("HTTP {}", response.status())));
        }

        let body: DetailsResponse = response
            .json()
            .await
            .map_err(|e| api_error(format!("unreadable response: {}", e.without_url())))?;

        match body.status.as_str() {
            "OK" => body
                .result
                .map(|place| into_details(place_id, place))
                .ok_or_else(|| PlaceDetailsError::NotFound(place_id.to_string())),
            "NOT_FOUND" | "ZERO_RESULTS" => Err(PlaceDetailsError::NotFound(place_id.to_string())),
            status => {
                let message = match body.error_message {
                    Some(detail) => format!("{status}: {detail}"),
                    None => status.to_string(),
                };
                warn!(place_id, status, "places API rejected request");
                Err(api_error(message))
            }
        }
    }
}

fn into_details(requested_id: &str, place: RawPlace) -> PlaceDetails {
    let place_id = place.place_id.unwrap_or_else(|| requested_id.to_string());
    let name = place
        .name
        .or_else(|| place.formatted_address.clone())
        .unwrap_or_else(|| place_id.clone());

    PlaceDetails {
        place_id,
        name,
        formatted_address: place.formatted_address,
        geo: place.geometry.map(|g| (g.location.lat, g.location.lng)),
        types: place.types,
        url: place.url,
    }
}
