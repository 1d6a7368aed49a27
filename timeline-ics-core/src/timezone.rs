//! Coordinate to IANA time zone resolution.
//!
//! The index is built once from a GeoJSON feature collection in the
//! timezone-boundary-builder layout (`properties.tzid` plus `Polygon` or
//! `MultiPolygon` geometry) and is read-only afterwards, so it can be
//! shared between concurrent exports behind an `Arc`.

use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{TimelineError, TimelineResult};

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct FeatureProperties {
    tzid: String,
}

/// GeoJSON positions are `[lng, lat]` with an optional altitude.
type Ring = Vec<Vec<f64>>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl BoundingBox {
    fn of(ring: &[(f64, f64)]) -> Self {
        ring.iter().fold(
            BoundingBox {
                min_lng: f64::INFINITY,
                min_lat: f64::INFINITY,
                max_lng: f64::NEG_INFINITY,
                max_lat: f64::NEG_INFINITY,
            },
            |b, &(lng, lat)| BoundingBox {
                min_lng: b.min_lng.min(lng),
                min_lat: b.min_lat.min(lat),
                max_lng: b.max_lng.max(lng),
                max_lat: b.max_lat.max(lat),
            },
        )
    }

    fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }
}

#[derive(Debug)]
struct ZonePolygon {
    /// Index into `TimeZoneIndex::zones`
    zone: usize,
    bbox: BoundingBox,
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
}

impl ZonePolygon {
    fn contains(&self, lng: f64, lat: f64) -> bool {
        self.bbox.contains(lng, lat)
            && ring_contains(&self.exterior, lng, lat)
            && !self.holes.iter().any(|hole| ring_contains(hole, lng, lat))
    }
}

/// Polygon index mapping coordinates to zone ids.
#[derive(Debug, Default)]
pub struct TimeZoneIndex {
    zones: Vec<String>,
    polygons: Vec<ZonePolygon>,
}

impl TimeZoneIndex {
    /// Load a GeoJSON zone dataset from disk.
    pub fn load(path: &Path) -> TimelineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TimelineError::TimeZoneData(format!("Could not read {}: {e}", path.display()))
        })?;
        Self::from_geojson(&content)
    }

    pub fn from_geojson(content: &str) -> TimelineResult<Self> {
        let collection: FeatureCollection = serde_json::from_str(content)
            .map_err(|e| TimelineError::TimeZoneData(e.to_string()))?;

        let mut index = TimeZoneIndex::default();

        for feature in collection.features {
            let tzid = feature.properties.tzid;
            if tzid.parse::<Tz>().is_err() {
                warn!(tzid = %tzid, "skipping zone unknown to the tz database");
                continue;
            }

            let polygons = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => vec![coordinates],
                Some(Geometry::MultiPolygon { coordinates }) => coordinates,
                Some(Geometry::Unsupported) | None => {
                    debug!(tzid = %tzid, "zone has no polygon geometry");
                    continue;
                }
            };

            let zone = index.zones.len();
            index.zones.push(tzid);

            for rings in polygons {
                let mut rings = rings.into_iter().map(to_points);
                let Some(exterior) = rings.next().filter(|r| r.len() >= 3) else {
                    continue;
                };
                index.polygons.push(ZonePolygon {
                    zone,
                    bbox: BoundingBox::of(&exterior),
                    exterior,
                    holes: rings.filter(|r| r.len() >= 3).collect(),
                });
            }
        }

        debug!(
            zones = index.zones.len(),
            polygons = index.polygons.len(),
            "time zone index loaded"
        );

        Ok(index)
    }

    /// Zone containing the point, if any.
    ///
    /// Where polygons overlap, the first one in load order wins.
    pub fn resolve(&self, latitude: f64, longitude: f64) -> Option<String> {
        self.polygons
            .iter()
            .find(|p| p.contains(longitude, latitude))
            .map(|p| self.zones[p.zone].clone())
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

fn to_points(ring: Ring) -> Vec<(f64, f64)> {
    ring.into_iter()
        .filter(|position| position.len() >= 2)
        .map(|position| (position[0], position[1]))
        .collect()
}

/// Even-odd ray cast along +lng.
fn ring_contains(ring: &[(f64, f64)], lng: f64, lat: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
