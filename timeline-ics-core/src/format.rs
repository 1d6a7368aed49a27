//! Display formatting for distances and coordinates.

use std::fmt;

use crate::timeline::Location;

/// The one zone whose entries are shown in imperial units.
pub const MILES_ZONE: &str = "Europe/London";

const METERS_PER_MILE: f64 = 1609.344;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Kilometers,
    Miles,
}

impl DistanceUnit {
    /// Miles for `Europe/London`, kilometers for everything else,
    /// including an unresolved zone.
    pub fn for_zone(zone: Option<&str>) -> Self {
        match zone {
            Some(MILES_ZONE) => DistanceUnit::Miles,
            _ => DistanceUnit::Kilometers,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Miles => meters / METERS_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// e.g. `1.5 km` or `0.9 mi`
pub fn format_distance(meters: f64, zone: Option<&str>) -> String {
    let unit = DistanceUnit::for_zone(zone);
    format!("{:.1} {}", unit.from_meters(meters), unit)
}

/// `lat,lng` with six decimals.
pub fn format_coordinates(location: &Location) -> String {
    format!("{:.6},{:.6}", location.latitude, location.longitude)
}
