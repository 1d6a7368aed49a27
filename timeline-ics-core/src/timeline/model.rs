//! Typed timeline entries.
//!
//! A timeline is an ordered list of [`TimelineEntry`] values: either a
//! movement between two places or a stay at one place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::timestamp::RawTimestamp;

/// A point on the map, optionally tied to a stable place identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
            place_id: None,
        }
    }

    /// Build a location from the E7 fixed-point integers used in exports.
    pub fn from_e7(latitude_e7: i64, longitude_e7: i64) -> Self {
        Self::new(latitude_e7 as f64 / 1e7, longitude_e7 as f64 / 1e7)
    }
}

/// Transport mode of an activity segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Boating,
    Cycling,
    Flying,
    Hiking,
    HorsebackRiding,
    InBus,
    InCablecar,
    InFerry,
    InFunicular,
    InGondolaLift,
    InPassengerVehicle,
    InSubway,
    InTaxi,
    InTrain,
    InTram,
    InVehicle,
    InWheelchair,
    Kayaking,
    Motorcycling,
    Rowing,
    Running,
    Sailing,
    Skating,
    Skiing,
    Snowboarding,
    Still,
    Surfing,
    Swimming,
    Walking,
    WalkingNordic,
    Unknown,
}

/// (variant, export label, human label)
const ACTIVITY_TYPES: &[(ActivityType, &str, &str)] = &[
    (ActivityType::Boating, "BOATING", "Boating"),
    (ActivityType::Cycling, "CYCLING", "Cycling"),
    (ActivityType::Flying, "FLYING", "Flying"),
    (ActivityType::Hiking, "HIKING", "Hiking"),
    (ActivityType::HorsebackRiding, "HORSEBACK_RIDING", "Horseback riding"),
    (ActivityType::InBus, "IN_BUS", "Bus"),
    (ActivityType::InCablecar, "IN_CABLECAR", "Cable car"),
    (ActivityType::InFerry, "IN_FERRY", "Ferry"),
    (ActivityType::InFunicular, "IN_FUNICULAR", "Funicular"),
    (ActivityType::InGondolaLift, "IN_GONDOLA_LIFT", "Gondola lift"),
    (ActivityType::InPassengerVehicle, "IN_PASSENGER_VEHICLE", "Driving"),
    (ActivityType::InSubway, "IN_SUBWAY", "Subway"),
    (ActivityType::InTaxi, "IN_TAXI", "Taxi"),
    (ActivityType::InTrain, "IN_TRAIN", "Train"),
    (ActivityType::InTram, "IN_TRAM", "Tram"),
    (ActivityType::InVehicle, "IN_VEHICLE", "Vehicle"),
    (ActivityType::InWheelchair, "IN_WHEELCHAIR", "Wheelchair"),
    (ActivityType::Kayaking, "KAYAKING", "Kayaking"),
    (ActivityType::Motorcycling, "MOTORCYCLING", "Motorcycling"),
    (ActivityType::Rowing, "ROWING", "Rowing"),
    (ActivityType::Running, "RUNNING", "Running"),
    (ActivityType::Sailing, "SAILING", "Sailing"),
    (ActivityType::Skating, "SKATING", "Skating"),
    (ActivityType::Skiing, "SKIING", "Skiing"),
    (ActivityType::Snowboarding, "SNOWBOARDING", "Snowboarding"),
    (ActivityType::Still, "STILL", "Stationary"),
    (ActivityType::Surfing, "SURFING", "Surfing"),
    (ActivityType::Swimming, "SWIMMING", "Swimming"),
    (ActivityType::Walking, "WALKING", "Walking"),
    (ActivityType::WalkingNordic, "WALKING_NORDIC", "Nordic walking"),
    (ActivityType::Unknown, "UNKNOWN_ACTIVITY_TYPE", "Travel"),
];

impl ActivityType {
    /// Resolve a raw export label. Unrecognized labels become `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        ACTIVITY_TYPES
            .iter()
            .find(|(_, name, _)| *name == raw)
            .map(|(t, _, _)| *t)
            .unwrap_or(ActivityType::Unknown)
    }

    /// Strict variant of [`ActivityType::from_raw`], used for config values.
    pub fn parse_known(raw: &str) -> Option<Self> {
        ACTIVITY_TYPES
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(raw))
            .map(|(t, _, _)| *t)
    }

    fn row(&self) -> &'static (ActivityType, &'static str, &'static str) {
        ACTIVITY_TYPES
            .iter()
            .find(|(t, _, _)| t == self)
            .unwrap_or(&ACTIVITY_TYPES[ACTIVITY_TYPES.len() - 1])
    }

    /// Export label, e.g. `IN_PASSENGER_VEHICLE`.
    pub fn as_str(&self) -> &'static str {
        self.row().1
    }

    /// Human label, e.g. `Driving`.
    pub fn label(&self) -> &'static str {
        self.row().2
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ActivityType::parse_known(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown activity type '{raw}'")))
    }
}

/// One candidate classification of a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub activity_type: ActivityType,
    pub raw_label: String,
    /// Confidence in percent, when the export provides it
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaypointPath {
    pub distance_meters: Option<f64>,
    /// Place ids of the road segments travelled, in order
    pub road_segments: Vec<String>,
    pub waypoints: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySegment {
    /// Ranked candidate activities
    pub activities: Vec<Activity>,
    pub activity_type: ActivityType,
    pub distance_meters: f64,
    pub start: RawTimestamp,
    pub end: RawTimestamp,
    pub start_location: Location,
    pub end_location: Location,
    pub waypoint_path: Option<WaypointPath>,
    pub last_edited: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

/// A stay at a place. Child visits share this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceVisit {
    pub start: RawTimestamp,
    pub end: RawTimestamp,
    pub location: Location,
    pub child_visits: Vec<ChildVisit>,
    pub last_edited: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

/// Sub-stop within a place visit. Never has children of its own.
pub type ChildVisit = PlaceVisit;

impl PlaceVisit {
    pub fn place_id(&self) -> Option<&str> {
        self.location.place_id.as_deref()
    }

    pub fn with_time_zone(mut self, zone: Option<String>) -> Self {
        self.start = self.start.with_zone(zone.clone());
        self.end = self.end.with_zone(zone.clone());
        self.time_zone = zone;
        self
    }
}

impl ActivitySegment {
    pub fn with_time_zone(mut self, zone: Option<String>) -> Self {
        self.start = self.start.with_zone(zone.clone());
        self.end = self.end.with_zone(zone.clone());
        self.time_zone = zone;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    ActivitySegment,
    PlaceVisit,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::ActivitySegment => "activitySegment",
            EntryKind::PlaceVisit => "placeVisit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry {
    ActivitySegment(ActivitySegment),
    PlaceVisit(PlaceVisit),
}

impl TimelineEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            TimelineEntry::ActivitySegment(_) => EntryKind::ActivitySegment,
            TimelineEntry::PlaceVisit(_) => EntryKind::PlaceVisit,
        }
    }

    pub fn start(&self) -> &RawTimestamp {
        match self {
            TimelineEntry::ActivitySegment(s) => &s.start,
            TimelineEntry::PlaceVisit(v) => &v.start,
        }
    }

    pub fn end(&self) -> &RawTimestamp {
        match self {
            TimelineEntry::ActivitySegment(s) => &s.end,
            TimelineEntry::PlaceVisit(v) => &v.end,
        }
    }

    /// The location used for time zone resolution: where the entry begins.
    pub fn anchor_location(&self) -> &Location {
        match self {
            TimelineEntry::ActivitySegment(s) => &s.start_location,
            TimelineEntry::PlaceVisit(v) => &v.location,
        }
    }

    pub fn time_zone(&self) -> Option<&str> {
        match self {
            TimelineEntry::ActivitySegment(s) => s.time_zone.as_deref(),
            TimelineEntry::PlaceVisit(v) => v.time_zone.as_deref(),
        }
    }

    pub fn with_time_zone(self, zone: Option<String>) -> Self {
        match self {
            TimelineEntry::ActivitySegment(s) => {
                TimelineEntry::ActivitySegment(s.with_time_zone(zone))
            }
            TimelineEntry::PlaceVisit(v) => TimelineEntry::PlaceVisit(v.with_time_zone(zone)),
        }
    }
}
