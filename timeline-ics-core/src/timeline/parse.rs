//! Decoding of Semantic Location History JSON.
//!
//! Only the outer document has to be well formed. Each timeline object is
//! decoded on its own so that one broken record costs one warning, not the
//! whole file.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::model::{
    Activity, ActivitySegment, ActivityType, ChildVisit, Location, PlaceVisit, TimelineEntry,
    WaypointPath,
};
use super::timestamp::{RawTimestamp, parse_instant};
use crate::error::{TimelineError, TimelineResult};

/// A record that was skipped (or partially dropped) while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// Position of the record in `timelineObjects`
    pub index: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "record {}: {}", self.index, self.message)
    }
}

#[derive(Debug, Default)]
pub struct ParsedTimeline {
    pub entries: Vec<TimelineEntry>,
    pub warnings: Vec<ParseWarning>,
}

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    timeline_objects: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    activity_segment: Option<Value>,
    place_visit: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    latitude_e7: Option<i64>,
    longitude_e7: Option<i64>,
    place_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDuration {
    start_timestamp: Option<String>,
    end_timestamp: Option<String>,
    start_timestamp_ms: Option<String>,
    end_timestamp_ms: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    activity_type: Option<String>,
    probability: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWaypoint {
    lat_e7: Option<i64>,
    lng_e7: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoadSegment {
    place_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWaypointPath {
    #[serde(default)]
    waypoints: Vec<RawWaypoint>,
    #[serde(default)]
    road_segment: Vec<RawRoadSegment>,
    distance_meters: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivitySegment {
    start_location: Option<RawLocation>,
    end_location: Option<RawLocation>,
    duration: Option<RawDuration>,
    distance: Option<f64>,
    activity_type: Option<String>,
    #[serde(default)]
    activities: Vec<RawActivity>,
    waypoint_path: Option<RawWaypointPath>,
    last_edited_timestamp: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlaceVisit {
    location: Option<RawLocation>,
    duration: Option<RawDuration>,
    #[serde(default)]
    child_visits: Vec<Value>,
    last_edited_timestamp: Option<String>,
}

// =============================================================================
// Decoding
// =============================================================================

/// Parse a timeline document, preserving record order.
///
/// Fails only when the document itself is not a `timelineObjects` list.
pub fn parse_timeline(input: &str) -> TimelineResult<ParsedTimeline> {
    let document: RawDocument =
        serde_json::from_str(input).map_err(|e| TimelineError::Parse(e.to_string()))?;

    let mut parsed = ParsedTimeline::default();

    for (index, value) in document.timeline_objects.into_iter().enumerate() {
        let mut warn = |message: String| parsed.warnings.push(ParseWarning { index, message });

        let record: RawRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn(format!("not a timeline object: {e}"));
                continue;
            }
        };

        let entry = match (record.activity_segment, record.place_visit) {
            (Some(segment), None) => {
                parse_activity_segment(segment, &mut warn).map(TimelineEntry::ActivitySegment)
            }
            (None, Some(visit)) => parse_place_visit(visit, &mut warn).map(TimelineEntry::PlaceVisit),
            (Some(_), Some(_)) => Err("record is both an activity segment and a place visit".into()),
            (None, None) => Err("record is neither an activity segment nor a place visit".into()),
        };

        match entry {
            Ok(entry) => parsed.entries.push(entry),
            Err(message) => warn(message),
        }
    }

    Ok(parsed)
}

fn parse_activity_segment(
    value: Value,
    warn: &mut impl FnMut(String),
) -> Result<ActivitySegment, String> {
    let raw: RawActivitySegment =
        serde_json::from_value(value).map_err(|e| format!("invalid activity segment: {e}"))?;

    let (start, end) = parse_duration(raw.duration)?;
    let start_location = parse_location(raw.start_location, "startLocation")?;
    let end_location = parse_location(raw.end_location, "endLocation")?;

    let activities: Vec<Activity> = raw
        .activities
        .into_iter()
        .filter_map(|a| {
            let label = a.activity_type?;
            Some(Activity {
                activity_type: ActivityType::from_raw(&label),
                raw_label: label,
                probability: a.probability,
            })
        })
        .collect();

    let activity_type = match raw.activity_type {
        Some(label) => ActivityType::from_raw(&label),
        None => activities
            .first()
            .map(|a| a.activity_type)
            .unwrap_or(ActivityType::Unknown),
    };

    let waypoint_path = raw.waypoint_path.map(|path| WaypointPath {
        distance_meters: path.distance_meters,
        road_segments: path
            .road_segment
            .into_iter()
            .filter_map(|segment| segment.place_id)
            .collect(),
        waypoints: path
            .waypoints
            .into_iter()
            .enumerate()
            .filter_map(|(i, w)| match (w.lat_e7, w.lng_e7) {
                (Some(lat), Some(lng)) => Some(Location::from_e7(lat, lng)),
                _ => {
                    warn(format!("waypoint {i} dropped: missing coordinates"));
                    None
                }
            })
            .collect(),
    });

    let distance_meters = raw
        .distance
        .or_else(|| waypoint_path.as_ref().and_then(|p| p.distance_meters))
        .unwrap_or(0.0);

    Ok(ActivitySegment {
        activities,
        activity_type,
        distance_meters,
        start,
        end,
        start_location,
        end_location,
        waypoint_path,
        last_edited: raw.last_edited_timestamp.as_deref().and_then(parse_instant),
        time_zone: None,
    })
}

fn parse_place_visit(
    value: Value,
    warn: &mut impl FnMut(String),
) -> Result<PlaceVisit, String> {
    let raw: RawPlaceVisit =
        serde_json::from_value(value).map_err(|e| format!("invalid place visit: {e}"))?;

    let (start, end) = parse_duration(raw.duration)?;
    let location = parse_location(raw.location, "location")?;

    let mut child_visits = Vec::with_capacity(raw.child_visits.len());
    for (i, child) in raw.child_visits.into_iter().enumerate() {
        match parse_child_visit(child) {
            Ok(visit) => child_visits.push(visit),
            Err(message) => warn(format!("child visit {i} dropped: {message}")),
        }
    }

    Ok(PlaceVisit {
        start,
        end,
        location,
        child_visits,
        last_edited: raw.last_edited_timestamp.as_deref().and_then(parse_instant),
        time_zone: None,
    })
}

/// Child visits are one level deep; any grandchildren are ignored.
fn parse_child_visit(value: Value) -> Result<ChildVisit, String> {
    let raw: RawPlaceVisit =
        serde_json::from_value(value).map_err(|e| format!("invalid child visit: {e}"))?;

    let (start, end) = parse_duration(raw.duration)?;
    let location = parse_location(raw.location, "location")?;

    Ok(ChildVisit {
        start,
        end,
        location,
        child_visits: Vec::new(),
        last_edited: raw.last_edited_timestamp.as_deref().and_then(parse_instant),
        time_zone: None,
    })
}

fn parse_duration(duration: Option<RawDuration>) -> Result<(RawTimestamp, RawTimestamp), String> {
    let duration = duration.ok_or("missing duration")?;

    let start = duration
        .start_timestamp
        .or(duration.start_timestamp_ms)
        .ok_or("missing start timestamp")?;
    let end = duration
        .end_timestamp
        .or(duration.end_timestamp_ms)
        .ok_or("missing end timestamp")?;

    let start = RawTimestamp::parse(&start).ok_or_else(|| format!("invalid start timestamp '{start}'"))?;
    let end = RawTimestamp::parse(&end).ok_or_else(|| format!("invalid end timestamp '{end}'"))?;

    Ok((start, end))
}

fn parse_location(location: Option<RawLocation>, field: &str) -> Result<Location, String> {
    let location = location.ok_or_else(|| format!("missing {field}"))?;

    match (location.latitude_e7, location.longitude_e7) {
        (Some(lat), Some(lng)) => {
            let mut parsed = Location::from_e7(lat, lng);
            parsed.place_id = location.place_id;
            Ok(parsed)
        }
        _ => Err(format!("{field} has no coordinates")),
    }
}
