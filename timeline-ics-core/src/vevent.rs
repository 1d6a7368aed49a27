//! Calendar events built from timeline entries.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::TimelineResult;
use crate::format::{format_coordinates, format_distance};
use crate::places::PlaceDetails;
use crate::timeline::{ActivitySegment, Location, PlaceVisit, RawTimestamp};

const UID_DOMAIN: &str = "timeline-ics";

/// One VEVENT, with every value already in calendar form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VEvent {
    pub uid: String,
    /// UTC stamp, e.g. `20190428T065124Z`
    pub dtstamp: String,
    /// Floating local time, or UTC with `Z` when the zone is unknown
    pub dtstart: String,
    pub dtend: String,
    pub summary: String,
    pub description: String,
    /// (latitude, longitude)
    pub geo: Option<(f64, f64)>,
    pub location: Option<String>,
    pub url: Option<String>,
}

/// Which shape an event was built from. Part of the UID key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Activity,
    Visit,
    ChildVisit,
}

impl EventKind {
    fn as_str(&self) -> &'static str {
        match self {
            EventKind::Activity => "activitySegment",
            EventKind::Visit => "placeVisit",
            EventKind::ChildVisit => "childVisit",
        }
    }
}

/// Stable UID: identical input always yields the identical UID.
pub fn event_uid(kind: EventKind, start: &RawTimestamp, end: &RawTimestamp, location: &Location) -> String {
    let key = format!(
        "{}|{}|{}|{}",
        kind.as_str(),
        start.instant().to_rfc3339_opts(SecondsFormat::Millis, true),
        end.instant().to_rfc3339_opts(SecondsFormat::Millis, true),
        format_coordinates(location),
    );
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes());
    format!("{id}@{UID_DOMAIN}")
}

/// Give repeated UIDs a `-2`, `-3`, ... suffix in list order.
pub fn ensure_unique_uids(events: &mut [VEvent]) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for event in events.iter_mut() {
        let count = seen.entry(event.uid.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            let (local, domain) = event.uid.split_once('@').unwrap_or((event.uid.as_str(), UID_DOMAIN));
            event.uid = format!("{local}-{count}@{domain}");
        }
    }
}

pub fn build_activity_event(segment: &ActivitySegment) -> TimelineResult<VEvent> {
    let zone = segment.time_zone.as_deref();
    let (start, end) = ordered(&segment.start, &segment.end);

    let mut summary = segment.activity_type.label().to_string();
    if let Some(path) = &segment.waypoint_path {
        match path.waypoints.len() {
            0 => {}
            1 => summary.push_str(" (1 waypoint)"),
            n => summary.push_str(&format!(" ({n} waypoints)")),
        }
    }

    let from = format_coordinates(&segment.start_location);
    let to = format_coordinates(&segment.end_location);

    let mut lines = vec![
        format!("Distance: {}", format_distance(segment.distance_meters, zone)),
        format!("From: {from}"),
        format!("To: {to}"),
        format!("Departed: {}", start.to_display_string()?),
        format!("Arrived: {}", end.to_display_string()?),
    ];

    if !segment.activities.is_empty() {
        let ranked: Vec<String> = segment
            .activities
            .iter()
            .map(|a| match a.probability {
                Some(p) => format!("{} ({:.0}%)", a.activity_type.label(), p),
                None => a.activity_type.label().to_string(),
            })
            .collect();
        lines.push(format!("Activities: {}", ranked.join(", ")));
    }

    if let Some(path) = &segment.waypoint_path {
        if !path.road_segments.is_empty() {
            lines.push(format!("Road segments: {}", path.road_segments.join(", ")));
        }
    }

    Ok(VEvent {
        uid: event_uid(EventKind::Activity, &segment.start, &segment.end, &segment.start_location),
        dtstamp: stamp(segment.last_edited, &segment.end),
        dtstart: start.to_calendar_string()?,
        dtend: end.to_calendar_string()?,
        summary,
        description: lines.join("\n"),
        geo: Some((segment.start_location.latitude, segment.start_location.longitude)),
        location: Some(format!("from {from} to {to}")),
        url: None,
    })
}

/// Build the event for a place visit or child visit.
///
/// Without `details` the event falls back to coordinates for its summary
/// and location.
pub fn build_visit_event(
    visit: &PlaceVisit,
    details: Option<&PlaceDetails>,
    kind: EventKind,
) -> TimelineResult<VEvent> {
    let (start, end) = ordered(&visit.start, &visit.end);
    let coordinates = format_coordinates(&visit.location);

    let summary = match details {
        Some(d) => d.name.clone(),
        None => format!("Visited place at {coordinates}"),
    };

    let mut lines = Vec::new();
    if let Some(d) = details {
        if let Some(address) = &d.formatted_address {
            lines.push(address.clone());
        }
        if let Some(url) = &d.url {
            lines.push(url.clone());
        }
    }
    lines.push(format!("Arrived: {}", start.to_display_string()?));
    lines.push(format!("Left: {}", end.to_display_string()?));
    if let Some(place_id) = visit.place_id() {
        lines.push(format!("Place ID: {place_id}"));
    }

    let location = details
        .and_then(|d| d.formatted_address.clone())
        .unwrap_or(coordinates);

    Ok(VEvent {
        uid: event_uid(kind, &visit.start, &visit.end, &visit.location),
        dtstamp: stamp(visit.last_edited, &visit.end),
        dtstart: start.to_calendar_string()?,
        dtend: end.to_calendar_string()?,
        summary,
        description: lines.join("\n"),
        geo: Some((visit.location.latitude, visit.location.longitude)),
        location: Some(location),
        url: details.and_then(|d| d.url.clone()),
    })
}

/// `(start, end)` with the end clamped so it never precedes the start.
fn ordered<'a>(start: &'a RawTimestamp, end: &'a RawTimestamp) -> (&'a RawTimestamp, &'a RawTimestamp) {
    if end.instant() < start.instant() {
        debug!(start = %start.instant(), end = %end.instant(), "clamping end to start");
        (start, start)
    } else {
        (start, end)
    }
}

fn stamp(last_edited: Option<DateTime<Utc>>, end: &RawTimestamp) -> String {
    last_edited
        .unwrap_or_else(|| end.instant())
        .format("%Y%m%dT%H%M%SZ")
        .to_string()
}
