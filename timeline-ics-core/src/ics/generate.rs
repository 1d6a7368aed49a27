//! ICS document generation.

use icalendar::{Calendar, Component, EventLike, Property};

use super::CalendarMetadata;
use super::text::{fold_line, unescape_text, unfold};
use crate::vevent::VEvent;

const PRODID: &str = "-//timeline-ics//EN";

/// Properties whose values are not TEXT and must reach the file unescaped.
const RAW_VALUE_PROPERTIES: &[&str] = &["GEO", "URL"];

/// Generate a complete .ics document, one VEVENT per event, in order.
pub fn generate_ics(events: &[VEvent], metadata: &CalendarMetadata) -> String {
    let mut cal = Calendar::new();

    // X-WR-CALNAME - Human-readable calendar name (de facto standard)
    if let Some(name) = &metadata.calendar_name {
        cal.append_property(Property::new("X-WR-CALNAME", name));
    }

    for event in events {
        cal.push(build_event(event));
    }

    let cal = cal.done();
    tidy_ics(&cal.to_string())
}

fn build_event(event: &VEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();

    ics_event.uid(&event.uid);
    ics_event.add_property("DTSTAMP", &event.dtstamp);

    // Floating local times: no TZID, no trailing Z
    ics_event.add_property("DTSTART", &event.dtstart);
    ics_event.add_property("DTEND", &event.dtend);

    ics_event.summary(&one_newline(&event.summary));

    if !event.description.is_empty() {
        ics_event.description(&one_newline(&event.description));
    }

    if let Some(location) = &event.location {
        ics_event.location(&one_newline(location));
    }

    if let Some((lat, lng)) = event.geo {
        ics_event.add_property("GEO", format!("{lat:.6};{lng:.6}"));
    }

    if let Some(url) = &event.url {
        ics_event.add_property("URL", url);
    }

    ics_event.done()
}

/// CRLF and lone CR count as one newline.
fn one_newline(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Post-process the crate's output: swap in our PRODID and restore GEO and
/// URL to their raw form. Every line is refolded to at most 75 octets,
/// counting the continuation space.
fn tidy_ics(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in unfold(ics).lines() {
        let line = match line.split_once(':') {
            Some(("PRODID", _)) => format!("PRODID:{PRODID}"),
            Some((name, value)) if RAW_VALUE_PROPERTIES.contains(&name) => {
                format!("{name}:{}", unescape_text(value))
            }
            _ => line.to_string(),
        };
        result.push_str(&fold_line(&line));
        result.push_str("\r\n");
    }

    result
}
