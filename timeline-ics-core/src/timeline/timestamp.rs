//! Instants tied to the time zone of the entry they belong to.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{TimelineError, TimelineResult};

const CALENDAR_FORMAT: &str = "%Y%m%dT%H%M%S";
const DISPLAY_FORMAT: &str = "%a %-d %b %Y %H:%M %Z";

/// An instant plus the IANA zone it should be shown in.
///
/// The zone is `None` until the time zone resolver has run, and stays `None`
/// when the location falls outside every known zone polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTimestamp {
    instant: DateTime<Utc>,
    zone: Option<String>,
}

impl RawTimestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        RawTimestamp {
            instant,
            zone: None,
        }
    }

    /// Parse either an RFC 3339 timestamp or epoch milliseconds.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_instant(raw).map(Self::new)
    }

    pub fn with_zone(mut self, zone: Option<String>) -> Self {
        self.zone = zone;
        self
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Calendar form of this timestamp.
    ///
    /// With a zone this is a floating local time (`20190428T075124`).
    /// Without one the exact UTC instant is used (`20190428T065124Z`)
    /// rather than guessing a zone.
    pub fn to_calendar_string(&self) -> TimelineResult<String> {
        match &self.zone {
            Some(zone) => {
                let tz = parse_zone(zone)?;
                Ok(self.instant.with_timezone(&tz).format(CALENDAR_FORMAT).to_string())
            }
            None => Ok(format!("{}Z", self.instant.format(CALENDAR_FORMAT))),
        }
    }

    /// Human-readable local time, e.g. `Sun 28 Apr 2019 07:51 BST`.
    pub fn to_display_string(&self) -> TimelineResult<String> {
        match &self.zone {
            Some(zone) => {
                let tz = parse_zone(zone)?;
                Ok(self.instant.with_timezone(&tz).format(DISPLAY_FORMAT).to_string())
            }
            None => Ok(self.instant.format(DISPLAY_FORMAT).to_string()),
        }
    }
}

fn parse_zone(zone: &str) -> TimelineResult<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| TimelineError::UnknownTimeZone(zone.to_string()))
}

/// Accepts `2019-04-28T06:51:24.246Z` as well as `"1556434284246"`.
pub(crate) fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
