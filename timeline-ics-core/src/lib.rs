//! Core of timeline-ics: location-history timelines to iCalendar files.
//!
//! This crate holds the whole pipeline; the `timeline-ics` binary only
//! adds the command line around it:
//! - `timeline` parses the export into activity segments and place visits
//! - `timezone`, `filter` and `places` resolve, prune and enrich entries
//! - `vevent` and `ics` render events and documents
//! - `export` runs all of it for one file

pub mod config;
pub mod error;
pub mod export;
pub mod filename;
pub mod filter;
pub mod format;
pub mod ics;
pub mod output;
pub mod places;
pub mod timeline;
pub mod timezone;
pub mod vevent;

pub use config::ExportConfig;
pub use error::{PlaceDetailsError, TimelineError, TimelineResult};
pub use export::{ExportReport, ExportWarning, Exporter};
