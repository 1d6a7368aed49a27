//! ICS file generation.
//!
//! Documents are built with the `icalendar` crate, then post-processed to
//! carry our PRODID and keep GEO and URL values raw. Lines are refolded so
//! none exceeds 75 octets.

mod generate;
mod text;

pub use generate::generate_ics;
pub use text::{MAX_LINE_OCTETS, unescape_text, unfold};

/// Metadata about the export (embedded in .ics files)
#[derive(Debug, Clone, Default)]
pub struct CalendarMetadata {
    /// Human-readable calendar name (e.g., "2020_JANUARY")
    pub calendar_name: Option<String>,
}
