//! Timeline records: the typed model and the JSON parser that produces it.

mod model;
mod parse;
mod timestamp;

pub use model::*;
pub use parse::{ParseWarning, ParsedTimeline, parse_timeline};
pub use timestamp::RawTimestamp;
