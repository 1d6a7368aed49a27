//! Error types for the timeline export pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop an export (of one file, or of the whole run).
///
/// Problems that only affect a single timeline entry are not errors; they
/// are collected as [`crate::export::ExportWarning`]s instead.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeline parse error: {0}")]
    Parse(String),

    #[error("Time zone data error: {0}")]
    TimeZoneData(String),

    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("Could not write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Failure of a single place lookup. Never fatal for the export.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaceDetailsError {
    #[error("No place details found for '{0}'")]
    NotFound(String),

    #[error("Places API error for '{place_id}': {message}")]
    Api { place_id: String, message: String },
}
