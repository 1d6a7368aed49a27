//! Export configuration.
//!
//! Loaded once by the shell and passed down explicitly; nothing in the
//! pipeline reads configuration from global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::ActivityType;

static DEFAULT_SOURCE_DIR: &str = "~/Takeout/Location History/Semantic Location History";
static DEFAULT_DEST_DIR: &str = "~/calendar/timeline";
static DEFAULT_TIMEZONE_DATA: &str = "~/.local/share/timeline-ics/timezones.geojson";
const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Key of the fallback entry in `language_overrides`.
pub const DEFAULT_LANGUAGE_KEY: &str = "default";

fn default_source_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_DIR)
}

fn default_dest_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DEST_DIR)
}

fn default_timezone_data() -> PathBuf {
    PathBuf::from(DEFAULT_TIMEZONE_DATA)
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_lookups() -> usize {
    DEFAULT_MAX_CONCURRENT_LOOKUPS
}

fn default_lookup_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

/// Configuration at ~/.config/timeline-ics/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,

    /// GeoJSON time zone boundaries
    #[serde(default = "default_timezone_data")]
    pub timezone_data: PathBuf,

    #[serde(default = "default_true")]
    pub export_places: bool,

    #[serde(default = "default_true")]
    pub export_activities: bool,

    #[serde(default)]
    pub ignored_activity_types: Vec<ActivityType>,

    #[serde(default)]
    pub ignored_place_ids: Vec<String>,

    #[serde(default)]
    pub enable_places_api_lookup: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places_api_key: Option<String>,

    /// Zone id → request language, with an optional `"default"` entry
    #[serde(default)]
    pub language_overrides: HashMap<String, String>,

    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            source_dir: default_source_dir(),
            dest_dir: default_dest_dir(),
            timezone_data: default_timezone_data(),
            export_places: true,
            export_activities: true,
            ignored_activity_types: Vec::new(),
            ignored_place_ids: Vec::new(),
            enable_places_api_lookup: false,
            places_api_key: None,
            language_overrides: HashMap::new(),
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }
}

impl ExportConfig {
    pub fn config_path() -> TimelineResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimelineError::Config("Could not determine config directory".into()))?
            .join("timeline-ics");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path` (or the default location), then apply
    /// `TIMELINE_ICS_*` environment overrides.
    pub fn load(path: Option<&Path>) -> TimelineResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: ExportConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("TIMELINE_ICS").try_parsing(true))
            .build()
            .map_err(|e| TimelineError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TimelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> TimelineResult<Self> {
        let config: ExportConfig =
            toml::from_str(content).map_err(|e| TimelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TimelineResult<()> {
        if self.max_concurrent_lookups == 0 {
            return Err(TimelineError::Config(
                "max_concurrent_lookups must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Place lookups only run with both the flag and a key.
    pub fn lookup_enabled(&self) -> bool {
        self.enable_places_api_lookup && self.api_key().is_some()
    }

    /// Lookups were asked for but there is no key to make them with.
    pub fn lookup_missing_key(&self) -> bool {
        self.enable_places_api_lookup && self.api_key().is_none()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.places_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn source_dir(&self) -> PathBuf {
        expand(&self.source_dir)
    }

    pub fn dest_dir(&self) -> PathBuf {
        expand(&self.dest_dir)
    }

    pub fn timezone_data(&self) -> PathBuf {
        expand(&self.timezone_data)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TimelineResult<()> {
        let contents = format!(
            "\
# timeline-ics configuration

# Semantic Location History folder from your Takeout export:
# source_dir = \"{DEFAULT_SOURCE_DIR}\"

# Where .ics files are written:
# dest_dir = \"{DEFAULT_DEST_DIR}\"

# Time zone boundaries (GeoJSON, timezone-boundary-builder format):
# timezone_data = \"{DEFAULT_TIMEZONE_DATA}\"

# export_places = true
# export_activities = true

# Activity types that never become events:
# ignored_activity_types = [\"STILL\", \"IN_PASSENGER_VEHICLE\"]

# Place ids that never become events:
# ignored_place_ids = [\"ChIJ...\"]

# Look up place names with the Google Places API:
# enable_places_api_lookup = false
# places_api_key = \"...\"
# max_concurrent_lookups = {DEFAULT_MAX_CONCURRENT_LOOKUPS}
# lookup_timeout_secs = {DEFAULT_LOOKUP_TIMEOUT_SECS}

# Request language per time zone:
# [language_overrides]
# default = \"en\"
# \"Europe/Paris\" = \"fr\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimelineError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TimelineError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
