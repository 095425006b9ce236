//! Reader configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! null_threshold = -99999.0
//! default_epsg = 4269
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::date::{DEFAULT_DATE_FORMAT, Date};
use crate::error::{HmdfError, Result};

/// Options shared by all file readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Values at or below this are stored as null
    #[serde(default = "default_null_threshold")]
    pub null_threshold: f64,

    /// Coordinate system assigned to stations when the file does not say
    #[serde(default = "default_epsg")]
    pub default_epsg: u32,

    /// strftime format for dates in station summaries and sampled values
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_null_threshold() -> f64 {
    -9999.0
}

fn default_epsg() -> u32 {
    4326
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            null_threshold: default_null_threshold(),
            default_epsg: default_epsg(),
            date_format: default_date_format(),
        }
    }
}

impl ReaderConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HmdfError::Config(format!("{}: {}", path.display(), e)))?;
        Date::default()
            .to_string_fmt(&config.date_format)
            .map_err(|e| HmdfError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn with_null_threshold(mut self, threshold: f64) -> Self {
        self.null_threshold = threshold;
        self
    }

    pub fn with_default_epsg(mut self, epsg: u32) -> Self {
        self.default_epsg = epsg;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Map a raw file value to `NULL_VALUE` when it is at or below the threshold.
    pub fn filter_null(&self, value: f64) -> f64 {
        if value <= self.null_threshold {
            crate::timepoint::NULL_VALUE
        } else {
            value
        }
    }
}
