//! Error type shared by the readers, writers and the dataset handle.

use std::path::PathBuf;

use thiserror::Error;

use crate::projection::ProjectionError;

/// Error type for HMDF operations.
#[derive(Debug, Error)]
pub enum HmdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with file and line number
    #[error("Parse error in {file} at line {line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// Station location file and data file disagree on the station count
    #[error("Station file lists {station_file} stations but the data file has {data_file}")]
    StationCountMismatch { station_file: usize, data_file: usize },

    /// Extension (or netCDF layout) not recognised
    #[error("Unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Format recognised but not readable/writable by this crate
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Calendar components or date string could not be converted
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Coordinate transformation failed
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Required netCDF variable, dimension or attribute is absent
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Data present but inconsistent
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Station or sample index outside the stored range
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Reading the file needs a cargo feature that was not compiled in
    #[error("Feature `{0}` not enabled")]
    FeatureDisabled(&'static str),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
}

impl HmdfError {
    /// Build a parse error for a 1-based line of `file`.
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HmdfError>;
