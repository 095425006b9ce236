//! File readers and writers for station time series.
//!
//! This module provides:
//! - **ADCIRC ASCII**: `fort.61/62/71/72` station output plus the station location file
//! - **ADCIRC netCDF**: station output written by ADCIRC with netCDF enabled (requires `netcdf` feature)
//! - **Generic netCDF**: per-station time/data variables (requires `netcdf` feature)
//! - **IMEDS**: plain-text observation exchange format (read and write)
//!
//! # File Formats
//!
//! ## ADCIRC Station File
//!
//! ```text
//! 2
//! -90.0, 29.0
//! -89.5, 29.2
//! ```
//!
//! ## ADCIRC ASCII Output
//!
//! ```text
//! fort.61 header line
//! 2 2 360.0 1 1
//! 360.0 1
//! 1 0.25
//! 2 -99999.0
//! 720.0 2
//! 1 0.31
//! 2 0.12
//! ```
//!
//! ## IMEDS
//!
//! ```text
//! % IMEDS generic format - Water Level
//! % year month day hour min sec watl(m)
//! NOAA NOAA
//! 8761724 29.2633 -89.9567
//! 2019 02 05 00 00 00 0.2500
//! 2019 02 05 00 06 00 0.2610
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use hmdf::io::{FileType, read_imeds};
//! use hmdf::ReaderConfig;
//!
//! let path = Path::new("gauges.imeds");
//! assert_eq!(FileType::detect(path)?, FileType::Imeds);
//! let data = read_imeds(path, &ReaderConfig::default())?;
//! println!("{} stations", data.stations.len());
//! ```

mod adcirc_ascii;
mod imeds;
#[cfg(feature = "netcdf")]
mod netcdf_io;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{HmdfError, Result};
use crate::station::Station;

pub use adcirc_ascii::{read_adcirc_ascii, read_station_file};
pub use imeds::{read_imeds, write_imeds};
#[cfg(feature = "netcdf")]
pub use netcdf_io::{read_adcirc_netcdf, read_generic_netcdf};

/// Stations and header lines produced by a reader.
#[derive(Clone, Debug, Default)]
pub struct StationData {
    /// Free-text header lines from the file
    pub header: Vec<String>,
    pub stations: Vec<Station>,
    /// Coordinate system declared by the file, if any
    pub epsg: Option<u32>,
}

/// Station file formats recognised by [`FileType::detect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// `.61 .62 .71 .72`
    AdcircAscii,
    /// `.nc` carrying the `slam0` global attribute
    AdcircNetCdf,
    /// `.nc` carrying `time_station_0001`
    GenericNetCdf,
    /// `.imeds`
    Imeds,
    /// Delft3D NEFIS `.dat` / `.def`
    Delft3D,
    Unknown,
}

impl FileType {
    /// Detect the format of `path` from its extension.
    ///
    /// netCDF files are opened to tell the ADCIRC layout from the generic one.
    pub fn detect(path: &Path) -> Result<FileType> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(match ext.as_str() {
            "61" | "62" | "71" | "72" => FileType::AdcircAscii,
            "imeds" => FileType::Imeds,
            "dat" | "def" => FileType::Delft3D,
            "nc" => detect_netcdf(path)?,
            _ => FileType::Unknown,
        })
    }

    pub fn is_netcdf(&self) -> bool {
        matches!(self, FileType::AdcircNetCdf | FileType::GenericNetCdf)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::AdcircAscii => "ADCIRC ASCII",
            FileType::AdcircNetCdf => "ADCIRC netCDF",
            FileType::GenericNetCdf => "generic netCDF",
            FileType::Imeds => "IMEDS",
            FileType::Delft3D => "Delft3D NEFIS",
            FileType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "netcdf")]
fn detect_netcdf(path: &Path) -> Result<FileType> {
    netcdf_io::detect(path)
}

#[cfg(not(feature = "netcdf"))]
fn detect_netcdf(_path: &Path) -> Result<FileType> {
    Err(HmdfError::FeatureDisabled("netcdf"))
}

// ============================================================================
// Text parsing helpers
// ============================================================================

/// Line reader that tracks the 1-based line number for error messages.
pub(crate) struct LineReader {
    lines: Peekable<Lines<BufReader<File>>>,
    path: PathBuf,
    line_no: usize,
}

impl LineReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines().peekable(),
            path: path.to_path_buf(),
            line_no: 0,
        })
    }

    /// Next line with `\r` stripped, or `None` at end of file.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                let mut line = line?;
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
            None => Ok(None),
        }
    }

    /// Next line, failing with a parse error mentioning `what` at end of file.
    pub(crate) fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| HmdfError::parse(&self.path, self.line_no + 1, format!("unexpected end of file, expected {}", what)))
    }

    /// True once every line has been consumed.
    pub(crate) fn at_eof(&mut self) -> bool {
        self.lines.peek().is_none()
    }

    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> HmdfError {
        HmdfError::parse(&self.path, self.line_no, message)
    }

    /// Parse token `index` of the current line.
    pub(crate) fn token<T: FromStr>(&self, tokens: &[&str], index: usize, what: &str) -> Result<T> {
        let raw = tokens
            .get(index)
            .ok_or_else(|| self.error(format!("missing {}", what)))?;
        raw.parse()
            .map_err(|_| self.error(format!("invalid {}: '{}'", what, raw)))
    }
}

/// Split on whitespace and commas, dropping empty tokens.
pub(crate) fn split_tokens(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(FileType::detect(Path::new("fort.61")).unwrap(), FileType::AdcircAscii);
        assert_eq!(FileType::detect(Path::new("FORT.72")).unwrap(), FileType::AdcircAscii);
        assert_eq!(FileType::detect(Path::new("obs.IMEDS")).unwrap(), FileType::Imeds);
        assert_eq!(FileType::detect(Path::new("trih-run.dat")).unwrap(), FileType::Delft3D);
        assert_eq!(FileType::detect(Path::new("notes.txt")).unwrap(), FileType::Unknown);
        assert_eq!(FileType::detect(Path::new("noextension")).unwrap(), FileType::Unknown);
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_netcdf_needs_feature() {
        assert!(matches!(
            FileType::detect(Path::new("fort.61.nc")),
            Err(HmdfError::FeatureDisabled("netcdf"))
        ));
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens(" -90.0, 29.0 "), vec!["-90.0", "29.0"]);
        assert_eq!(split_tokens("1\t2  3"), vec!["1", "2", "3"]);
        assert!(split_tokens("  ").is_empty());
    }
}
