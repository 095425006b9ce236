//! # hmdf
//!
//! Reader for station time series written by coastal hydrodynamic models
//! and observation archives.
//!
//! This crate provides:
//! - Calendar dates with millisecond precision ([`Date`])
//! - Multi-component samples with null handling ([`Timepoint`])
//! - Stations with metadata, statistics and reprojection ([`Station`])
//! - Readers for ADCIRC ASCII, ADCIRC netCDF, generic netCDF and IMEDS files
//! - An IMEDS writer
//! - A built-in EPSG registry with UTM and ADCIRC CPP projections
//!
//! # Example
//!
//! ```ignore
//! use hmdf::{Date, HmdfData};
//!
//! let mut data = HmdfData::new("fort.61", Date::new(2019, 2, 5, 0, 0, 0)?, Some("stations.csv"));
//! data.read()?;
//! data.sanitize();
//! data.reproject(26915)?;
//! data.station(1).unwrap().show();
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod hmdf;
pub mod io;
pub mod logging;
pub mod projection;
pub mod station;
pub mod timepoint;

pub use config::ReaderConfig;
pub use date::{DEFAULT_DATE_FORMAT, Date};
pub use error::{HmdfError, Result};
pub use hmdf::{Bounds, HmdfData};
pub use io::{FileType, StationData};
pub use projection::{ProjectionError, contains_epsg, epsg_description, transform, transform_many};
pub use station::Station;
pub use timepoint::{NULL_VALUE, Timepoint};
