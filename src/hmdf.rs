//! Dataset handle tying a source file to its stations.
//!
//! [`HmdfData`] remembers where the data came from (file, cold start date,
//! optional station location file), reads it into a list of [`Station`]s
//! and offers whole-dataset operations.
//!
//! # Example
//!
//! ```ignore
//! use hmdf::{Date, HmdfData};
//!
//! let coldstart = Date::new(2019, 2, 5, 0, 0, 0)?;
//! let mut data = HmdfData::new("fort.61", coldstart, Some("stations.txt"));
//! data.read()?;
//! data.sanitize();
//! data.reproject(26915)?;
//! data.station(0).unwrap().show();
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ReaderConfig;
use crate::date::Date;
use crate::error::{HmdfError, Result};
use crate::io::{self, FileType, StationData};
use crate::projection::{self, ProjectionError};
use crate::station::Station;

/// Time and value extent of a dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Earliest first sample over all stations
    pub begin: Date,
    /// Latest last sample over all stations
    pub end: Date,
    /// Smallest non-null value of component 0, if any
    pub min: Option<f64>,
    /// Largest non-null value of component 0, if any
    pub max: Option<f64>,
}

/// A set of stations read from one file.
#[derive(Clone, Debug)]
pub struct HmdfData {
    filename: PathBuf,
    coldstart: Date,
    station_file: Option<PathBuf>,
    config: ReaderConfig,
    header_data: Vec<String>,
    stations: Vec<Station>,
    success: bool,
    null: bool,
    dimension: usize,
    epsg: u32,
}

impl HmdfData {
    /// Create an empty handle for `filename`.
    ///
    /// `coldstart` is the reference date of model output times and
    /// `station_file` the ADCIRC station location file, both only used by
    /// the ADCIRC ASCII reader.
    pub fn new(filename: impl Into<PathBuf>, coldstart: Date, station_file: Option<impl Into<PathBuf>>) -> Self {
        let config = ReaderConfig::default();
        Self {
            filename: filename.into(),
            coldstart,
            station_file: station_file.map(Into::into),
            epsg: config.default_epsg,
            config,
            header_data: Vec::new(),
            stations: Vec::new(),
            success: false,
            null: true,
            dimension: 0,
        }
    }

    /// Replace the reader configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.epsg = config.default_epsg;
        self.config = config;
        self
    }

    // ========================================================================
    // Reading and writing
    // ========================================================================

    /// Read the file, replacing any previously read stations.
    pub fn read(&mut self) -> Result<()> {
        self.stations.clear();
        self.header_data.clear();
        self.success = false;
        self.null = true;
        self.dimension = 0;

        let file_type = FileType::detect(&self.filename)?;
        debug!("Reading {} as {}", self.filename.display(), file_type);

        let data = match file_type {
            FileType::AdcircAscii => io::read_adcirc_ascii(
                &self.filename,
                self.coldstart,
                self.station_file.as_deref(),
                &self.config,
            )?,
            FileType::AdcircNetCdf => self.read_adcirc_netcdf()?,
            FileType::GenericNetCdf => self.read_generic_netcdf()?,
            FileType::Imeds => io::read_imeds(&self.filename, &self.config)?,
            FileType::Delft3D => {
                return Err(HmdfError::UnsupportedFormat(format!(
                    "{}: Delft3D NEFIS files are not supported",
                    self.filename.display()
                )));
            }
            FileType::Unknown => return Err(HmdfError::UnknownFileType(self.filename.clone())),
        };

        self.apply(data);
        info!(
            "{}: {} stations, dimension {}",
            self.filename.display(),
            self.stations.len(),
            self.dimension
        );
        Ok(())
    }

    fn apply(&mut self, data: StationData) {
        self.header_data = data.header;
        self.stations = data.stations;
        self.epsg = data.epsg.unwrap_or(self.config.default_epsg);
        self.dimension = self.stations.iter().map(Station::dimension).max().unwrap_or(0);
        self.success = true;
        self.null = false;
    }

    #[cfg(feature = "netcdf")]
    fn read_adcirc_netcdf(&self) -> Result<StationData> {
        io::read_adcirc_netcdf(&self.filename, self.coldstart, &self.config)
    }

    #[cfg(feature = "netcdf")]
    fn read_generic_netcdf(&self) -> Result<StationData> {
        io::read_generic_netcdf(&self.filename, &self.config)
    }

    #[cfg(not(feature = "netcdf"))]
    fn read_adcirc_netcdf(&self) -> Result<StationData> {
        Err(HmdfError::FeatureDisabled("netcdf"))
    }

    #[cfg(not(feature = "netcdf"))]
    fn read_generic_netcdf(&self) -> Result<StationData> {
        Err(HmdfError::FeatureDisabled("netcdf"))
    }

    /// Write all stations to `path`. Only IMEDS output is supported.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_imeds = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("imeds"));
        if !is_imeds {
            return Err(HmdfError::UnsupportedFormat(format!(
                "{}: only IMEDS output is supported",
                path.display()
            )));
        }
        io::write_imeds(path, &self.header_data, &self.stations)
    }

    // ========================================================================
    // Whole-dataset operations
    // ========================================================================

    /// Sort every station by date and drop duplicate dates.
    pub fn sanitize(&mut self) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.stations.par_iter_mut().for_each(Station::sanitize);
        }
        #[cfg(not(feature = "parallel"))]
        self.stations.iter_mut().for_each(Station::sanitize);
    }

    /// Reproject every station into `epsg`.
    ///
    /// The code is checked before any station is touched.
    pub fn reproject(&mut self, epsg: u32) -> Result<()> {
        if !projection::contains_epsg(epsg) {
            return Err(ProjectionError::UnknownEpsg(epsg).into());
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.stations
                .par_iter_mut()
                .try_for_each(|s| s.reproject(epsg))?;
        }
        #[cfg(not(feature = "parallel"))]
        for station in &mut self.stations {
            station.reproject(epsg)?;
        }

        self.epsg = epsg;
        Ok(())
    }

    /// Relabel the dataset and every station without moving coordinates.
    pub fn set_epsg(&mut self, epsg: u32) {
        self.epsg = epsg;
        for station in &mut self.stations {
            station.set_epsg(epsg);
        }
    }

    /// Date range over all non-empty stations and value range of component 0.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for station in self.stations.iter().filter(|s| !s.is_empty()) {
            let (Some(first), Some(last)) = (station.first(), station.last()) else {
                continue;
            };
            let range = station.minmax(0);
            let b = bounds.get_or_insert(Bounds {
                begin: first.date(),
                end: last.date(),
                min: None,
                max: None,
            });
            b.begin = b.begin.min(first.date());
            b.end = b.end.max(last.date());
            if let Some((lo, hi)) = range {
                b.min = Some(b.min.map_or(lo, |m| m.min(lo)));
                b.max = Some(b.max.map_or(hi, |m| m.max(hi)));
            }
        }
        bounds
    }

    // ========================================================================
    // Station access
    // ========================================================================

    pub fn station(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    pub fn station_mut(&mut self, index: usize) -> Option<&mut Station> {
        self.stations.get_mut(index)
    }

    pub fn set_station(&mut self, index: usize, station: Station) -> Result<()> {
        let len = self.stations.len();
        let slot = self
            .stations
            .get_mut(index)
            .ok_or(HmdfError::IndexOutOfRange { index, len })?;
        *slot = station;
        Ok(())
    }

    pub fn add_station(&mut self, station: Station) {
        self.stations.push(station);
    }

    pub fn delete_station(&mut self, index: usize) -> Result<Station> {
        let len = self.stations.len();
        if index >= len {
            return Err(HmdfError::IndexOutOfRange { index, len });
        }
        Ok(self.stations.remove(index))
    }

    /// Truncate, or pad with empty stations.
    pub fn resize(&mut self, n: usize) {
        let start = self.stations.len();
        let epsg = self.epsg;
        self.stations
            .resize_with(n, || Station::with_epsg(0, 0.0, 0.0, epsg));
        for (i, station) in self.stations.iter_mut().enumerate().skip(start) {
            station.set_index(i);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Station> {
        self.stations.iter_mut()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn header_data(&self) -> &[String] {
        &self.header_data
    }

    pub fn set_header_data(&mut self, header: Vec<String>) {
        self.header_data = header;
    }

    /// Whether the last `read` completed.
    pub fn success(&self) -> bool {
        self.success
    }

    /// True until data has been read.
    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Largest sample dimension over all stations.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = filename.into();
    }

    pub fn coldstart(&self) -> Date {
        self.coldstart
    }

    pub fn set_coldstart(&mut self, coldstart: Date) {
        self.coldstart = coldstart;
    }

    pub fn station_file(&self) -> Option<&Path> {
        self.station_file.as_deref()
    }

    pub fn set_station_file(&mut self, station_file: Option<impl Into<PathBuf>>) {
        self.station_file = station_file.map(Into::into);
    }
}

impl Extend<Station> for HmdfData {
    fn extend<I: IntoIterator<Item = Station>>(&mut self, iter: I) {
        self.stations.extend(iter);
    }
}

impl<'a> IntoIterator for &'a HmdfData {
    type Item = &'a Station;
    type IntoIter = std::slice::Iter<'a, Station>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}
