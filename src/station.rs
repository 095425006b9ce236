//! Observation stations and their time series.
//!
//! A [`Station`] is a fixed point with metadata (name, datum, units, ...),
//! a location in some coordinate reference system and an ordered list of
//! [`Timepoint`] samples.
//!
//! The as-read location is kept separately from the current location so
//! that repeated reprojection always starts from the source coordinates.
//!
//! # Example
//!
//! ```
//! use hmdf::{Date, Station, Timepoint};
//!
//! let mut station = Station::new(0, -90.0, 29.0);
//! let t0 = Date::new(2019, 2, 5, 0, 0, 0).unwrap();
//! station.push(Timepoint::scalar(t0, 0.25));
//! station.push(Timepoint::scalar(t0 + 3600_i64, 0.40));
//!
//! station.reproject(26915).unwrap();
//! assert_eq!(station.epsg(), 26915);
//! assert_eq!(station.x_original(), -90.0);
//! assert_eq!(station.mean_dt(), Some(3600.0));
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::date::DEFAULT_DATE_FORMAT;
use crate::projection::{self, ProjectionError};
use crate::timepoint::{NULL_VALUE, Timepoint};

/// Default coordinate system for new stations.
pub const DEFAULT_EPSG: u32 = 4326;

const NO_NAME: &str = "noname";
const NONE: &str = "none";

/// A fixed observation point with its time series.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    /// Station name
    name: String,
    /// External identifier (gauge number, model index, ...)
    id: String,
    /// Position of the station in its source file
    index: usize,
    /// Vertical datum of the values
    datum: String,
    units: String,
    timezone: String,
    /// Current coordinates
    x: f64,
    y: f64,
    epsg: u32,
    /// Coordinates as read from the source file
    x_original: f64,
    y_original: f64,
    epsg_original: u32,
    data: Vec<Timepoint>,
}

impl Default for Station {
    fn default() -> Self {
        Self::new(0, 0.0, 0.0)
    }
}

impl Station {
    /// Create an empty station at (`x`, `y`) in EPSG:4326.
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self::with_epsg(index, x, y, DEFAULT_EPSG)
    }

    /// Create an empty station at (`x`, `y`) in the given coordinate system.
    pub fn with_epsg(index: usize, x: f64, y: f64, epsg: u32) -> Self {
        Self {
            name: NO_NAME.to_string(),
            id: String::new(),
            index,
            datum: NONE.to_string(),
            units: NONE.to_string(),
            timezone: NONE.to_string(),
            x,
            y,
            epsg,
            x_original: x,
            y_original: y,
            epsg_original: epsg,
            data: Vec::new(),
        }
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn datum(&self) -> &str {
        &self.datum
    }

    pub fn set_datum(&mut self, datum: impl Into<String>) {
        self.datum = datum.into();
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn set_units(&mut self, units: impl Into<String>) {
        self.units = units.into();
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.timezone = timezone.into();
    }

    // ========================================================================
    // Location
    // ========================================================================

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn x_original(&self) -> f64 {
        self.x_original
    }

    pub fn y_original(&self) -> f64 {
        self.y_original
    }

    /// Alias of [`Station::y`].
    pub fn latitude(&self) -> f64 {
        self.y
    }

    /// Alias of [`Station::x`].
    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    pub fn set_latitude(&mut self, latitude: f64) {
        self.y = latitude;
    }

    pub fn set_longitude(&mut self, longitude: f64) {
        self.x = longitude;
    }

    /// Move the current location. The original coordinates are untouched.
    pub fn set_location(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn epsg_original(&self) -> u32 {
        self.epsg_original
    }

    /// Relabel the coordinate system without moving the coordinates.
    pub fn set_epsg(&mut self, epsg: u32) {
        self.epsg = epsg;
        self.epsg_original = epsg;
    }

    /// Transform the original coordinates into `epsg`.
    ///
    /// On failure the station is left unchanged.
    pub fn reproject(&mut self, epsg: u32) -> Result<(), ProjectionError> {
        let (x, y) = projection::transform(self.epsg_original, epsg, self.x_original, self.y_original)?;
        self.x = x;
        self.y = y;
        self.epsg = epsg;
        Ok(())
    }

    // ========================================================================
    // Data
    // ========================================================================

    pub fn push(&mut self, point: Timepoint) {
        self.data.push(point);
    }

    pub fn get(&self, index: usize) -> Option<&Timepoint> {
        self.data.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Timepoint> {
        self.data.get_mut(index)
    }

    /// Remove the sample at `index`, if present.
    pub fn delete_at(&mut self, index: usize) -> Option<Timepoint> {
        (index < self.data.len()).then(|| self.data.remove(index))
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Timepoint> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Timepoint> {
        self.data.iter_mut()
    }

    pub fn first(&self) -> Option<&Timepoint> {
        self.data.first()
    }

    pub fn last(&self) -> Option<&Timepoint> {
        self.data.last()
    }

    pub fn data(&self) -> &[Timepoint] {
        &self.data
    }

    /// Number of components per sample, taken from the first sample.
    pub fn dimension(&self) -> usize {
        self.data.first().map_or(0, Timepoint::dimension)
    }

    /// Mean spacing between samples in seconds.
    pub fn mean_dt(&self) -> Option<f64> {
        if self.data.len() < 2 {
            return None;
        }
        let span: i64 = self
            .data
            .windows(2)
            .map(|w| w[1].date().to_seconds() - w[0].date().to_seconds())
            .sum();
        Some(span as f64 / (self.data.len() - 1) as f64)
    }

    /// Sort by date and drop repeated dates, keeping the first occurrence.
    pub fn sanitize(&mut self) {
        self.data.sort_by_key(Timepoint::date);
        self.data.dedup_by(|later, earlier| Timepoint::same_date(earlier, later));
    }

    /// Shift every sample in time and value.
    pub fn shift(&mut self, seconds: i64, offset: f64) {
        for point in &mut self.data {
            point.shift(seconds, offset);
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Non-null values of component `index`.
    fn valid(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.data
            .iter()
            .filter_map(move |p| p.get(index))
            .filter(|&v| v != NULL_VALUE)
    }

    pub fn n_not_null(&self, index: usize) -> usize {
        self.valid(index).count()
    }

    pub fn sum(&self, index: usize) -> Option<f64> {
        let mut n = 0usize;
        let s = self.valid(index).inspect(|_| n += 1).sum::<f64>();
        (n > 0).then_some(s)
    }

    pub fn mean(&self, index: usize) -> Option<f64> {
        let n = self.n_not_null(index);
        self.sum(index).map(|s| s / n as f64)
    }

    pub fn median(&self, index: usize) -> Option<f64> {
        let mut v: Vec<f64> = self.valid(index).collect();
        if v.is_empty() {
            return None;
        }
        v.sort_by(f64::total_cmp);
        let mid = v.len() / 2;
        Some(if v.len() % 2 == 0 {
            (v[mid - 1] + v[mid]) / 2.0
        } else {
            v[mid]
        })
    }

    pub fn min(&self, index: usize) -> Option<f64> {
        self.valid(index).reduce(f64::min)
    }

    pub fn max(&self, index: usize) -> Option<f64> {
        self.valid(index).reduce(f64::max)
    }

    pub fn range(&self, index: usize) -> Option<f64> {
        self.minmax(index).map(|(lo, hi)| hi - lo)
    }

    /// Minimum and maximum of component `index` in one pass.
    pub fn minmax(&self, index: usize) -> Option<(f64, f64)> {
        self.valid(index).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Print the station summary to stdout.
    pub fn show(&self) {
        print!("{}", self);
    }

    /// Summary with begin and end dates written in `date_format`.
    pub fn summary<'a>(&'a self, date_format: &'a str) -> Summary<'a> {
        Summary {
            station: self,
            date_format,
        }
    }
}

/// [`Station`] summary printer returned by [`Station::summary`].
pub struct Summary<'a> {
    station: &'a Station,
    date_format: &'a str,
}

impl Index<usize> for Station {
    type Output = Timepoint;

    fn index(&self, index: usize) -> &Timepoint {
        &self.data[index]
    }
}

impl IndexMut<usize> for Station {
    fn index_mut(&mut self, index: usize) -> &mut Timepoint {
        &mut self.data[index]
    }
}

impl Extend<Timepoint> for Station {
    fn extend<I: IntoIterator<Item = Timepoint>>(&mut self, iter: I) {
        self.data.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Station {
    type Item = &'a Timepoint;
    type IntoIter = std::slice::Iter<'a, Timepoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for Station {
    type Item = Timepoint;
    type IntoIter = std::vec::IntoIter<Timepoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

fn join_stat(station: &Station, stat: impl Fn(usize) -> Option<f64>) -> String {
    if station.is_empty() {
        return "empty".to_string();
    }
    (0..station.dimension())
        .map(|i| stat(i).map_or_else(|| "null".to_string(), |v| format!("{:.6}", v)))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(DEFAULT_DATE_FORMAT), f)
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.station;
        let title = if s.name == NO_NAME { &s.id } else { &s.name };
        writeln!(f, "Station: {}", title)?;
        writeln!(f, "             ID: {}", s.id)?;
        if s.epsg != s.epsg_original {
            writeln!(f, "   X Coordinate: {:.6} ({:.6})", s.x, s.x_original)?;
            writeln!(f, "   Y Coordinate: {:.6} ({:.6})", s.y, s.y_original)?;
            writeln!(f, "     Projection: {} ({})", s.epsg, s.epsg_original)?;
        } else {
            writeln!(f, "   X Coordinate: {:.6}", s.x)?;
            writeln!(f, "   Y Coordinate: {:.6}", s.y)?;
            writeln!(f, "     Projection: {}", s.epsg)?;
        }
        writeln!(f, "          Datum: {}", s.datum)?;
        writeln!(f, "          Units: {}", s.units)?;
        writeln!(f, "       Timezone: {}", s.timezone)?;
        writeln!(f, "      Dimension: {}", s.dimension())?;
        writeln!(f, "         Length: {}", s.len())?;
        match s.mean_dt() {
            Some(dt) => writeln!(f, "  Mean Timestep: {}", dt)?,
            None => writeln!(f, "  Mean Timestep: n/a")?,
        }

        let n_null = if s.is_empty() {
            "empty".to_string()
        } else {
            (0..s.dimension())
                .map(|i| (s.len() - s.n_not_null(i)).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let (begin, end) = match (s.first(), s.last()) {
            (Some(a), Some(b)) => (
                a.date().to_string_fmt(self.date_format).map_err(|_| fmt::Error)?,
                b.date().to_string_fmt(self.date_format).map_err(|_| fmt::Error)?,
            ),
            _ => ("empty".to_string(), "empty".to_string()),
        };

        writeln!(f, "            Min: {}", join_stat(s, |i| s.min(i)))?;
        writeln!(f, "            Max: {}", join_stat(s, |i| s.max(i)))?;
        writeln!(f, "           Mean: {}", join_stat(s, |i| s.mean(i)))?;
        writeln!(f, "          nNull: {}", n_null)?;
        writeln!(f, "          Begin: {}", begin)?;
        writeln!(f, "            End: {}", end)
    }
}
