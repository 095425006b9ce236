//! NetCDF station readers.
//!
//! Two layouts are understood:
//! - **ADCIRC**: `time`, `station` and `namelen` dimensions, `x`/`y`/`station_name`
//!   variables and one or two `[time, station]` data variables
//! - **Generic**: `numStations` stations, each with its own
//!   `time_station_kkkk` / `data_station_kkkk` pair

use std::path::Path;

use netcdf::AttributeValue;
use tracing::{debug, info};

use super::{FileType, StationData};
use crate::config::ReaderConfig;
use crate::date::{DEFAULT_DATE_FORMAT, Date};
use crate::error::{HmdfError, Result};
use crate::station::Station;
use crate::timepoint::Timepoint;

/// ADCIRC data variables in detection order, with their optional second component.
const ADCIRC_VARIABLES: [(&str, Option<&str>); 4] = [
    ("zeta", None),
    ("u-vel", Some("v-vel")),
    ("pressure", None),
    ("windx", Some("windy")),
];

/// Tell the ADCIRC layout from the generic one.
pub(super) fn detect(path: &Path) -> Result<FileType> {
    let file = netcdf::open(path)?;
    Ok(if file.variable("time_station_0001").is_some() {
        FileType::GenericNetCdf
    } else if file.attribute("slam0").is_some() {
        FileType::AdcircNetCdf
    } else {
        FileType::Unknown
    })
}

fn dimension_len(file: &netcdf::File, name: &str) -> Result<usize> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| HmdfError::MissingVariable(format!("dimension {}", name)))
}

fn variable<'f>(file: &'f netcdf::File, name: &str) -> Result<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| HmdfError::MissingVariable(name.to_string()))
}

fn check_len(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(HmdfError::InvalidData(format!(
            "{} holds {} values, expected {}",
            name, actual, expected
        )));
    }
    Ok(())
}

/// Split a fixed-width character array into trimmed names.
fn split_names(raw: &[u8], width: usize, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let chunk = raw.get(i * width..(i + 1) * width).unwrap_or(&[]);
            String::from_utf8_lossy(chunk)
                .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        })
        .collect()
}

/// Text attribute of a variable, or `"none"` when absent or empty.
fn text_attribute(var: &netcdf::Variable, name: &str) -> String {
    match var.attribute_value(name).and_then(|r| r.ok()) {
        Some(AttributeValue::Str(s)) if !s.trim().is_empty() => s.trim_end().to_string(),
        _ => "none".to_string(),
    }
}

fn int_attribute(var: &netcdf::Variable, name: &str) -> Option<i64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            AttributeValue::Short(s) => Some(s as i64),
            AttributeValue::Int(i) => Some(i as i64),
            AttributeValue::Longlong(l) => Some(l),
            AttributeValue::Double(d) => Some(d as i64),
            AttributeValue::Ints(v) => v.first().map(|&i| i as i64),
            _ => None,
        })
}

/// Read ADCIRC netCDF station output.
pub fn read_adcirc_netcdf(path: &Path, coldstart: Date, config: &ReaderConfig) -> Result<StationData> {
    let file = netcdf::open(path)?;

    let nsnap = dimension_len(&file, "time")?;
    let nsta = dimension_len(&file, "station")?;
    let namelen = dimension_len(&file, "namelen")?;

    let times: Vec<f64> = variable(&file, "time")?.get_values(..)?;
    let x: Vec<f64> = variable(&file, "x")?.get_values(..)?;
    let y: Vec<f64> = variable(&file, "y")?.get_values(..)?;
    let raw_names = variable(&file, "station_name")?.get_raw_values(..)?;
    check_len("time", times.len(), nsnap)?;
    check_len("x", x.len(), nsta)?;
    check_len("y", y.len(), nsta)?;
    let names = split_names(&raw_names, namelen, nsta);

    let (first, second) = ADCIRC_VARIABLES
        .iter()
        .find(|(name, _)| file.variable(name).is_some())
        .copied()
        .ok_or_else(|| HmdfError::MissingVariable("no ADCIRC station variable (zeta, u-vel, pressure, windx)".to_string()))?;
    debug!("ADCIRC netCDF variable {} ({} snaps, {} stations)", first, nsnap, nsta);

    let v1: Vec<f64> = variable(&file, first)?.get_values(..)?;
    let v2: Option<Vec<f64>> = match second {
        Some(name) => Some(variable(&file, name)?.get_values(..)?),
        None => None,
    };
    if v1.len() != nsnap * nsta || v2.as_ref().is_some_and(|v| v.len() != v1.len()) {
        return Err(HmdfError::InvalidData(format!(
            "{} holds {} values, expected {} x {}",
            first,
            v1.len(),
            nsnap,
            nsta
        )));
    }

    let dates: Vec<Date> = times.iter().map(|&t| coldstart + t).collect();

    let mut stations: Vec<Station> = (0..nsta)
        .map(|i| {
            let mut s = Station::with_epsg(i, x[i], y[i], config.default_epsg);
            s.set_name(names[i].clone());
            s.set_id((i + 1).to_string());
            s.reserve(nsnap);
            s
        })
        .collect();

    for (t, date) in dates.iter().enumerate() {
        for (i, station) in stations.iter_mut().enumerate() {
            let k = t * nsta + i;
            let point = match &v2 {
                Some(v2) => Timepoint::vector(*date, config.filter_null(v1[k]), config.filter_null(v2[k])),
                None => Timepoint::scalar(*date, config.filter_null(v1[k])),
            };
            station.push(point);
        }
    }

    info!("Read {} ADCIRC netCDF stations from {}", nsta, path.display());
    Ok(StationData {
        header: Vec::new(),
        stations,
        epsg: None,
    })
}

/// Read a generic HMDF netCDF file.
pub fn read_generic_netcdf(path: &Path, config: &ReaderConfig) -> Result<StationData> {
    let file = netcdf::open(path)?;

    let nsta = dimension_len(&file, "numStations")?;
    let namelen = dimension_len(&file, "stationNameLen")?;

    let x_var = variable(&file, "stationXCoordinate")?;
    let epsg = match int_attribute(&x_var, "HorizontalProjectionEPSG") {
        Some(code) => u32::try_from(code)
            .map_err(|_| HmdfError::InvalidData(format!("invalid EPSG code {}", code)))?,
        None => config.default_epsg,
    };
    let x: Vec<f64> = x_var.get_values(..)?;
    let y: Vec<f64> = variable(&file, "stationYCoordinate")?.get_values(..)?;
    check_len("stationXCoordinate", x.len(), nsta)?;
    check_len("stationYCoordinate", y.len(), nsta)?;
    let raw_names = variable(&file, "stationName")?.get_raw_values(..)?;
    let names = split_names(&raw_names, namelen, nsta);

    let epoch = Date::default();
    let mut stations = Vec::with_capacity(nsta);
    for i in 0..nsta {
        let time_var = variable(&file, &format!("time_station_{:04}", i + 1))?;
        let data_var = variable(&file, &format!("data_station_{:04}", i + 1))?;

        let reference = match text_attribute(&time_var, "referenceDate").as_str() {
            "none" => epoch,
            text => Date::from_string(text, DEFAULT_DATE_FORMAT)
                .or_else(|_| Date::from_string(text, "%Y-%m-%d"))?,
        };

        let mut s = Station::with_epsg(i, x[i], y[i], epsg);
        s.set_name(names[i].clone());
        s.set_datum(text_attribute(&data_var, "datum"));
        s.set_units(text_attribute(&data_var, "units"));
        s.set_timezone(text_attribute(&time_var, "timezone"));

        let seconds: Vec<i64> = time_var.get_values(..)?;
        let values: Vec<f64> = data_var.get_values(..)?;
        if seconds.len() != values.len() {
            return Err(HmdfError::InvalidData(format!(
                "station {} has {} times and {} values",
                i + 1,
                seconds.len(),
                values.len()
            )));
        }
        s.extend(
            seconds
                .iter()
                .zip(&values)
                .map(|(&t, &v)| Timepoint::scalar(reference + t, config.filter_null(v))),
        );
        stations.push(s);
    }

    info!("Read {} generic netCDF stations from {}", nsta, path.display());
    Ok(StationData {
        header: Vec::new(),
        stations,
        epsg: Some(epsg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmdf::HmdfData;
    use crate::timepoint::NULL_VALUE;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn coldstart() -> Date {
        Date::new(2019, 2, 5, 0, 0, 0).unwrap()
    }

    fn name_bytes(names: &[&str], width: usize) -> Vec<u8> {
        let mut raw = vec![b' '; names.len() * width];
        for (i, name) in names.iter().enumerate() {
            raw[i * width..i * width + name.len()].copy_from_slice(name.as_bytes());
        }
        raw
    }

    /// ADCIRC station file with two stations and three snaps.
    fn write_adcirc(
        dir: &TempDir,
        file_name: &str,
        variables: &[&str],
        n_x: usize,
    ) -> std::result::Result<PathBuf, netcdf::Error> {
        let path = dir.path().join(file_name);
        let mut file = netcdf::create(&path)?;
        file.add_attribute("slam0", -90.0f64)?;
        file.add_dimension("time", 3)?;
        file.add_dimension("station", 2)?;
        file.add_dimension("namelen", 8)?;
        file.add_dimension("xlen", n_x)?;

        file.add_variable::<f64>("time", &["time"])?
            .put_values(&[3600.0, 7200.0, 10800.0], ..)?;
        file.add_variable::<f64>("x", &["xlen"])?
            .put_values(&vec![-90.0; n_x], ..)?;
        file.add_variable::<f64>("y", &["station"])?
            .put_values(&[29.0, 29.5], ..)?;
        file.add_variable::<u8>("station_name", &["station", "namelen"])?
            .put_values(&name_bytes(&["GAUGE1", "GAUGE2"], 8), ..)?;

        for (k, name) in variables.iter().enumerate() {
            let base = 10.0 * (k + 1) as f64;
            let values = [base, -99999.0, base + 1.0, base + 2.0, base + 3.0, base + 4.0];
            file.add_variable::<f64>(name, &["time", "station"])?
                .put_values(&values, ..)?;
        }
        Ok(path)
    }

    fn read(path: &PathBuf) -> Result<HmdfData> {
        let mut data = HmdfData::new(path, coldstart(), None::<PathBuf>);
        data.read()?;
        Ok(data)
    }

    #[test]
    fn test_split_names() {
        let raw = b"GAUGE1\0\0ab      ";
        assert_eq!(split_names(raw, 8, 2), vec!["GAUGE1", "ab"]);
        assert_eq!(split_names(raw, 8, 3)[2], "");
    }

    #[test]
    fn test_adcirc_scalar_with_nulls() {
        let dir = TempDir::new().unwrap();
        let path = write_adcirc(&dir, "fort.61.nc", &["zeta"], 2).unwrap();
        assert_eq!(FileType::detect(&path).unwrap(), FileType::AdcircNetCdf);

        let data = read(&path).unwrap();
        assert_eq!(data.n_stations(), 2);
        assert_eq!(data.dimension(), 1);

        let s = data.station(1).unwrap();
        assert_eq!(s.name(), "GAUGE2");
        assert_eq!(s.id(), "2");
        assert_eq!(s.y(), 29.5);
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].value(), NULL_VALUE);
        assert_eq!(s[2].value(), 14.0);
        assert_eq!(s[2].date(), coldstart() + 10800_i64);
    }

    #[test]
    fn test_adcirc_wind_is_two_components() {
        let dir = TempDir::new().unwrap();
        let path = write_adcirc(&dir, "fort.72.nc", &["windx", "windy"], 2).unwrap();

        let data = read(&path).unwrap();
        assert_eq!(data.dimension(), 2);
        let p = &data.station(0).unwrap()[1];
        assert_eq!(p.values(), &[11.0, 21.0]);
    }

    #[test]
    fn test_adcirc_detection_order() {
        let dir = TempDir::new().unwrap();
        let path = write_adcirc(&dir, "mixed.nc", &["pressure", "zeta"], 2).unwrap();

        let data = read(&path).unwrap();
        assert_eq!(data.dimension(), 1);
        // zeta is preferred over pressure
        assert_eq!(data.station(0).unwrap()[0].value(), 20.0);
    }

    #[test]
    fn test_adcirc_missing_data_variable() {
        let dir = TempDir::new().unwrap();
        let path = write_adcirc(&dir, "empty.nc", &[], 2).unwrap();
        let err = read(&path).unwrap_err();
        assert!(matches!(err, HmdfError::MissingVariable(_)), "{}", err);
    }

    #[test]
    fn test_adcirc_short_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write_adcirc(&dir, "short.nc", &["zeta"], 1).unwrap();
        let err = read(&path).unwrap_err();
        assert!(matches!(err, HmdfError::InvalidData(_)), "{}", err);
    }

    fn write_generic(dir: &TempDir, n_x: usize) -> std::result::Result<PathBuf, netcdf::Error> {
        let path = dir.path().join("obs.nc");
        let mut file = netcdf::create(&path)?;
        file.add_dimension("numStations", 2)?;
        file.add_dimension("stationNameLen", 8)?;
        file.add_dimension("xlen", n_x)?;
        file.add_dimension("stationLength_0001", 2)?;
        file.add_dimension("stationLength_0002", 1)?;

        let mut x = file.add_variable::<f64>("stationXCoordinate", &["xlen"])?;
        x.put_attribute("HorizontalProjectionEPSG", 26915i32)?;
        x.put_values(&vec![792_271.0; n_x], ..)?;
        file.add_variable::<f64>("stationYCoordinate", &["numStations"])?
            .put_values(&[3_211_697.0, 3_300_000.0], ..)?;
        file.add_variable::<u8>("stationName", &["numStations", "stationNameLen"])?
            .put_values(&name_bytes(&["8761724", "8760922"], 8), ..)?;

        let mut t = file.add_variable::<i64>("time_station_0001", &["stationLength_0001"])?;
        t.put_attribute("referenceDate", "2019-02-05 00:00:00")?;
        t.put_attribute("timezone", "UTC")?;
        t.put_values(&[0i64, 360], ..)?;
        let mut d = file.add_variable::<f64>("data_station_0001", &["stationLength_0001"])?;
        d.put_attribute("datum", "NAVD88")?;
        d.put_attribute("units", "m")?;
        d.put_values(&[0.25, -99999.0], ..)?;

        let mut t = file.add_variable::<i64>("time_station_0002", &["stationLength_0002"])?;
        t.put_attribute("referenceDate", "2019-02-06")?;
        t.put_values(&[60i64], ..)?;
        file.add_variable::<f64>("data_station_0002", &["stationLength_0002"])?
            .put_values(&[0.5], ..)?;
        Ok(path)
    }

    #[test]
    fn test_generic_attributes() {
        let dir = TempDir::new().unwrap();
        let path = write_generic(&dir, 2).unwrap();
        assert_eq!(FileType::detect(&path).unwrap(), FileType::GenericNetCdf);

        let data = read(&path).unwrap();
        assert_eq!(data.epsg(), 26915);

        let s = data.station(0).unwrap();
        assert_eq!(s.name(), "8761724");
        assert_eq!(s.epsg(), 26915);
        assert_eq!(s.datum(), "NAVD88");
        assert_eq!(s.units(), "m");
        assert_eq!(s.timezone(), "UTC");
        assert_eq!(s[1].date(), coldstart() + 360_i64);
        assert_eq!(s[1].value(), NULL_VALUE);

        let s = data.station(1).unwrap();
        assert_eq!(s.datum(), "none");
        assert_eq!(s.timezone(), "none");
        assert_eq!(s[0].date(), Date::new(2019, 2, 6, 0, 1, 0).unwrap());
    }

    #[test]
    fn test_generic_short_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write_generic(&dir, 1).unwrap();
        let err = read(&path).unwrap_err();
        assert!(matches!(err, HmdfError::InvalidData(_)), "{}", err);
    }
}
