//! IMEDS observation format.
//!
//! Three header lines, then per station a `name latitude longitude` line
//! followed by `yyyy mm dd hh mm [ss] value` data lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use super::{LineReader, StationData, split_tokens};
use crate::config::ReaderConfig;
use crate::date::Date;
use crate::error::Result;
use crate::projection;
use crate::station::Station;
use crate::timepoint::Timepoint;

/// Value written in place of nulls.
pub const IMEDS_NULL: f64 = -99999.0;

const IMEDS_EPSG: u32 = 4326;

const DEFAULT_HEADER: [&str; 3] = [
    "% IMEDS generic format - Water Level",
    "% year month day hour min sec watl(m)",
    "HMDF HMDF",
];

/// Parse a data line; `None` when the line is not a data record.
fn parse_record(tokens: &[&str]) -> Option<([u32; 5], u32, f64)> {
    let (second, value) = match tokens.len() {
        7 => (tokens[5].parse().ok()?, tokens[6].parse().ok()?),
        6 => (0, tokens[5].parse().ok()?),
        _ => return None,
    };
    let mut ymdhm = [0u32; 5];
    for (slot, token) in ymdhm.iter_mut().zip(tokens) {
        *slot = token.parse().ok()?;
    }
    Some((ymdhm, second, value))
}

/// Read an IMEDS file. Stations are created in EPSG:4326.
pub fn read_imeds(path: &Path, config: &ReaderConfig) -> Result<StationData> {
    let mut reader = LineReader::open(path)?;

    let mut header = Vec::with_capacity(3);
    for _ in 0..3 {
        header.push(reader.expect_line("IMEDS header line")?);
    }

    let mut stations: Vec<Station> = Vec::new();
    while let Some(line) = reader.next_line()? {
        let tokens = split_tokens(&line);
        if tokens.is_empty() {
            continue;
        }

        if let Some((ymdhm, second, value)) = parse_record(&tokens) {
            let [year, month, day, hour, minute] = ymdhm;
            let date = Date::new(year as i32, month, day, hour, minute, second)?;
            let station = stations
                .last_mut()
                .ok_or_else(|| reader.error("data line before the first station line"))?;
            station.push(Timepoint::scalar(date, config.filter_null(value)));
            continue;
        }

        let latitude: f64 = reader.token(&tokens, 1, "station latitude")?;
        let longitude: f64 = reader.token(&tokens, 2, "station longitude")?;
        let mut station = Station::with_epsg(stations.len(), longitude, latitude, IMEDS_EPSG);
        station.set_name(tokens[0]);
        debug!("IMEDS station {} at line {}", tokens[0], reader.line_no());
        stations.push(station);
    }

    info!("Read {} IMEDS stations from {}", stations.len(), path.display());
    Ok(StationData {
        header,
        stations,
        epsg: Some(IMEDS_EPSG),
    })
}

/// Write stations in IMEDS format.
///
/// `header` is used when it holds exactly three lines; otherwise a generic
/// water level header is written. Only the first component of each sample
/// is written and nulls become `-99999`.
pub fn write_imeds(path: &Path, header: &[String], stations: &[Station]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    if header.len() == 3 {
        for line in header {
            writeln!(out, "{}", line)?;
        }
    } else {
        for line in DEFAULT_HEADER {
            writeln!(out, "{}", line)?;
        }
    }

    for station in stations {
        let (lon, lat) = if station.epsg() == IMEDS_EPSG {
            (station.x(), station.y())
        } else {
            projection::transform(
                station.epsg_original(),
                IMEDS_EPSG,
                station.x_original(),
                station.y_original(),
            )?
        };

        let name: String = station
            .name()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        writeln!(out, "{} {:.6} {:.6}", name, lat, lon)?;

        for point in station {
            let d = point.date();
            let value = if point.is_null(0) { IMEDS_NULL } else { point.value() };
            writeln!(
                out,
                "{:04} {:02} {:02} {:02} {:02} {:02} {:.6}",
                d.year(),
                d.month(),
                d.day(),
                d.hour(),
                d.minute(),
                d.second(),
                value
            )?;
        }
    }

    out.flush()?;
    info!("Wrote {} IMEDS stations to {}", stations.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HmdfError;
    use crate::timepoint::NULL_VALUE;
    use tempfile::NamedTempFile;

    fn write_sample(file: &mut NamedTempFile) {
        writeln!(file, "% IMEDS generic format - Water Level").unwrap();
        writeln!(file, "% year month day hour min sec watl(m)").unwrap();
        writeln!(file, "NOAA NOAA").unwrap();
        writeln!(file, "8761724 29.2633 -89.9567").unwrap();
        writeln!(file, "2019 02 05 00 00 00 0.2500").unwrap();
        writeln!(file, "2019 02 05 00 06 00 -99999.0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "8760922 28.9322 -89.4075").unwrap();
        writeln!(file, "2019 02 05 00 00 0.1000").unwrap();
    }

    #[test]
    fn test_read_imeds() {
        let mut file = NamedTempFile::new().unwrap();
        write_sample(&mut file);

        let data = read_imeds(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(data.header.len(), 3);
        assert_eq!(data.header[2], "NOAA NOAA");
        assert_eq!(data.epsg, Some(4326));
        assert_eq!(data.stations.len(), 2);

        let s = &data.stations[0];
        assert_eq!(s.name(), "8761724");
        assert_eq!(s.latitude(), 29.2633);
        assert_eq!(s.longitude(), -89.9567);
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].value(), NULL_VALUE);
        assert_eq!(s[1].date().minute(), 6);

        let s = &data.stations[1];
        assert_eq!(s.index(), 1);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].date().second(), 0);
    }

    #[test]
    fn test_short_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "% only one line").unwrap();
        let err = read_imeds(file.path(), &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, HmdfError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_bad_station_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a\nb\nc").unwrap();
        writeln!(file, "station north east").unwrap();
        let err = read_imeds(file.path(), &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, HmdfError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_write_then_read() {
        let mut input = NamedTempFile::new().unwrap();
        write_sample(&mut input);
        let data = read_imeds(input.path(), &ReaderConfig::default()).unwrap();

        let output = NamedTempFile::new().unwrap();
        write_imeds(output.path(), &data.header, &data.stations).unwrap();
        let text = std::fs::read_to_string(output.path()).unwrap();
        assert!(text.contains("8761724 29.263300 -89.956700\n"));
        assert!(text.contains("2019 02 05 00 06 00 -99999.000000\n"));

        let back = read_imeds(output.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(back.stations.len(), 2);
        assert_eq!(back.stations[0][1].value(), NULL_VALUE);
        assert_eq!(back.stations[1][0].value(), 0.1);
    }

    #[test]
    fn test_write_default_header_and_reprojected_station() {
        let mut station = Station::new(0, -90.0, 29.0);
        station.set_name("gauge one");
        station.push(Timepoint::scalar(Date::new(2020, 1, 1, 0, 0, 0).unwrap(), 1.5));
        station.reproject(26915).unwrap();

        let output = NamedTempFile::new().unwrap();
        write_imeds(output.path(), &[], &[station]).unwrap();
        let text = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], DEFAULT_HEADER[0]);
        assert_eq!(lines[3], "gauge_one 29.000000 -90.000000");
        assert_eq!(lines[4], "2020 01 01 00 00 00 1.500000");
    }
}
