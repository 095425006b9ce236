//! ADCIRC ASCII station output (`fort.61`, `fort.62`, `fort.71`, `fort.72`).

use std::path::Path;

use tracing::{debug, info, warn};

use super::{LineReader, StationData, split_tokens};
use crate::config::ReaderConfig;
use crate::date::Date;
use crate::error::{HmdfError, Result};
use crate::station::Station;
use crate::timepoint::Timepoint;

/// Read an ADCIRC station location file.
///
/// The first token of the first line is the station count, followed by one
/// `x, y` pair per line.
pub fn read_station_file(path: &Path) -> Result<Vec<(f64, f64)>> {
    let mut reader = LineReader::open(path)?;

    let first = reader.expect_line("station count")?;
    let tokens = split_tokens(&first);
    let nsta: usize = reader.token(&tokens, 0, "station count")?;

    let mut locations = Vec::with_capacity(nsta);
    for _ in 0..nsta {
        let line = reader.expect_line("station location")?;
        let tokens = split_tokens(&line);
        let x: f64 = reader.token(&tokens, 0, "x coordinate")?;
        let y: f64 = reader.token(&tokens, 1, "y coordinate")?;
        locations.push((x, y));
    }

    debug!("Read {} station locations from {}", nsta, path.display());
    Ok(locations)
}

/// Read an ADCIRC ASCII station output file.
///
/// Record times are seconds after `coldstart`. Without `station_file` all
/// stations are placed at (0, 0).
pub fn read_adcirc_ascii(
    path: &Path,
    coldstart: Date,
    station_file: Option<&Path>,
    config: &ReaderConfig,
) -> Result<StationData> {
    let locations = match station_file {
        Some(f) => Some(read_station_file(f)?),
        None => {
            warn!(
                "No station file given for {}; stations are placed at (0, 0)",
                path.display()
            );
            None
        }
    };

    let mut reader = LineReader::open(path)?;
    let header = reader.expect_line("header line")?;

    let line = reader.expect_line("metadata line")?;
    let tokens = split_tokens(&line);
    let nstep: usize = reader.token(&tokens, 0, "number of records")?;
    let nsta: usize = reader.token(&tokens, 1, "number of stations")?;
    let dt: f64 = reader.token(&tokens, 2, "output interval")?;
    let _dit: i64 = reader.token(&tokens, 3, "output step interval")?;
    let dim: usize = reader.token(&tokens, 4, "record dimension")?;
    if !(1..=3).contains(&dim) {
        return Err(reader.error(format!("record dimension must be 1, 2 or 3, got {}", dim)));
    }
    debug!(
        "ADCIRC header: {} records, {} stations, dt = {} s, dimension {}",
        nstep, nsta, dt, dim
    );

    if let Some(loc) = &locations {
        if loc.len() != nsta {
            return Err(HmdfError::StationCountMismatch {
                station_file: loc.len(),
                data_file: nsta,
            });
        }
    }

    let mut stations: Vec<Station> = (0..nsta)
        .map(|i| {
            let (x, y) = locations.as_ref().map_or((0.0, 0.0), |l| l[i]);
            let mut s = Station::with_epsg(i, x, y, config.default_epsg);
            s.set_id((i + 1).to_string());
            s.reserve(nstep);
            s
        })
        .collect();

    let mut record = Vec::with_capacity(nsta);
    let mut complete = 0usize;
    'records: for _ in 0..nstep {
        let Some(line) = reader.next_line()? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }
        let tokens = split_tokens(&line);
        let seconds: f64 = reader.token(&tokens, 0, "record time")?;
        let date = coldstart + seconds;

        record.clear();
        for _ in 0..nsta {
            let Some(line) = reader.next_line()? else {
                break 'records;
            };
            let tokens = split_tokens(&line);
            if tokens.len() < dim + 1 && reader.at_eof() {
                break 'records;
            }
            let mut values = Vec::with_capacity(dim);
            for k in 0..dim {
                let v: f64 = reader.token(&tokens, k + 1, "station value")?;
                values.push(config.filter_null(v));
            }
            record.push(Timepoint::new(date, values));
        }

        for (station, point) in stations.iter_mut().zip(record.drain(..)) {
            station.push(point);
        }
        complete += 1;
    }

    if complete < nstep {
        warn!(
            "{} ends after {} of {} records (line {})",
            path.display(),
            complete,
            nstep,
            reader.line_no()
        );
    }
    info!(
        "Read {} stations with {} records from {}",
        nsta,
        complete,
        path.display()
    );

    Ok(StationData {
        header: vec![header],
        stations,
        epsg: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timepoint::NULL_VALUE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn coldstart() -> Date {
        Date::new(2019, 2, 5, 0, 0, 0).unwrap()
    }

    fn station_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2 ! stations").unwrap();
        writeln!(file, "-90.0, 29.0").unwrap();
        writeln!(file, "-89.5 29.25").unwrap();
        file
    }

    #[test]
    fn test_read_station_file() {
        let file = station_file();
        let loc = read_station_file(file.path()).unwrap();
        assert_eq!(loc, vec![(-90.0, 29.0), (-89.5, 29.25)]);
    }

    #[test]
    fn test_station_file_too_short() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "3").unwrap();
        writeln!(file, "-90.0, 29.0").unwrap();
        let err = read_station_file(file.path()).unwrap_err();
        assert!(matches!(err, HmdfError::Parse { line: 3, .. }), "{}", err);
    }

    #[test]
    fn test_read_scalar_output() {
        let stations = station_file();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "run header").unwrap();
        writeln!(file, "2 2 360.0 1 1").unwrap();
        writeln!(file, "360.0 1").unwrap();
        writeln!(file, "1 0.25").unwrap();
        writeln!(file, "2 -99999.0").unwrap();
        writeln!(file, "720.0 2").unwrap();
        writeln!(file, "1 0.3100E+00").unwrap();
        writeln!(file, "2 0.12").unwrap();

        let data = read_adcirc_ascii(
            file.path(),
            coldstart(),
            Some(stations.path()),
            &ReaderConfig::default(),
        )
        .unwrap();

        assert_eq!(data.header, vec!["run header".to_string()]);
        assert_eq!(data.stations.len(), 2);
        let s = &data.stations[0];
        assert_eq!(s.len(), 2);
        assert_eq!(s.x(), -90.0);
        assert_eq!(s.id(), "1");
        assert_eq!(s[0].date().to_string(), "2019-02-05 00:06:00");
        assert_eq!(s[1].value(), 0.31);
        assert_eq!(data.stations[1][0].value(), NULL_VALUE);
    }

    #[test]
    fn test_read_vector_output_without_station_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "wind").unwrap();
        writeln!(file, "1 1 60.0 1 2").unwrap();
        writeln!(file, "60.0 1").unwrap();
        writeln!(file, "1 3.0 4.0").unwrap();

        let data = read_adcirc_ascii(file.path(), coldstart(), None, &ReaderConfig::default()).unwrap();
        let s = &data.stations[0];
        assert_eq!((s.x(), s.y()), (0.0, 0.0));
        assert_eq!(s.dimension(), 2);
        assert_eq!(s[0].magnitude(), 5.0);
    }

    #[test]
    fn test_station_count_mismatch() {
        let stations = station_file();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "1 3 60.0 1 1").unwrap();

        let err = read_adcirc_ascii(
            file.path(),
            coldstart(),
            Some(stations.path()),
            &ReaderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HmdfError::StationCountMismatch {
                station_file: 2,
                data_file: 3
            }
        ));
    }

    #[test]
    fn test_truncated_file_keeps_complete_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "5 2 60.0 1 1").unwrap();
        writeln!(file, "60.0 1").unwrap();
        writeln!(file, "1 0.1").unwrap();
        writeln!(file, "2 0.2").unwrap();
        writeln!(file, "120.0 2").unwrap();
        writeln!(file, "1 0.3").unwrap();

        let data = read_adcirc_ascii(file.path(), coldstart(), None, &ReaderConfig::default()).unwrap();
        assert_eq!(data.stations[0].len(), 1);
        assert_eq!(data.stations[1].len(), 1);
    }

    #[test]
    fn test_partial_last_line_keeps_complete_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "5 2 60.0 1 1").unwrap();
        writeln!(file, "60.0 1").unwrap();
        writeln!(file, "1 0.1").unwrap();
        writeln!(file, "2 0.2").unwrap();
        writeln!(file, "120.0 2").unwrap();
        write!(file, "1").unwrap();

        let data = read_adcirc_ascii(file.path(), coldstart(), None, &ReaderConfig::default()).unwrap();
        assert_eq!(data.stations[0].len(), 1);
        assert_eq!(data.stations[1].len(), 1);
        assert_eq!(data.stations[1][0].value(), 0.2);
    }

    #[test]
    fn test_short_line_before_eof_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "1 2 60.0 1 1").unwrap();
        writeln!(file, "60.0 1").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "2 0.2").unwrap();

        let err = read_adcirc_ascii(file.path(), coldstart(), None, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, HmdfError::Parse { line: 4, .. }), "{}", err);
    }

    #[test]
    fn test_bad_dimension() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "1 1 60.0 1 4").unwrap();
        let err = read_adcirc_ascii(file.path(), coldstart(), None, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, HmdfError::Parse { line: 2, .. }));
    }
}
