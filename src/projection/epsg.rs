//! Built-in EPSG registry and point transformation.

use super::{CoordinateProjection, Ellipsoid, ProjectionError, UtmProjection, WebMercator};

/// A coordinate reference system known to the registry.
#[derive(Debug, Clone, Copy)]
pub enum Crs {
    /// Longitude/latitude in degrees
    Geographic,
    /// Universal Transverse Mercator
    Utm(UtmProjection),
    /// Spherical mercator
    WebMercator,
}

impl Crs {
    /// Convert (x, y) in this system to (lon, lat).
    fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Crs::Geographic => (x, y),
            Crs::Utm(p) => {
                let (lat, lon) = p.xy_to_geo(x, y);
                (lon, lat)
            }
            Crs::WebMercator => {
                let (lat, lon) = WebMercator.xy_to_geo(x, y);
                (lon, lat)
            }
        }
    }

    /// Convert (lon, lat) to (x, y) in this system.
    fn from_geographic(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Crs::Geographic => (lon, lat),
            Crs::Utm(p) => p.geo_to_xy(lat, lon),
            Crs::WebMercator => WebMercator.geo_to_xy(lat, lon),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }
}

/// Registry entry for one EPSG code.
#[derive(Debug, Clone)]
pub struct EpsgEntry {
    pub code: u32,
    pub name: String,
    pub crs: Crs,
}

/// Look up an EPSG code.
pub fn lookup(code: u32) -> Option<EpsgEntry> {
    let (name, crs) = match code {
        4326 => ("WGS 84".to_string(), Crs::Geographic),
        4269 => ("NAD83".to_string(), Crs::Geographic),
        3857 => ("WGS 84 / Pseudo-Mercator".to_string(), Crs::WebMercator),
        32601..=32660 => {
            let zone = (code - 32600) as u8;
            (
                format!("WGS 84 / UTM zone {}N", zone),
                Crs::Utm(UtmProjection::new(zone, true, Ellipsoid::WGS84)),
            )
        }
        32701..=32760 => {
            let zone = (code - 32700) as u8;
            (
                format!("WGS 84 / UTM zone {}S", zone),
                Crs::Utm(UtmProjection::new(zone, false, Ellipsoid::WGS84)),
            )
        }
        26901..=26923 => {
            let zone = (code - 26900) as u8;
            (
                format!("NAD83 / UTM zone {}N", zone),
                Crs::Utm(UtmProjection::new(zone, true, Ellipsoid::GRS80)),
            )
        }
        _ => return None,
    };
    Some(EpsgEntry { code, name, crs })
}

pub fn contains_epsg(code: u32) -> bool {
    lookup(code).is_some()
}

/// Human readable name of an EPSG code.
pub fn epsg_description(code: u32) -> Result<String, ProjectionError> {
    lookup(code)
        .map(|e| e.name)
        .ok_or(ProjectionError::UnknownEpsg(code))
}

fn resolve(epsg_in: u32, epsg_out: u32) -> Result<(Crs, Crs), ProjectionError> {
    let src = lookup(epsg_in).ok_or(ProjectionError::UnknownEpsg(epsg_in))?;
    let dst = lookup(epsg_out).ok_or(ProjectionError::UnknownEpsg(epsg_out))?;
    Ok((src.crs, dst.crs))
}

/// Transform a single point from `epsg_in` to `epsg_out`.
pub fn transform(epsg_in: u32, epsg_out: u32, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
    let (src, dst) = resolve(epsg_in, epsg_out)?;
    if epsg_in == epsg_out {
        return Ok((x, y));
    }
    let (lon, lat) = src.to_geographic(x, y);
    Ok(dst.from_geographic(lon, lat))
}

/// Transform a set of points; returns the new x and y vectors.
pub fn transform_many(
    epsg_in: u32,
    epsg_out: u32,
    x: &[f64],
    y: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
    if x.len() != y.len() {
        return Err(ProjectionError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(ProjectionError::EmptyInput);
    }

    let (src, dst) = resolve(epsg_in, epsg_out)?;
    if epsg_in == epsg_out {
        return Ok((x.to_vec(), y.to_vec()));
    }

    Ok(x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let (lon, lat) = src.to_geographic(xi, yi);
            dst.from_geographic(lon, lat)
        })
        .unzip())
}
