//! Coordinate projection utilities for station locations.
//!
//! Provides transformations between geographic coordinates (lat/lon) and
//! projected Cartesian coordinates (meters), plus an EPSG registry used by
//! [`transform`] to move station coordinates between reference systems.
//!
//! # Supported Projections
//!
//! - **CppProjection**: ADCIRC Carte Parallélogrammatique (equirectangular about a reference point)
//! - **UtmProjection**: Universal Transverse Mercator on any ellipsoid (Krüger series)
//! - **WebMercator**: Spherical "pseudo" Mercator (EPSG:3857)
//!
//! Coordinates passed to [`transform`] use GIS axis order: `x` is easting or
//! longitude, `y` is northing or latitude.
//!
//! # Example
//!
//! ```
//! use hmdf::projection::transform;
//!
//! let (x, y) = transform(4326, 26915, -90.0, 29.0).unwrap();
//! assert!((x - 792_271.071).abs() < 0.01);
//! assert!((y - 3_211_697.373).abs() < 0.01);
//! ```

mod epsg;

pub use epsg::{Crs, EpsgEntry, contains_epsg, epsg_description, lookup, transform, transform_many};

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use thiserror::Error;

/// Error type for projection operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// EPSG code not in the registry
    #[error("Unknown EPSG code: {0}")]
    UnknownEpsg(u32),

    /// Coordinate arrays of different length
    #[error("Coordinate arrays differ in length: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },

    /// Nothing to transform
    #[error("No coordinates to transform")]
    EmptyInput,
}

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Equatorial radius in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// Polar radius.
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    pub fn eccentricity(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Geocentric radius at a latitude (degrees).
    pub fn radius_at(&self, lat: f64) -> f64 {
        let phi = lat.to_radians();
        let (a, b) = (self.a, self.b());
        let (s, c) = phi.sin_cos();
        let num = (a * a * c).powi(2) + (b * b * s).powi(2);
        let den = (a * c).powi(2) + (b * s).powi(2);
        (num / den).sqrt()
    }
}

/// Trait for coordinate projections.
pub trait CoordinateProjection {
    /// Convert geographic coordinates (lat, lon) to projected (x, y) in meters.
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64);

    /// Convert projected coordinates (x, y) to geographic (lat, lon).
    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64);
}

/// ADCIRC Carte Parallélogrammatique projection.
///
/// Equirectangular projection about a reference point, with the Earth
/// radius taken at the reference latitude. This is the transformation
/// ADCIRC applies internally when `ICS = 2`.
#[derive(Debug, Clone, Copy)]
pub struct CppProjection {
    /// Reference longitude in degrees
    lambda0: f64,
    /// Reference latitude in degrees
    phi0: f64,
    /// Earth radius at the reference latitude
    radius: f64,
    /// Precomputed cos(phi0)
    cos_phi0: f64,
}

impl CppProjection {
    /// Create a CPP projection about (`lambda0`, `phi0`) in degrees.
    pub fn new(lambda0: f64, phi0: f64) -> Self {
        Self {
            lambda0,
            phi0,
            radius: Ellipsoid::WGS84.radius_at(phi0),
            cos_phi0: phi0.to_radians().cos(),
        }
    }

    pub fn reference(&self) -> (f64, f64) {
        (self.lambda0, self.phi0)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl CoordinateProjection for CppProjection {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = self.radius * (lon - self.lambda0).to_radians() * self.cos_phi0;
        let y = self.radius * lat.to_radians();
        (x, y)
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.lambda0 + (x / (self.radius * self.cos_phi0)).to_degrees();
        let lat = (y / self.radius).to_degrees();
        (lat, lon)
    }
}

/// Forward CPP projection of a single point; returns (x, y).
pub fn cpp(lambda0: f64, phi0: f64, lon: f64, lat: f64) -> (f64, f64) {
    CppProjection::new(lambda0, phi0).geo_to_xy(lat, lon)
}

/// Inverse CPP projection of a single point; returns (lon, lat).
pub fn inverse_cpp(lambda0: f64, phi0: f64, x: f64, y: f64) -> (f64, f64) {
    let (lat, lon) = CppProjection::new(lambda0, phi0).xy_to_geo(x, y);
    (lon, lat)
}

/// UTM projection for a specific zone.
///
/// Uses the 6th-order Krüger series (Karney 2011), which stays well below
/// a millimetre of error across a zone.
#[derive(Debug, Clone, Copy)]
pub struct UtmProjection {
    /// Central meridian in degrees
    central_meridian: f64,
    /// Scale factor at central meridian (0.9996 for UTM)
    scale_factor: f64,
    /// False easting in meters (500,000 for UTM)
    false_easting: f64,
    /// False northing in meters (0 for northern hemisphere, 10,000,000 for southern)
    false_northing: f64,
    /// Zone number (1-60)
    zone: u8,
    /// Northern hemisphere flag
    northern: bool,
    ellipsoid: Ellipsoid,
    /// Rectifying radius
    big_a: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl UtmProjection {
    /// Create a UTM projection for a given zone and hemisphere.
    pub fn new(zone: u8, northern: bool, ellipsoid: Ellipsoid) -> Self {
        assert!((1..=60).contains(&zone), "UTM zone must be 1-60");
        let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

        let n = ellipsoid.f / (2.0 - ellipsoid.f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let big_a = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1_983_433.0 / 1_935_360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167_603.0 / 181_440.0 * n6,
            49561.0 / 161_280.0 * n4 - 179.0 / 168.0 * n5 + 6_601_661.0 / 7_257_600.0 * n6,
            34729.0 / 80640.0 * n5 - 3_418_889.0 / 1_995_840.0 * n6,
            212_378_941.0 / 319_334_400.0 * n6,
        ];

        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604_800.0 * n6,
            n2 / 48.0 + n3 / 15.0 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1_118_711.0 / 3_870_720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161_280.0 * n4 - 11.0 / 504.0 * n5 - 830_251.0 / 7_257_600.0 * n6,
            4583.0 / 161_280.0 * n5 - 108_847.0 / 3_991_680.0 * n6,
            20_648_693.0 / 638_668_800.0 * n6,
        ];

        Self {
            central_meridian,
            scale_factor: 0.9996,
            false_easting: 500_000.0,
            false_northing: if northern { 0.0 } else { 10_000_000.0 },
            zone,
            northern,
            ellipsoid,
            big_a,
            alpha,
            beta,
        }
    }

    /// Get the zone number.
    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_northern(&self) -> bool {
        self.northern
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }
}

impl CoordinateProjection for UtmProjection {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dlambda = (lon - self.central_meridian).to_radians();
        let e = self.ellipsoid.eccentricity();

        // Conformal latitude as tan(chi)
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();

        let xi_p = t.atan2(dlambda.cos());
        let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let k0a = self.scale_factor * self.big_a;
        (
            self.false_easting + k0a * eta,
            self.false_northing + k0a * xi,
        )
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let k0a = self.scale_factor * self.big_a;
        let xi = (y - self.false_northing) / k0a;
        let eta = (x - self.false_easting) / k0a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let lon = self.central_meridian + eta_p.sinh().atan2(xi_p.cos()).to_degrees();
        let lat = conformal_to_geodetic(chi, self.ellipsoid.eccentricity()).to_degrees();

        (lat, lon)
    }
}

/// Invert the conformal latitude by fixed-point iteration.
fn conformal_to_geodetic(chi: f64, e: f64) -> f64 {
    let tan_term = (FRAC_PI_4 + chi / 2.0).tan();
    let mut phi = chi;
    for _ in 0..15 {
        let es = e * phi.sin();
        let next = 2.0 * (tan_term * ((1.0 + es) / (1.0 - es)).powf(e / 2.0)).atan() - FRAC_PI_2;
        if (next - phi).abs() < 1e-15 {
            return next;
        }
        phi = next;
    }
    phi
}

/// Spherical Mercator used by web maps (EPSG:3857).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    const R: f64 = 6_378_137.0;
}

impl CoordinateProjection for WebMercator {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = Self::R * lon.to_radians();
        let y = Self::R * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / Self::R).to_degrees();
        let lat = (2.0 * (y / Self::R).exp().atan() - FRAC_PI_2).to_degrees();
        (lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_cpp_roundtrip() {
        let proj = CppProjection::new(-90.0, 29.0);
        let points = [(29.0, -90.0), (29.5, -89.2), (28.1, -91.7), (30.0, -88.0)];
        for (lat, lon) in points {
            let (x, y) = proj.geo_to_xy(lat, lon);
            let (lat2, lon2) = proj.xy_to_geo(x, y);
            assert!((lat - lat2).abs() < TOL, "lat roundtrip {} -> {}", lat, lat2);
            assert!((lon - lon2).abs() < TOL, "lon roundtrip {} -> {}", lon, lon2);
        }

        // Reference meridian maps to x = 0
        let (x, _) = cpp(-90.0, 29.0, -90.0, 29.0);
        assert!(x.abs() < TOL);
        let (lon, lat) = inverse_cpp(-90.0, 29.0, 0.0, proj.radius() * 29f64.to_radians());
        assert!((lon + 90.0).abs() < TOL);
        assert!((lat - 29.0).abs() < TOL);
    }

    #[test]
    fn test_radius_bounds() {
        let e = Ellipsoid::WGS84;
        assert!((e.radius_at(0.0) - e.a).abs() < 1e-6);
        assert!((e.radius_at(90.0) - e.b()).abs() < 1e-6);
        let r = e.radius_at(45.0);
        assert!(r < e.a && r > e.b());
    }

    #[test]
    fn test_utm_central_meridian() {
        let proj = UtmProjection::new(15, true, Ellipsoid::GRS80);
        assert_eq!(proj.central_meridian(), -93.0);
        let (x, y) = proj.geo_to_xy(0.0, -93.0);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_utm_roundtrip() {
        let proj = UtmProjection::new(32, true, Ellipsoid::WGS84);
        for (lat, lon) in [(60.39, 5.32), (63.8, 8.9), (45.0, 11.5), (1.0, 9.0)] {
            let (x, y) = proj.geo_to_xy(lat, lon);
            let (lat2, lon2) = proj.xy_to_geo(x, y);
            assert!((lat - lat2).abs() < TOL, "lat roundtrip {} -> {}", lat, lat2);
            assert!((lon - lon2).abs() < TOL, "lon roundtrip {} -> {}", lon, lon2);
        }
    }

    #[test]
    fn test_utm_southern_hemisphere() {
        let proj = UtmProjection::new(23, false, Ellipsoid::WGS84);
        let (x, y) = proj.geo_to_xy(-23.0, -45.0);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y < 10_000_000.0 && y > 7_000_000.0);
        let (lat, lon) = proj.xy_to_geo(x, y);
        assert!((lat + 23.0).abs() < TOL);
        assert!((lon + 45.0).abs() < TOL);
    }

    #[test]
    fn test_web_mercator_roundtrip() {
        let proj = WebMercator;
        let (x, y) = proj.geo_to_xy(0.0, 180.0);
        assert!((x - std::f64::consts::PI * 6_378_137.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        let (lat, lon) = proj.xy_to_geo(proj.geo_to_xy(45.0, -75.0).0, proj.geo_to_xy(45.0, -75.0).1);
        assert!((lat - 45.0).abs() < TOL);
        assert!((lon + 75.0).abs() < TOL);
    }
}
