//! Geodesy utilities
//!
//! Projects WGS84 geodetic coordinates onto the Universal Transverse Mercator (UTM) grid. The
//! series expansion used is the one given in USGS Professional Paper 1395 (Snyder), which is
//! accurate to well under a millimetre within a zone.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// WGS84 semi-major axis
const WGS84_A_M: f64 = 6_378_137.0;

/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM central meridian scale factor
const UTM_K0: f64 = 0.9996;

/// False easting applied to every zone
const UTM_FALSE_EASTING_M: f64 = 500_000.0;

/// False northing applied in the southern hemisphere
const UTM_FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;

/// Southern limit of the UTM grid
const UTM_MIN_LAT_DEG: f64 = -80.0;

/// Northern limit of the UTM grid
const UTM_MAX_LAT_DEG: f64 = 84.0;

/// Latitude band letters from 80S to 84N, 8 degrees each (X is 12 degrees).
const UTM_BANDS: &[u8] = b"CDEFGHJKLMNPQRSTUVWXX";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the UTM grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmPoint {
    pub easting_m: f64,
    pub northing_m: f64,
    pub altitude_m: f64,
    pub zone: u8,
    pub band: char,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum UtmError {
    #[error("Latitude {0} deg is outside the UTM grid (80S to 84N)")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} deg is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Project a WGS84 latitude/longitude (degrees) onto the UTM grid.
///
/// The zone is selected with the standard rules, including the Norway and Svalbard exceptions.
pub fn lat_lon_to_utm(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Result<UtmPoint, UtmError> {
    if !(UTM_MIN_LAT_DEG..=UTM_MAX_LAT_DEG).contains(&lat_deg) {
        return Err(UtmError::LatitudeOutOfRange(lat_deg));
    }
    if !(-180.0..=180.0).contains(&lon_deg) {
        return Err(UtmError::LongitudeOutOfRange(lon_deg));
    }

    let zone = zone_number(lat_deg, lon_deg);
    let lon_origin_deg = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let lat = lat_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let tan_lat = lat.tan();

    let n = WGS84_A_M / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * (lon_deg - lon_origin_deg).to_radians();

    // Meridional arc length
    let m = WGS84_A_M * (
        (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin()
    );

    let easting_m = UTM_K0 * n * (
        a
        + (1.0 - t + c) * a.powi(3) / 6.0
        + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0
    ) + UTM_FALSE_EASTING_M;

    let mut northing_m = UTM_K0 * (
        m + n * tan_lat * (
            a * a / 2.0
            + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
            + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0
        )
    );

    if lat_deg < 0.0 {
        northing_m += UTM_FALSE_NORTHING_SOUTH_M;
    }

    Ok(UtmPoint {
        easting_m,
        northing_m,
        altitude_m: alt_m,
        zone,
        band: band_letter(lat_deg),
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn zone_number(lat_deg: f64, lon_deg: f64) -> u8 {
    // Norway
    if (56.0..64.0).contains(&lat_deg) && (3.0..12.0).contains(&lon_deg) {
        return 32;
    }

    // Svalbard
    if (72.0..=84.0).contains(&lat_deg) && lon_deg >= 0.0 {
        if lon_deg < 9.0 {
            return 31;
        } else if lon_deg < 21.0 {
            return 33;
        } else if lon_deg < 33.0 {
            return 35;
        } else if lon_deg < 42.0 {
            return 37;
        }
    }

    // 180 deg belongs to zone 60 rather than wrapping into a 61st zone
    (((lon_deg + 180.0) / 6.0).floor() as u8 + 1).min(60)
}

fn band_letter(lat_deg: f64) -> char {
    let idx = ((lat_deg - UTM_MIN_LAT_DEG) / 8.0).floor() as usize;
    UTM_BANDS[idx.min(UTM_BANDS.len() - 1)] as char
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_meridian_on_equator() {
        // Zone 31 is centred on 3E
        let p = lat_lon_to_utm(0.0, 3.0, 12.0).unwrap();

        assert_eq!(p.zone, 31);
        assert_eq!(p.band, 'N');
        assert_relative_eq!(p.easting_m, 500_000.0, epsilon = 1e-6);
        assert_relative_eq!(p.northing_m, 0.0, epsilon = 1e-6);
        assert_eq!(p.altitude_m, 12.0);
    }

    #[test]
    fn test_hemispheres_and_symmetry() {
        let north = lat_lon_to_utm(10.0, 4.0, 0.0).unwrap();
        let south = lat_lon_to_utm(-10.0, 4.0, 0.0).unwrap();

        // Mirror images about the equator, offset by the southern false northing
        assert_relative_eq!(north.easting_m, south.easting_m, epsilon = 1e-6);
        assert_relative_eq!(
            north.northing_m,
            UTM_FALSE_NORTHING_SOUTH_M - south.northing_m,
            epsilon = 1e-6
        );

        // Mirror images about the central meridian
        let west = lat_lon_to_utm(10.0, 2.0, 0.0).unwrap();
        assert_relative_eq!(
            north.easting_m - 500_000.0,
            500_000.0 - west.easting_m,
            epsilon = 1e-6
        );
        assert_relative_eq!(north.northing_m, west.northing_m, epsilon = 1e-6);
    }

    #[test]
    fn test_known_point() {
        // One degree of latitude along the central meridian is about 110.6 km at the equator
        let p = lat_lon_to_utm(1.0, 3.0, 0.0).unwrap();
        assert_relative_eq!(p.northing_m, 0.9996 * 110_574.4, epsilon = 5.0);
    }

    #[test]
    fn test_small_offsets_are_metric() {
        // A ~100 m offset north should appear as ~100 m of northing. Easting also drifts a little
        // away from the central meridian due to grid convergence, so it isn't checked here.
        let a = lat_lon_to_utm(52.0, 1.0, 0.0).unwrap();
        let b = lat_lon_to_utm(52.0 + 100.0 / 111_250.0, 1.0, 0.0).unwrap();
        assert_relative_eq!(b.northing_m - a.northing_m, 100.0, epsilon = 0.5);
    }

    #[test]
    fn test_zone_exceptions() {
        assert_eq!(lat_lon_to_utm(60.0, 5.0, 0.0).unwrap().zone, 32);
        assert_eq!(lat_lon_to_utm(78.0, 15.0, 0.0).unwrap().zone, 33);
        assert_eq!(lat_lon_to_utm(0.0, 180.0, 0.0).unwrap().zone, 60);
        assert_eq!(lat_lon_to_utm(0.0, -180.0, 0.0).unwrap().zone, 1);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            lat_lon_to_utm(85.0, 0.0, 0.0),
            Err(UtmError::LatitudeOutOfRange(85.0))
        );
        assert_eq!(
            lat_lon_to_utm(0.0, 190.0, 0.0),
            Err(UtmError::LongitudeOutOfRange(190.0))
        );
    }
}
