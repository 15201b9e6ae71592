//! The two coordinate reference systems this engine understands.

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};

/// Earth radius (meters) used by the spherical Web Mercator forward/inverse
/// formulas. This is the same constant the Web Mercator (EPSG:3857) definition
/// uses; it is intentionally not the WGS84 ellipsoid radius.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A coordinate reference system identifier (SRID). Only geographic
/// (`EPSG:4326`) and Web Mercator (`EPSG:3857`) are supported; every other
/// value is a hard [`error::Error::UnsupportedSpatialReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// EPSG:4326, geographic longitude/latitude in degrees.
    Epsg4326,
    /// EPSG:3857, Web Mercator in meters. All internal raster computation
    /// happens in this CRS.
    Epsg3857,
}

impl Crs {
    pub fn from_srid(srid: u32) -> Result<Self> {
        match srid {
            4326 => Ok(Self::Epsg4326),
            3857 => Ok(Self::Epsg3857),
            _ => error::UnsupportedSpatialReference { srid }.fail(),
        }
    }

    pub fn srid(self) -> u32 {
        match self {
            Self::Epsg4326 => 4326,
            Self::Epsg3857 => 3857,
        }
    }
}

/// A point in an unspecified, ambient CRS. Kept as a flat `(x, y)` pair
/// rather than wrapping `geo_types::Coord` directly so callers are explicit
/// about which CRS they are holding a value in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Reprojects a point from `srid` into `EPSG:3857`. Identity when `srid` is
/// already `3857`. Any SRID outside `{4326, 3857}` is an
/// [`error::Error::UnsupportedSpatialReference`].
pub fn reproject_point_to_3857(point: Point2D, srid: u32) -> Result<Point2D> {
    match Crs::from_srid(srid)? {
        Crs::Epsg3857 => Ok(point),
        Crs::Epsg4326 => Ok(forward_web_mercator(point)),
    }
}

/// Reprojects a point from `EPSG:3857` back to `srid`.
pub fn reproject_point_from_3857(point: Point2D, srid: u32) -> Result<Point2D> {
    match Crs::from_srid(srid)? {
        Crs::Epsg3857 => Ok(point),
        Crs::Epsg4326 => Ok(inverse_web_mercator(point)),
    }
}

/// Standard spherical Web Mercator forward projection: lon/lat degrees to
/// meters. Undefined beyond +/-85.0511 degrees latitude, where the
/// projection's vertical scale diverges; callers outside that range get a
/// clamped result rather than an error, matching how the ambient extent
/// model treats out-of-range requests as producing out-of-coverage data
/// rather than rejecting them outright.
fn forward_web_mercator(lon_lat: Point2D) -> Point2D {
    let lat = lon_lat.y.clamp(-85.051_128, 85.051_128);
    let x = EARTH_RADIUS_M * lon_lat.x.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Point2D::new(x, y)
}

/// Inverse of [`forward_web_mercator`]: meters back to lon/lat degrees.
fn inverse_web_mercator(point: Point2D) -> Point2D {
    let lon = (point.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (point.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Point2D::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_srid() {
        assert!(Crs::from_srid(2154).is_err());
    }

    #[test]
    fn identity_for_3857() {
        let p = Point2D::new(100.0, 200.0);
        assert_eq!(reproject_point_to_3857(p, 3857).unwrap(), p);
    }

    #[test]
    fn roundtrip_within_epsilon() {
        // invariant 8: 4326 -> 3857 -> 4326 is identity to within 1e-6 degrees
        // for points within +/-85 degrees latitude.
        for (lon, lat) in [
            (0.0, 0.0),
            (-122.4194, 37.7749),
            (2.3522, 48.8566),
            (179.9, 84.9),
            (-179.9, -84.9),
        ] {
            let original = Point2D::new(lon, lat);
            let projected = reproject_point_to_3857(original, 4326).unwrap();
            let back = reproject_point_from_3857(projected, 4326).unwrap();
            assert!(
                (back.x - original.x).abs() < 1e-6,
                "lon drifted: {} vs {}",
                back.x,
                original.x
            );
            assert!(
                (back.y - original.y).abs() < 1e-6,
                "lat drifted: {} vs {}",
                back.y,
                original.y
            );
        }
    }
}
