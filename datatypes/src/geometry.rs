//! Polygon geometry in the ambient CRS, and the point-in-polygon test the
//! polygon mask stage is built on.

use crate::crs::{reproject_point_to_3857, Point2D};
use crate::error::Result;
use geo::algorithm::contains::Contains;
use geo_types::{Coord, LineString, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};

/// A single polygon (with holes) in some CRS. Thin wrapper around
/// `geo_types::Polygon` so the rest of the crate isn't coupled to `geo`'s
/// exact type at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(GeoPolygon<f64>);

impl Polygon {
    pub fn from_rings(exterior: Vec<(f64, f64)>, interiors: Vec<Vec<(f64, f64)>>) -> Self {
        let to_ring = |pts: Vec<(f64, f64)>| {
            LineString::new(pts.into_iter().map(|(x, y)| Coord { x, y }).collect())
        };
        Self(GeoPolygon::new(
            to_ring(exterior),
            interiors.into_iter().map(to_ring).collect(),
        ))
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.0.contains(&Coord { x, y })
    }

    fn map_vertices(&self, f: impl Fn(f64, f64) -> Result<(f64, f64)>) -> Result<Self> {
        let map_ring = |ring: &LineString<f64>| -> Result<LineString<f64>> {
            let coords = ring
                .coords()
                .map(|c| f(c.x, c.y).map(|(x, y)| Coord { x, y }))
                .collect::<Result<Vec<_>>>()?;
            Ok(LineString::new(coords))
        };

        let exterior = map_ring(self.0.exterior())?;
        let interiors = self
            .0
            .interiors()
            .iter()
            .map(map_ring)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(GeoPolygon::new(exterior, interiors)))
    }
}

/// `true` iff `(x, y)` lies inside the union of `polygons`. An empty
/// polygon set is not "the empty region" here; callers treat "no polygons
/// supplied" as "mask disabled" one level up.
pub fn point_in_any(polygons: &[Polygon], x: f64, y: f64) -> bool {
    polygons.iter().any(|p| p.contains_point(x, y))
}

/// Reprojects every vertex of every polygon from `srid` into `EPSG:3857`,
/// vertex-wise with no densification. `srid == 3857` is the identity
/// transform.
pub fn reproject_polygons(polygons: &[Polygon], srid: u32) -> Result<Vec<Polygon>> {
    polygons
        .iter()
        .map(|poly| {
            poly.map_vertices(|x, y| {
                let p = reproject_point_to_3857(Point2D::new(x, y), srid)?;
                Ok((p.x, p.y))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::from_rings(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], vec![])
    }

    #[test]
    fn contains_center_not_outside() {
        let p = square(0.0, 0.0, 10.0, 10.0);
        assert!(p.contains_point(5.0, 5.0));
        assert!(!p.contains_point(20.0, 20.0));
    }

    #[test]
    fn point_in_any_is_union() {
        let polys = vec![square(0.0, 0.0, 10.0, 10.0), square(100.0, 100.0, 110.0, 110.0)];
        assert!(point_in_any(&polys, 5.0, 5.0));
        assert!(point_in_any(&polys, 105.0, 105.0));
        assert!(!point_in_any(&polys, 50.0, 50.0));
    }

    #[test]
    fn identity_reprojection_for_3857() {
        let polys = vec![square(0.0, 0.0, 10.0, 10.0)];
        let reprojected = reproject_polygons(&polys, 3857).unwrap();
        assert_eq!(reprojected, polys);
    }

    #[test]
    fn unsupported_srid_fails() {
        let polys = vec![square(0.0, 0.0, 10.0, 10.0)];
        assert!(reproject_polygons(&polys, 2154).is_err());
    }
}
