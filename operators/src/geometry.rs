//! Geometry ingestion: parsing polygon masks out of GeoJSON. CRS
//! reprojection itself lives in `gt_datatypes::geometry`/`gt_datatypes::crs`
//! since it is pure coordinate math; this module is the boundary where
//! malformed input degrades silently rather than failing the request.

use geojson::{GeoJson, Value};
use gt_datatypes::geometry::Polygon;
use log::warn;

/// Parses a GeoJSON FeatureCollection into its member polygons, flattening
/// any MultiPolygon features into their constituent polygons, concatenated
/// in document order. Empty or unparseable input yields an empty sequence;
/// malformed non-empty input is logged but never fails the request.
pub fn parse_polygons(geojson: &str) -> Vec<Polygon> {
    if geojson.trim().is_empty() {
        return Vec::new();
    }

    let parsed: GeoJson = match geojson.parse() {
        Ok(g) => g,
        Err(err) => {
            warn!("polyMask could not be parsed as GeoJSON, ignoring: {err}");
            return Vec::new();
        }
    };

    let features = match parsed {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => {
            return polygons_from_value(geometry.value);
        }
    };

    features
        .into_iter()
        .filter_map(|f| f.geometry)
        .flat_map(|g| polygons_from_value(g.value))
        .collect()
}

fn polygons_from_value(value: Value) -> Vec<Polygon> {
    match value {
        Value::Polygon(rings) => vec![polygon_from_rings(rings)],
        Value::MultiPolygon(polys) => polys.into_iter().map(polygon_from_rings).collect(),
        other => {
            warn!("polyMask contained a non-polygon geometry ({other:?}), ignoring it");
            Vec::new()
        }
    }
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    let to_points = |ring: Vec<Vec<f64>>| {
        ring.into_iter()
            .map(|p| (p[0], p[1]))
            .collect::<Vec<(f64, f64)>>()
    };
    let mut rings = rings.into_iter();
    let exterior = rings.next().map(to_points).unwrap_or_default();
    let interiors = rings.map(to_points).collect();
    Polygon::from_rings(exterior, interiors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_no_polygons() {
        assert!(parse_polygons("").is_empty());
    }

    #[test]
    fn malformed_json_degrades_silently() {
        assert!(parse_polygons("not json at all").is_empty());
    }

    #[test]
    fn parses_single_polygon_feature_collection() {
        let fc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }
            }]
        }"#;
        let polys = parse_polygons(fc);
        assert_eq!(polys.len(), 1);
        assert!(polys[0].contains_point(5.0, 5.0));
    }

    #[test]
    fn flattens_multipolygon_members() {
        let fc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0,0],[10,0],[10,10],[0,10],[0,0]]],
                        [[[100,100],[110,100],[110,110],[100,110],[100,100]]]
                    ]
                }
            }]
        }"#;
        let polys = parse_polygons(fc);
        assert_eq!(polys.len(), 2);
    }
}
