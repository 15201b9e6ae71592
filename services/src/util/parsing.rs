//! Parses the common HTTP form fields into pipeline-ready values. Parse
//! failures for `bbox`, `weights`, and `srid` are user-input faults
//! (`BadRequest`); `polyMask`/`layerMask` parse failures degrade silently,
//! handled at the geometry/mask call sites rather than here (`layerMask` is
//! the one degrade-silently case parsed in this module, since it has no
//! richer home).

use crate::error::{bad_request, Result};
use gt_datatypes::crs::{reproject_point_to_3857, Point2D};
use gt_datatypes::geometry::Polygon;
use gt_datatypes::raster::Extent;
use gt_operators::geometry::parse_polygons;
use gt_operators::mask::LayerMask;
use log::warn;

pub fn parse_bbox(raw: &str) -> Result<Extent> {
    let parts: Vec<&str> = raw.split(',').collect();
    let [xmin, ymin, xmax, ymax] = parts.as_slice() else {
        return Err(bad_request(format!(
            "bbox must have 4 comma-separated values, got '{raw}'"
        )));
    };

    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| bad_request(format!("bbox value '{s}' is not a number")))
    };

    Ok(Extent::new(parse(xmin)?, parse(ymin)?, parse(xmax)?, parse(ymax)?)
        .map_err(|source| bad_request(source.to_string()))?)
}

/// Reprojects `extent`'s two corners from `srid` into EPSG:3857, vertex-wise
/// like `reproject_polygons`, correct because the forward Web
/// Mercator mapping is monotonic in both axes over its supported domain, so
/// projecting just the corners still yields an axis-aligned bounding box.
pub fn reproject_extent(extent: Extent, srid: u32) -> Result<Extent> {
    let min = reproject_point_to_3857(Point2D::new(extent.xmin, extent.ymin), srid)
        .map_err(|source| bad_request(source.to_string()))?;
    let max = reproject_point_to_3857(Point2D::new(extent.xmax, extent.ymax), srid)
        .map_err(|source| bad_request(source.to_string()))?;
    Extent::new(min.x, min.y, max.x, max.y).map_err(|source| bad_request(source.to_string()))
}

pub fn parse_layers(raw: &str) -> Result<Vec<String>> {
    let layers: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if layers.is_empty() {
        return Err(bad_request("layers must not be empty"));
    }
    Ok(layers)
}

fn parse_int_list(raw: &str, field: &str) -> Result<Vec<i32>> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|_| bad_request(format!("{field} value '{s}' is not an integer")))
        })
        .collect()
}

pub fn parse_weights(raw: &str) -> Result<Vec<i32>> {
    parse_int_list(raw, "weight")
}

/// Parses the pre-computed class breaks a client passes to `/gt/wo` and
/// `/gt/tile` for rendering (obtained from a prior `/gt/breaks` call).
pub fn parse_breaks(raw: &str) -> Result<Vec<i32>> {
    parse_int_list(raw, "break")
}

pub fn parse_num_breaks(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| bad_request(format!("numBreaks '{raw}' is not a positive integer")))
}

/// Missing `resolution` falls back to `default`
/// (`pipeline.default_resolution` from configuration).
pub fn parse_resolution(raw: Option<&str>, default: usize) -> Result<usize> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| bad_request(format!("resolution '{s}' is not a positive integer"))),
    }
}

pub fn parse_zoom(raw: &str) -> Result<u8> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| bad_request(format!("zoom '{raw}' is not an integer")))
}

pub fn parse_srid(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| bad_request(format!("srid '{raw}' is not an integer")))
}

/// Missing or empty `threshold` means "disabled", represented as
/// [`gt_datatypes::raster::NODATA`].
pub fn parse_threshold(raw: Option<&str>) -> Result<i32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(gt_datatypes::raster::NODATA),
        Some(s) => s
            .parse::<i32>()
            .map_err(|_| bad_request(format!("threshold '{s}' is not an integer"))),
    }
}

/// Parses `layerMask={layerName: [int, ...]}`. An empty string means "no
/// layer mask". Malformed JSON degrades to "no layer mask" rather than
/// failing the request.
pub fn parse_layer_mask(raw: &str) -> LayerMask {
    if raw.trim().is_empty() {
        return LayerMask::default();
    }
    match serde_json::from_str::<std::collections::HashMap<String, Vec<i32>>>(raw) {
        Ok(map) => map.into_iter().collect(),
        Err(err) => {
            warn!("layerMask could not be parsed as JSON, ignoring: {err}");
            LayerMask::default()
        }
    }
}

/// Parses `polyMask` GeoJSON into its member polygons, reprojecting every
/// vertex into EPSG:3857 from `srid`. Malformed geometry already degrades to
/// an empty polygon list inside `parse_polygons`; an unsupported `srid` is
/// the one way this can still fail, surfaced as a `BadRequest`.
pub fn parse_poly_mask(raw: &str, srid: u32) -> Result<Vec<Polygon>> {
    let polygons = parse_polygons(raw);
    Ok(gt_datatypes::geometry::reproject_polygons(&polygons, srid)
        .map_err(|source| bad_request(source.to_string()))?)
}

/// Parses `coords=id,x,y,id,x,y,...` into `(id, x, y)` string triples. `x`
/// and `y` are left unparsed here: numeric parsing happens per-point in
/// `gt_operators::analytics::sample_points`, which drops (rather than
/// fails on) triples that don't parse.
pub fn parse_coords(raw: &str) -> Result<Vec<(String, String, String)>> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() % 3 != 0 {
        return Err(bad_request(format!(
            "coords must be a multiple of 3 fields (id,x,y), got {}",
            fields.len()
        )));
    }
    Ok(fields
        .chunks_exact(3)
        .map(|c| (c[0].to_string(), c[1].to_string(), c[2].to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_bbox() {
        let extent = parse_bbox("0,0,100,100").unwrap();
        assert_eq!(extent.xmax, 100.0);
    }

    #[test]
    fn reproject_extent_is_identity_for_3857() {
        let extent = parse_bbox("0,0,100,100").unwrap();
        assert_eq!(reproject_extent(extent, 3857).unwrap(), extent);
    }

    #[test]
    fn rejects_bbox_with_wrong_arity() {
        assert!(parse_bbox("0,0,100").is_err());
    }

    #[test]
    fn parses_zoom() {
        assert_eq!(parse_zoom("12").unwrap(), 12);
        assert!(parse_zoom("not-a-zoom").is_err());
    }

    #[test]
    fn parses_layers_and_weights() {
        assert_eq!(parse_layers("A, B,C").unwrap(), vec!["A", "B", "C"]);
        assert_eq!(parse_weights("1,-2, 3").unwrap(), vec![1, -2, 3]);
    }

    #[test]
    fn parses_breaks_list() {
        assert_eq!(parse_breaks("1, 5, 10").unwrap(), vec![1, 5, 10]);
    }

    #[test]
    fn rejects_zero_num_breaks() {
        assert!(parse_num_breaks("0").is_err());
        assert_eq!(parse_num_breaks("3").unwrap(), 3);
    }

    #[test]
    fn missing_resolution_falls_back_to_default() {
        assert_eq!(parse_resolution(None, 256).unwrap(), 256);
        assert_eq!(parse_resolution(Some("512"), 256).unwrap(), 512);
        assert!(parse_resolution(Some("0"), 256).is_err());
    }

    #[test]
    fn missing_threshold_is_nodata() {
        assert_eq!(parse_threshold(None).unwrap(), gt_datatypes::raster::NODATA);
        assert_eq!(parse_threshold(Some("")).unwrap(), gt_datatypes::raster::NODATA);
    }

    #[test]
    fn malformed_layer_mask_degrades_to_empty() {
        assert!(parse_layer_mask("not json").is_empty());
        assert!(parse_layer_mask("").is_empty());
    }

    #[test]
    fn parses_layer_mask_json() {
        let mask = parse_layer_mask(r#"{"M":[1,2,3]}"#);
        assert_eq!(mask.get("M"), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn empty_poly_mask_yields_no_polygons() {
        assert!(parse_poly_mask("", 3857).unwrap().is_empty());
    }

    #[test]
    fn rejects_poly_mask_with_unsupported_srid() {
        let fc = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;
        assert!(parse_poly_mask(fc, 2154).is_err());
    }

    #[test]
    fn parses_coords_triples() {
        let coords = parse_coords("id1,1.0,2.0,id2,3.0,4.0").unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0].0, "id1");
    }

    #[test]
    fn rejects_coords_with_wrong_arity() {
        assert!(parse_coords("id1,1.0").is_err());
    }
}
