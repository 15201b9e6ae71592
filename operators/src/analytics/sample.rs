//! Point sampling, with the tile-key batching optimization: points
//! are grouped by the tile they fall in so each native tile is read at most
//! once regardless of how many sample points land inside it.

use crate::catalog::Catalog;
use crate::error::Result;
use gt_datatypes::crs::{reproject_point_to_3857, Point2D};
use gt_datatypes::raster::{Raster, TileInformation, TileKey, NODATA};
use rustc_hash::FxHashMap;

/// One sampled point: `(id, x_3857, y_3857, value)`, matching the response
/// shape canonicalized for both `/gt/value` and `/gt/spark/value`.
pub type SampledPoint = (String, f64, f64, i32);

/// Samples `layer` at `zoom` for every `(id, x, y)` in `points`, where `x, y`
/// are given as unparsed strings in `srid`. Triples whose coordinates fail
/// numeric parsing are dropped from the output entirely; everything else is
/// returned in input order. Points outside the layer's native coverage
/// sample to `NODATA` rather than failing.
pub fn sample_points(
    catalog: &dyn Catalog,
    layer: &str,
    zoom: u8,
    points: &[(String, String, String)],
    srid: u32,
) -> Result<Vec<SampledPoint>> {
    let metadata = catalog.metadata(layer, zoom)?;

    let mut parsed: Vec<(String, f64, f64)> = Vec::with_capacity(points.len());
    for (id, x_str, y_str) in points {
        let (Ok(x), Ok(y)) = (x_str.parse::<f64>(), y_str.parse::<f64>()) else {
            continue;
        };
        let reprojected = reproject_point_to_3857(Point2D::new(x, y), srid)?;
        parsed.push((id.clone(), reprojected.x, reprojected.y));
    }

    let keys: Vec<TileKey> = parsed
        .iter()
        .map(|(_, x, y)| TileInformation::key_for_point(zoom, *x, *y))
        .collect();

    let mut unique_keys: Vec<TileKey> = keys.clone();
    unique_keys.sort_by_key(|k| (k.zoom, k.x, k.y));
    unique_keys.dedup();

    let mut tiles: FxHashMap<TileKey, Raster> = FxHashMap::default();
    for key in unique_keys {
        tiles.insert(key, catalog.tile(layer, zoom, key)?);
    }

    let mut out = Vec::with_capacity(parsed.len());
    for (i, (id, x, y)) in parsed.into_iter().enumerate() {
        let key = keys[i];
        let tile = &tiles[&key];
        let gt = TileInformation::new(key, metadata.tile_size_in_pixels).geo_transform();
        let (col, row) = gt.coordinate_to_grid(x, y);

        let value = if col >= 0.0 && row >= 0.0 {
            let (col, row) = (col as usize, row as usize);
            if col < tile.cols() && row < tile.rows() {
                tile.get(col, row)
            } else {
                NODATA
            }
        } else {
            NODATA
        };

        out.push((id, x, y, value));
    }

    Ok(out)
}
