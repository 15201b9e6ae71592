//! The three mask stages: polygon, per-layer value allow-list, and scalar
//! threshold, each a `Raster -> Raster` unary function, composed by left
//! fold. None of the stages transform surviving values, only whether a cell
//! survives, so any permutation of the three produces the same result
//! raster.

use crate::error::{self, Result};
use crate::source::RasterSource;
use gt_datatypes::geometry::Polygon;
use gt_datatypes::raster::{Raster, NODATA};
use rustc_hash::FxHashMap;

/// `layerName -> allowed cell values` for the layer mask stage. Key
/// uniqueness is guaranteed by construction (it's a map).
pub type LayerMask = FxHashMap<String, Vec<i32>>;

/// Masks `raster` to the union of `polygons`. An empty polygon set is
/// identity, meaning "no polygon mask supplied," not "everything excluded."
pub fn polygon_mask(raster: &Raster, polygons: &[Polygon]) -> Raster {
    if polygons.is_empty() {
        return raster.clone();
    }

    let mut out = raster.clone();
    let gt = raster.raster_extent.geo_transform();
    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            if out.get(col, row) == NODATA {
                continue;
            }
            let (x, y) = gt.grid_to_coordinate_center(col, row);
            if !gt_datatypes::geometry::point_in_any(polygons, x, y) {
                out.set(col, row, NODATA);
            }
        }
    }
    out
}

/// Masks `raster` against every layer in `layer_mask`, fetched through
/// `source` at the same extent/tile, ANDed together: a cell survives only
/// if it has data in every mask layer and its value there is in that
/// layer's allow-list.
pub fn layer_mask(raster: &Raster, layer_mask: &LayerMask, source: &RasterSource) -> Result<Raster> {
    if layer_mask.is_empty() {
        return Ok(raster.clone());
    }

    let mut out = raster.clone();
    for (name, allowed) in layer_mask {
        // Clamps to the mask layer's native zoom in tile mode rather than
        // interpolating; see `RasterSource::fetch_mask_layer`.
        let mask_raster = source.fetch_mask_layer(name)?;
        if !out.dimensions_match(&mask_raster) {
            return error::DimensionMismatch {
                left_cols: out.cols(),
                left_rows: out.rows(),
                right_cols: mask_raster.cols(),
                right_rows: mask_raster.rows(),
            }
            .fail();
        }
        for row in 0..out.rows() {
            for col in 0..out.cols() {
                if out.get(col, row) == NODATA {
                    continue;
                }
                let mask_value = mask_raster.get(col, row);
                let passes = mask_value != NODATA && allowed.contains(&mask_value);
                if !passes {
                    out.set(col, row, NODATA);
                }
            }
        }
    }
    Ok(out)
}

/// Masks `raster` to cells with value `>= threshold`. `threshold == NODATA`
/// means "disabled" (identity).
pub fn threshold_mask(raster: &Raster, threshold: i32) -> Raster {
    if threshold == NODATA {
        return raster.clone();
    }

    let mut out = raster.clone();
    for row in 0..out.rows() {
        for col in 0..out.cols() {
            let v = out.get(col, row);
            if v != NODATA && v < threshold {
                out.set(col, row, NODATA);
            }
        }
    }
    out
}

/// Composes the three stages in the canonical order: polygon, then layer,
/// then threshold. The order affects neither the surviving set nor the
/// surviving values, since all three stages are conjunctive filters that
/// never rewrite a value; the fixed order here is for determinism of
/// intermediate allocations, not semantics.
pub fn apply_masks(
    raster: &Raster,
    polygons: &[Polygon],
    layer_mask_param: &LayerMask,
    threshold: i32,
    source: &RasterSource,
) -> Result<Raster> {
    let after_polygon = polygon_mask(raster, polygons);
    let after_layer = layer_mask(&after_polygon, layer_mask_param, source)?;
    Ok(threshold_mask(&after_layer, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;
    use gt_datatypes::raster::TileKey;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::from_rings(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], vec![])
    }

    #[test]
    fn empty_polygon_set_is_identity() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let raster = source.fetch("L1").unwrap();
        let masked = polygon_mask(&raster, &[]);
        assert_eq!(masked, raster);
    }

    #[test]
    fn polygon_mask_excludes_outside_cells() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let source = RasterSource::tile(&catalog, 0, TileKey::new(0, 0, 0));
        let raster = source.fetch("L1").unwrap();
        // Cover only the left half of the tile's extent.
        let extent = &raster.raster_extent.extent;
        let mid_x = (extent.xmin + extent.xmax) / 2.0;
        let poly = square(extent.xmin, extent.ymin, mid_x, extent.ymax);
        let masked = polygon_mask(&raster, &[poly]);

        let surviving = masked.iter_data().count();
        assert!(surviving > 0 && surviving < raster.cols() * raster.rows());
    }

    #[test]
    fn threshold_nodata_is_identity() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let raster = source.fetch("L1").unwrap();
        assert_eq!(threshold_mask(&raster, NODATA), raster);
    }

    #[test]
    fn threshold_above_max_excludes_everything() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let raster = source.fetch("L1").unwrap();
        let masked = threshold_mask(&raster, 6);
        assert_eq!(masked.iter_data().count(), 0);
    }

    #[test]
    fn layer_mask_ands_against_allow_list() {
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 10)
            .with_layer("M", 4, 12, |x, _y| if x < 0.0 { 10 } else { 20 });
        let source = RasterSource::tile(&catalog, 0, TileKey::new(0, 0, 0));
        let raster = source.fetch("A").unwrap();

        let mut mask = LayerMask::default();
        mask.insert("M".to_string(), vec![10]);
        let masked = layer_mask(&raster, &mask, &source).unwrap();

        let surviving = masked.iter_data().count();
        assert!(surviving > 0 && surviving < raster.cols() * raster.rows());
    }

    #[test]
    fn layer_mask_clamps_to_native_zoom_in_tile_mode() {
        // "M" only exists natively up to zoom 2; requesting a tile mask at
        // zoom 5 must clamp down to 2 rather than fail or interpolate, and
        // still agree dimensionally with the request-zoom main raster.
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 10)
            .with_layer("M", 4, 2, |x, _y| if x < 0.0 { 10 } else { 20 });
        let source = RasterSource::tile(&catalog, 5, TileKey::new(5, 16, 16));
        let raster = source.fetch("A").unwrap();

        let clamped = source.fetch_mask_layer("M").unwrap();
        assert!(clamped.dimensions_match(&raster));

        let mut mask = LayerMask::default();
        mask.insert("M".to_string(), vec![10, 20]);
        let masked = layer_mask(&raster, &mask, &source).unwrap();
        assert_eq!(masked.iter_data().count(), raster.cols() * raster.rows());
    }

    #[test]
    fn layer_mask_rejects_mismatched_mask_dimensions() {
        // "M" has a different tile size than "A", so at the same zoom/tile
        // key (both within native coverage, no clamping) the two rasters
        // come back with different shapes; this must be a typed error, not
        // an out-of-bounds panic inside the mask loop.
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 10)
            .with_constant_layer("M", 8, 10);
        let source = RasterSource::tile(&catalog, 5, TileKey::new(5, 3, 3));
        let raster = source.fetch("A").unwrap();

        let mut mask = LayerMask::default();
        mask.insert("M".to_string(), vec![10]);
        assert!(matches!(
            layer_mask(&raster, &mask, &source),
            Err(crate::error::Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn layer_mask_reads_tile_directly_within_native_zoom() {
        // "M" is native up to zoom 8; a request at zoom 5 is within that
        // range and should read the tile directly rather than clamping.
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 10)
            .with_constant_layer("M", 4, 10);
        let source = RasterSource::tile(&catalog, 5, TileKey::new(5, 3, 3));
        let via_mask_fetch = source.fetch_mask_layer("M").unwrap();
        let via_plain_fetch = source.fetch("M").unwrap();
        assert_eq!(via_mask_fetch, via_plain_fetch);
    }
}
