//! The common pipeline shared by both execution modes, factored over an
//! abstract `RasterSource` producer so extent and tile modes share
//! `weighted_overlay`, `apply_masks`, and `render_png`: fetch
//! a weighted overlay, then run the three mask stages over it in order.

use crate::error::Result;
use crate::mask::{apply_masks, LayerMask};
use crate::overlay::weighted_overlay;
use crate::source::RasterSource;
use gt_datatypes::geometry::Polygon;
use gt_datatypes::raster::{Raster, NODATA};

/// Every gt endpoint's first three pipeline stages (build the unmasked
/// weighted raster, apply the polygon mask, apply the per-layer value mask,
/// apply the threshold mask), independent of whether `source` is extent
/// mode or tile mode.
pub fn masked_weighted_overlay(
    layers: &[String],
    weights: &[i32],
    polygons: &[Polygon],
    layer_mask: &LayerMask,
    threshold: i32,
    source: &RasterSource,
) -> Result<Raster> {
    let overlay = weighted_overlay(layers, weights, source)?;
    apply_masks(&overlay, polygons, layer_mask, threshold, source)
}

/// `true` iff `raster` is entirely NoData, the condition under which
/// `class_breaks` signals `UnableToCompute`.
pub fn is_all_no_data(raster: &Raster) -> bool {
    raster.as_slice().iter().all(|&v| v == NODATA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;
    use gt_datatypes::raster::TileKey;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn threshold_above_fused_value_yields_all_no_data() {
        // S3: A=2, B=3, weights 2,1 -> fused 7; threshold 8 excludes it all.
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 2)
            .with_constant_layer("B", 4, 3);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let raster = masked_weighted_overlay(
            &names(&["A", "B"]),
            &[2, 1],
            &[],
            &LayerMask::default(),
            8,
            &source,
        )
        .unwrap();
        assert!(is_all_no_data(&raster));
    }
}
