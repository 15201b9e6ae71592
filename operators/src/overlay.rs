//! Weighted overlay: the combinator that turns N named layers and N
//! integer weights into one fused raster.

use crate::error::{self, Result};
use crate::source::RasterSource;
use gt_datatypes::raster::{Raster, NODATA};

/// Promotes a raw cell value into the 8-bit range the overlay weights are
/// defined against, before multiplying by the layer's weight.
fn promote_to_8bit(value: i32) -> i32 {
    value.clamp(0, 255)
}

/// Computes `sum_i(weight_i * promote8(layer_i))`, pixelwise, with NoData
/// absorbing across every contributing layer. Zero-weight layers are
/// skipped entirely, not fetched, not checked for dimensional agreement,
/// so that a disabled layer with no catalog coverage can never force the
/// whole result to NoData.
pub fn weighted_overlay(layers: &[String], weights: &[i32], source: &RasterSource) -> Result<Raster> {
    if layers.is_empty() || layers.len() != weights.len() {
        return error::BadRequest {
            reason: format!(
                "layers and weights must be equal length and non-empty (got {} layers, {} weights)",
                layers.len(),
                weights.len()
            ),
        }
        .fail();
    }

    let mut accumulated: Option<Raster> = None;

    for (name, &weight) in layers.iter().zip(weights) {
        if weight == 0 {
            continue;
        }

        let raster = source.fetch(name)?;

        accumulated = Some(match accumulated {
            None => apply_weight(raster, weight),
            Some(mut acc) => {
                if !acc.dimensions_match(&raster) {
                    return error::DimensionMismatch {
                        left_cols: acc.cols(),
                        left_rows: acc.rows(),
                        right_cols: raster.cols(),
                        right_rows: raster.rows(),
                    }
                    .fail();
                }
                accumulate(&mut acc, &raster, weight);
                acc
            }
        });
    }

    match accumulated {
        Some(raster) => Ok(raster),
        // Every weight was zero: the result has no contributing layer, so
        // it is NoData everywhere, shaped like the first named layer.
        None => {
            let shape = source.fetch(&layers[0])?;
            Ok(Raster::filled_no_data(shape.raster_extent))
        }
    }
}

fn apply_weight(mut raster: Raster, weight: i32) -> Raster {
    for v in raster.as_mut_slice() {
        if *v != NODATA {
            *v = promote_to_8bit(*v) * weight;
        }
    }
    raster
}

fn accumulate(acc: &mut Raster, raster: &Raster, weight: i32) {
    let len = acc.as_slice().len();
    for i in 0..len {
        let a = acc.as_slice()[i];
        let b = raster.as_slice()[i];
        acc.as_mut_slice()[i] = if a == NODATA || b == NODATA {
            NODATA
        } else {
            a + promote_to_8bit(b) * weight
        };
    }
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
    fn trivial_single_layer_passes_through_weighted() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let result = weighted_overlay(&names(&["L1"]), &[1], &source).unwrap();
        assert!(result.iter_data().all(|(_, _, v)| v == 5));
    }

    #[test]
    fn weighted_sum_of_two_constant_layers() {
        let catalog = MockCatalog::new()
            .with_constant_layer("A", 4, 2)
            .with_constant_layer("B", 4, 3);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let result = weighted_overlay(&names(&["A", "B"]), &[2, 1], &source).unwrap();
        assert!(result.iter_data().all(|(_, _, v)| v == 7));
    }

    #[test]
    fn zero_weight_layer_with_no_coverage_does_not_poison_result() {
        let catalog = MockCatalog::new().with_constant_layer("A", 4, 10);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        let result = weighted_overlay(&names(&["A", "missing"]), &[1, 0], &source).unwrap();
        assert!(result.iter_data().all(|(_, _, v)| v == 10));
    }

    #[test]
    fn mismatched_lengths_are_bad_request() {
        let catalog = MockCatalog::new().with_constant_layer("A", 4, 1);
        let source = RasterSource::tile(&catalog, 2, TileKey::new(2, 0, 0));
        assert!(matches!(
            weighted_overlay(&names(&["A"]), &[1, 2], &source),
            Err(crate::error::Error::BadRequest { .. })
        ));
    }
}
