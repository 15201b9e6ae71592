//! Histogram and zonal histogram.

use gt_datatypes::geometry::{point_in_any, Polygon};
use gt_datatypes::raster::Raster;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// A plain histogram over every non-NoData cell if `polygons` is empty;
/// otherwise a zonal histogram over cells whose centers lie in the union of
/// `polygons`.
///
/// With more than one polygon, each zone is counted independently and the
/// per-zone maps merged by summation, so zonal histograms across multiple
/// polygons can proceed in parallel. That
/// merge rule, not the polygon's position in the list, is what makes the
/// result independent of completion order and equal to the histogram over
/// the zones' union when they are disjoint (a cell inside
/// several zones is simply counted once per zone it falls in.
pub fn histogram(raster: &Raster, polygons: &[Polygon]) -> FxHashMap<i32, u64> {
    if polygons.is_empty() {
        let mut counts = FxHashMap::default();
        for (_, _, value) in raster.iter_data() {
            *counts.entry(value).or_insert(0) += 1;
        }
        return counts;
    }

    if polygons.len() == 1 {
        return zonal_histogram(raster, std::slice::from_ref(&polygons[0]));
    }

    polygons
        .par_iter()
        .map(|polygon| zonal_histogram(raster, std::slice::from_ref(polygon)))
        .reduce(FxHashMap::default, merge)
}

fn zonal_histogram(raster: &Raster, polygons: &[Polygon]) -> FxHashMap<i32, u64> {
    let mut counts = FxHashMap::default();
    let gt = raster.raster_extent.geo_transform();
    for (col, row, value) in raster.iter_data() {
        let (x, y) = gt.grid_to_coordinate_center(col, row);
        if point_in_any(polygons, x, y) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
}

fn merge(mut a: FxHashMap<i32, u64>, b: FxHashMap<i32, u64>) -> FxHashMap<i32, u64> {
    for (value, count) in b {
        *a.entry(value).or_insert(0) += count;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_datatypes::raster::{Extent, RasterExtent};

    fn ramp_raster(size: usize) -> Raster {
        let extent = RasterExtent::new(
            Extent::new(0.0, 0.0, size as f64, size as f64).unwrap(),
            size,
            size,
        );
        let data: Vec<i32> = (0..(size * size) as i32).collect();
        Raster::new(extent, data).unwrap()
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::from_rings(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], vec![])
    }

    #[test]
    fn plain_histogram_counts_every_value_once() {
        let raster = ramp_raster(4);
        let h = histogram(&raster, &[]);
        assert_eq!(h.len(), 16);
        assert!(h.values().all(|&c| c == 1));
    }

    #[test]
    fn zonal_histogram_over_quadrant() {
        let raster = ramp_raster(256);
        let poly = square(0.0, 128.0, 128.0, 256.0);
        let h = histogram(&raster, &[poly]);
        let total: u64 = h.values().sum();
        assert_eq!(total, 128 * 128);
    }

    #[test]
    fn disjoint_zones_merge_to_their_union() {
        let raster = ramp_raster(8);
        let left = square(0.0, 0.0, 4.0, 8.0);
        let right = square(4.0, 0.0, 8.0, 8.0);
        let union = square(0.0, 0.0, 8.0, 8.0);

        let separate_total: u64 = histogram(&raster, &[left, right]).values().sum();
        let union_total: u64 = histogram(&raster, &[union]).values().sum();
        assert_eq!(separate_total, union_total);
    }
}
