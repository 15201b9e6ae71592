//! Class-break computation: quantile breaks over a raster's non-NoData
//! values.

use gt_datatypes::raster::{Raster, NODATA};

/// Returns at most `n` strictly increasing cell values partitioning the
/// non-NoData histogram into approximately even quantiles. Ties collapse
/// (fewer distinct breaks are preferred over padding with duplicates). An
/// empty non-NoData histogram is signalled by the single-element sentinel
/// list `[NODATA]`; translating that into the `UnableToCompute` domain
/// error is the caller's job, not this function's.
pub fn class_breaks(raster: &Raster, n: usize) -> Vec<i32> {
    let mut values: Vec<i32> = raster.iter_data().map(|(_, _, v)| v).collect();
    if values.is_empty() {
        return vec![NODATA];
    }
    values.sort_unstable();

    let len = values.len();
    let mut breaks = Vec::with_capacity(n.max(1));
    for k in 1..=n.max(1) {
        let rank = ((k * len) as f64 / n.max(1) as f64).ceil() as usize;
        let idx = rank.clamp(1, len) - 1;
        let candidate = values[idx];
        if breaks.last().map_or(true, |&last| candidate > last) {
            breaks.push(candidate);
        }
    }
    breaks
}

/// `true` iff `class_breaks` signalled an empty non-NoData histogram.
pub fn is_unable_to_compute(breaks: &[i32]) -> bool {
    breaks == [NODATA]
}
