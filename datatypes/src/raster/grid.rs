use super::{RasterExtent, NODATA};
use crate::error::{self, Result};
use serde::{Deserialize, Serialize};

/// A `RasterExtent` plus a contiguous grid of `cols*rows` signed integer
/// cells in row-major order, top-left origin. This is the one value type
/// every pipeline stage (source, mask, overlay, analytic) consumes and
/// produces; every stage preserves the `RasterExtent` of its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    pub raster_extent: RasterExtent,
    data: Vec<i32>,
}

impl Raster {
    pub fn new(raster_extent: RasterExtent, data: Vec<i32>) -> Result<Self> {
        let expected = raster_extent.cell_count();
        if data.len() != expected {
            return error::GridSizeMismatch {
                cols: raster_extent.cols,
                rows: raster_extent.rows,
                len: data.len(),
            }
            .fail();
        }
        Ok(Self { raster_extent, data })
    }

    /// A raster of the given extent filled entirely with [`NODATA`]. This is
    /// what the catalog adapter returns for tile keys it has no coverage
    /// for.
    pub fn filled_no_data(raster_extent: RasterExtent) -> Self {
        let len = raster_extent.cell_count();
        Self {
            data: vec![NODATA; len],
            raster_extent,
        }
    }

    pub fn filled(raster_extent: RasterExtent, value: i32) -> Self {
        let len = raster_extent.cell_count();
        Self {
            data: vec![value; len],
            raster_extent,
        }
    }

    pub fn cols(&self) -> usize {
        self.raster_extent.cols
    }

    pub fn rows(&self) -> usize {
        self.raster_extent.rows
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> i32 {
        self.data[row * self.cols() + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: i32) {
        let cols = self.cols();
        self.data[row * cols + col] = value;
    }

    /// The dimensional-agreement check mask and overlay stages require: all
    /// inputs to a single pipeline run must share column/row counts.
    pub fn dimensions_match(&self, other: &Raster) -> bool {
        self.cols() == other.cols() && self.rows() == other.rows()
    }

    /// Iterates non-NoData `(col, row, value)` triples.
    pub fn iter_data(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        let cols = self.cols();
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != NODATA)
            .map(move |(idx, &v)| (idx % cols, idx / cols, v))
    }
}
