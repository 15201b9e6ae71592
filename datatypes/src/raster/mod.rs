//! The raster value model: a sentinel NoData cell type, geographic extents,
//! the affine grid transform, and the `Raster` grid itself.

mod extent;
mod grid;
mod tile;

pub use extent::{Extent, GeoTransform, RasterExtent};
pub use grid::Raster;
pub use tile::{TileInformation, TileKey};

/// Sentinel cell value denoting "no data". Chosen to match the reference
/// engine's convention of reserving `i32::MIN` rather than `0`, since `0` is
/// frequently a legitimate measured value in overlay layers.
pub const NODATA: i32 = i32::MIN;

/// `true` iff `value` is a real measurement rather than the [`NODATA`]
/// sentinel.
#[inline]
pub fn is_data(value: i32) -> bool {
    value != NODATA
}
