use super::{Extent, GeoTransform, RasterExtent};
use serde::{Deserialize, Serialize};

/// Identifies one tile in a layer's zoom pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

/// Where one tile sits within the global Web Mercator pyramid: its key, pixel
/// dimensions, and the geographic extent it covers. Tiles are always square
/// and addressed top-left origin, following the standard XYZ tiling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileInformation {
    pub key: TileKey,
    pub tile_size_in_pixels: usize,
}

/// Full Web Mercator world extent in meters, used to derive per-zoom tile
/// geo transforms for the standard XYZ pyramid.
const WORLD_EXTENT_METERS: f64 = 20_037_508.342_789_244;

impl TileInformation {
    pub fn new(key: TileKey, tile_size_in_pixels: usize) -> Self {
        Self {
            key,
            tile_size_in_pixels,
        }
    }

    /// The geographic extent (in EPSG:3857 meters) this tile covers under
    /// the standard XYZ pyramid convention: zoom `z` divides the world into
    /// `2^z` tiles per axis, `y` increasing downward from the north-west
    /// corner.
    pub fn extent(&self) -> Extent {
        let tiles_per_axis = 2_u32.pow(u32::from(self.key.zoom)) as f64;
        let tile_size = 2.0 * WORLD_EXTENT_METERS / tiles_per_axis;

        let xmin = -WORLD_EXTENT_METERS + self.key.x as f64 * tile_size;
        let ymax = WORLD_EXTENT_METERS - self.key.y as f64 * tile_size;

        Extent {
            xmin,
            ymin: ymax - tile_size,
            xmax: xmin + tile_size,
            ymax,
        }
    }

    pub fn raster_extent(&self) -> RasterExtent {
        RasterExtent::new(self.extent(), self.tile_size_in_pixels, self.tile_size_in_pixels)
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.raster_extent().geo_transform()
    }

    /// Locates the tile key at `zoom` in the standard XYZ pyramid containing
    /// a Web Mercator point. Points outside the world extent clamp to the
    /// edge tile rather than failing, matching the "out-of-coverage rather
    /// than an error" policy used throughout the catalog adapter.
    pub fn key_for_point(zoom: u8, x: f64, y: f64) -> TileKey {
        let tiles_per_axis = 2_u32.pow(u32::from(zoom)) as f64;
        let tile_size = 2.0 * WORLD_EXTENT_METERS / tiles_per_axis;

        let col = ((x + WORLD_EXTENT_METERS) / tile_size).floor();
        let row = ((WORLD_EXTENT_METERS - y) / tile_size).floor();

        let max_index = tiles_per_axis as i64 - 1;
        let clamp = |v: f64| v.clamp(0.0, max_index as f64) as u32;

        TileKey::new(zoom, clamp(col), clamp(row))
    }
}
