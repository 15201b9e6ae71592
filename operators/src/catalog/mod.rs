//! The catalog adapter: resolves `(layer name, zoom)` to metadata and
//! to tile/window readers over a pyramidal, tiled raster catalog.

mod fs_gdal;
mod mock;

pub use fs_gdal::FsGdalCatalog;
pub use mock::MockCatalog;

use crate::error::{self, Result};
use gt_datatypes::crs::Crs;
use gt_datatypes::raster::{Raster, RasterExtent, TileInformation, TileKey};
use rayon::prelude::*;
use std::collections::HashMap;

/// Metadata about one `(layer, zoom)` pair published by the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerMetadata {
    pub crs: Crs,
    pub tile_size_in_pixels: usize,
    /// The highest zoom the layer is natively stored at. Tile-mode requests
    /// at a zoom above this one are not supported by this engine (no
    /// synthetic overzoom); requests at or below it read real tiles.
    pub max_zoom: u8,
}

/// A pure function over tile keys, read at most once per unique key by
/// callers that batch requests (the point-sampling optimization).
pub type TileReader<'a> = Box<dyn Fn(TileKey) -> Result<Raster> + Send + Sync + 'a>;

/// A read-only, thread-safe, process-wide handle onto a tiled raster
/// catalog, opened once at startup and treated as read-only and
/// thread-safe by contract.
pub trait Catalog: Send + Sync {
    fn metadata(&self, name: &str, zoom: u8) -> Result<LayerMetadata>;

    /// Reads a single tile. Missing coverage returns an all-NoData tile of
    /// the catalog's declared dimensions, never an error; required so
    /// partial coverage at a window's edges renders correctly.
    fn tile(&self, name: &str, zoom: u8, key: TileKey) -> Result<Raster>;

    /// Returns a boxed reader closure over this layer/zoom, for callers that
    /// want to hold onto a reusable function value (e.g. to memoize across
    /// many lookups as in batched point sampling).
    fn tile_reader<'a>(&'a self, name: &'a str, zoom: u8) -> TileReader<'a> {
        Box::new(move |key| self.tile(name, zoom, key))
    }

    /// Assembles a Raster at the exact requested `target` extent/resolution
    /// by reading overlapping native tiles and nearest-neighbor resampling.
    /// Cells outside native coverage are NoData.
    fn read_window(&self, name: &str, zoom: u8, target: &RasterExtent) -> Result<Raster> {
        let metadata = self.metadata(name, zoom)?;
        let tile_size = metadata.tile_size_in_pixels;
        let gt = target.geo_transform();

        // Determine every native tile key the target window overlaps, then
        // fetch each one exactly once; multiple tiles composing one window
        // may be fetched in parallel.
        let mut keys: Vec<TileKey> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for row in 0..target.rows {
            for col in 0..target.cols {
                let (x, y) = gt.grid_to_coordinate_center(col, row);
                let key = TileInformation::key_for_point(zoom, x, y);
                if seen.insert(key) {
                    keys.push(key);
                }
            }
        }

        let tiles: HashMap<TileKey, Raster> = keys
            .into_par_iter()
            .map(|key| self.tile(name, zoom, key).map(|raster| (key, raster)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .collect();

        let mut out = Raster::filled_no_data(target.clone());
        for row in 0..target.rows {
            for col in 0..target.cols {
                let (x, y) = gt.grid_to_coordinate_center(col, row);
                let key = TileInformation::key_for_point(zoom, x, y);
                let Some(tile) = tiles.get(&key) else {
                    continue;
                };
                let tile_info = TileInformation::new(key, tile_size);
                let tile_gt = tile_info.geo_transform();
                let (tcol, trow) = tile_gt.coordinate_to_grid(x, y);
                if tcol < 0.0 || trow < 0.0 {
                    continue;
                }
                let (tcol, trow) = (tcol as usize, trow as usize);
                if tcol >= tile.cols() || trow >= tile.rows() {
                    continue;
                }
                out.set(col, row, tile.get(tcol, trow));
            }
        }

        Ok(out)
    }
}

pub(crate) fn unknown_layer(name: &str, zoom: u8) -> error::Error {
    error::LayerNotFound {
        name: name.to_string(),
        zoom,
    }
    .build()
}
