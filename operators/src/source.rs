//! The raster source abstraction: the one seam where extent mode and
//! tile mode diverge. Everything downstream (weighted overlay, masks,
//! analytics) is written against `RasterSource::fetch` and never needs to
//! know which mode produced its input.

use crate::catalog::Catalog;
use crate::error::Result;
use gt_datatypes::raster::{Raster, RasterExtent, TileInformation, TileKey};

/// A layer producer: given a layer name, returns a [`Raster`] of some fixed
/// shape shared by every layer fetched through the same source.
pub enum RasterSource<'a> {
    /// Materializes an arbitrary geographic window at a chosen resolution,
    /// via `Catalog::read_window`.
    Extent {
        catalog: &'a dyn Catalog,
        zoom: u8,
        target: RasterExtent,
    },
    /// Materializes exactly one web-map tile, via `Catalog::tile`.
    Tile {
        catalog: &'a dyn Catalog,
        zoom: u8,
        key: TileKey,
    },
}

impl<'a> RasterSource<'a> {
    pub fn extent(catalog: &'a dyn Catalog, zoom: u8, target: RasterExtent) -> Self {
        Self::Extent {
            catalog,
            zoom,
            target,
        }
    }

    pub fn tile(catalog: &'a dyn Catalog, zoom: u8, key: TileKey) -> Self {
        Self::Tile { catalog, zoom, key }
    }

    /// Fetches `layer`'s raster through this source's access pattern. Every
    /// raster returned by the same `RasterSource` instance shares one
    /// `RasterExtent`, which is what lets `weightedOverlay` and the mask
    /// stages assume dimensional agreement between inputs.
    pub fn fetch(&self, layer: &str) -> Result<Raster> {
        match self {
            Self::Extent {
                catalog,
                zoom,
                target,
            } => catalog.read_window(layer, *zoom, target),
            Self::Tile { catalog, zoom, key } => catalog.tile(layer, *zoom, *key),
        }
    }

    /// Fetches a *mask* layer's raster for this source's shape.
    ///
    /// Extent mode delegates straight to [`fetch`](Self::fetch): `read_window`
    /// always resamples from whichever native tiles it finds, regardless of
    /// the target resolution, so there is no separate "native zoom" concern.
    ///
    /// Tile mode needs special handling here: a mask layer's own native zoom
    /// pyramid may not reach the request zoom.
    /// Reading `(zoom, key)` directly from such a layer would force the
    /// catalog to interpolate (or simply fail), and allow-list comparisons
    /// against interpolated values are meaningless for categorical masks.
    /// Instead, when the request zoom exceeds the mask layer's native
    /// maximum, this clamps down to that maximum zoom and re-reads the same
    /// geographic footprint from there via `read_window`, so every allow-list
    /// comparison happens against an un-interpolated source value. If the
    /// mask layer's native zoom already covers the request zoom, this reads
    /// the tile directly, same as `fetch`.
    pub fn fetch_mask_layer(&self, layer: &str) -> Result<Raster> {
        match self {
            Self::Extent { .. } => self.fetch(layer),
            Self::Tile { catalog, zoom, key } => {
                let metadata = catalog.metadata(layer, *zoom)?;
                if *zoom <= metadata.max_zoom {
                    return catalog.tile(layer, *zoom, *key);
                }
                let target = TileInformation::new(*key, metadata.tile_size_in_pixels).raster_extent();
                catalog.read_window(layer, metadata.max_zoom, &target)
            }
        }
    }
}
