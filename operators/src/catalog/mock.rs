use super::{unknown_layer, Catalog, LayerMetadata};
use crate::error::Result;
use gt_datatypes::crs::Crs;
use gt_datatypes::raster::{Raster, TileInformation, TileKey};
use std::collections::HashMap;
use std::sync::Arc;

/// A layer's data, as a function from a Web Mercator point to a cell value.
/// Mock layers are defined this way (rather than as literal tile grids) so
/// tests can describe "constant 5" or "a left/right split" in one line and
/// get correct values at every zoom and tile offset for free.
pub type MockValueFn = Arc<dyn Fn(f64, f64) -> i32 + Send + Sync>;

#[derive(Clone)]
struct MockLayer {
    crs: Crs,
    tile_size_in_pixels: usize,
    max_zoom: u8,
    value_fn: MockValueFn,
}

/// An in-memory catalog used by unit tests and handler tests, never
/// touching the filesystem.
#[derive(Clone, Default)]
pub struct MockCatalog {
    layers: HashMap<String, MockLayer>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a layer whose cell value at any Web Mercator coordinate is
    /// given by `value_fn`.
    pub fn with_layer(
        mut self,
        name: impl Into<String>,
        tile_size_in_pixels: usize,
        max_zoom: u8,
        value_fn: impl Fn(f64, f64) -> i32 + Send + Sync + 'static,
    ) -> Self {
        self.layers.insert(
            name.into(),
            MockLayer {
                crs: Crs::Epsg3857,
                tile_size_in_pixels,
                max_zoom,
                value_fn: Arc::new(value_fn),
            },
        );
        self
    }

    /// Convenience constructor for a layer that returns the same value
    /// everywhere.
    pub fn with_constant_layer(self, name: impl Into<String>, tile_size: usize, value: i32) -> Self {
        self.with_layer(name, tile_size, 12, move |_, _| value)
    }
}

impl Catalog for MockCatalog {
    fn metadata(&self, name: &str, zoom: u8) -> Result<LayerMetadata> {
        let layer = self
            .layers
            .get(name)
            .ok_or_else(|| unknown_layer(name, zoom))?;
        Ok(LayerMetadata {
            crs: layer.crs,
            tile_size_in_pixels: layer.tile_size_in_pixels,
            max_zoom: layer.max_zoom,
        })
    }

    fn tile(&self, name: &str, zoom: u8, key: TileKey) -> Result<Raster> {
        let layer = self
            .layers
            .get(name)
            .ok_or_else(|| unknown_layer(name, zoom))?;

        let tile_info = TileInformation::new(key, layer.tile_size_in_pixels);
        let raster_extent = tile_info.raster_extent();
        let gt = raster_extent.geo_transform();

        let mut data = vec![0; raster_extent.cell_count()];
        for row in 0..raster_extent.rows {
            for col in 0..raster_extent.cols {
                let (x, y) = gt.grid_to_coordinate_center(col, row);
                data[row * raster_extent.cols + col] = (layer.value_fn)(x, y);
            }
        }

        Ok(Raster::new(raster_extent, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_datatypes::raster::NODATA;

    #[test]
    fn unknown_layer_is_layer_not_found() {
        let catalog = MockCatalog::new();
        assert!(matches!(
            catalog.metadata("missing", 0),
            Err(crate::error::Error::LayerNotFound { .. })
        ));
    }

    #[test]
    fn constant_layer_fills_tile() {
        let catalog = MockCatalog::new().with_constant_layer("L1", 4, 5);
        let tile = catalog.tile("L1", 2, TileKey::new(2, 0, 0)).unwrap();
        assert!(tile.iter_data().all(|(_, _, v)| v == 5));
        assert_eq!(tile.as_slice().iter().filter(|&&v| v == NODATA).count(), 0);
    }
}
