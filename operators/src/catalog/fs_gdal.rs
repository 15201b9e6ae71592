use super::{unknown_layer, Catalog, LayerMetadata};
use crate::error::Result;
use gt_datatypes::crs::Crs;
use gt_datatypes::raster::{Raster, TileInformation, TileKey, NODATA};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A catalog backed by a directory tree of single-band GeoTIFF tiles, one
/// file per `(layer, zoom, x, y)` at `{root}/{layer}/{zoom}/{x}_{y}.tif`,
/// with a small `metadata.json` sidecar per layer. This is the on-disk
/// layout choice left to the implementation; object-store backends
/// would implement the same [`Catalog`] trait against blob keys instead of
/// paths.
pub struct FsGdalCatalog {
    root: PathBuf,
}

#[derive(Deserialize)]
struct LayerMetadataFile {
    srid: u32,
    tile_size_in_pixels: usize,
    max_zoom: u8,
}

impl FsGdalCatalog {
    /// Opens a catalog rooted at `root`: a scoped acquisition, released
    /// implicitly when the handle is dropped at
    /// process shutdown.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("metadata.json")
    }

    fn tile_path(&self, name: &str, key: TileKey) -> PathBuf {
        self.root
            .join(name)
            .join(key.zoom.to_string())
            .join(format!("{}_{}.tif", key.x, key.y))
    }

    fn read_metadata_file(&self, name: &str, zoom: u8) -> Result<LayerMetadataFile> {
        let path = self.metadata_path(name);
        let bytes = std::fs::read(&path).map_err(|_| unknown_layer(name, zoom))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Catalog for FsGdalCatalog {
    fn metadata(&self, name: &str, zoom: u8) -> Result<LayerMetadata> {
        let file = self.read_metadata_file(name, zoom)?;
        Ok(LayerMetadata {
            crs: Crs::from_srid(file.srid)?,
            tile_size_in_pixels: file.tile_size_in_pixels,
            max_zoom: file.max_zoom,
        })
    }

    fn tile(&self, name: &str, zoom: u8, key: TileKey) -> Result<Raster> {
        let meta = self.metadata(name, zoom)?;
        let tile_info = TileInformation::new(key, meta.tile_size_in_pixels);
        let raster_extent = tile_info.raster_extent();

        let path = self.tile_path(name, key);
        if !Path::new(&path).exists() {
            // Missing native coverage is not an error.
            return Ok(Raster::filled_no_data(raster_extent));
        }

        let dataset = gdal::Dataset::open(&path)?;
        let band = dataset.rasterband(1)?;
        let no_data = band.no_data_value();

        let size = (meta.tile_size_in_pixels, meta.tile_size_in_pixels);
        let buffer = band.read_as::<i32>((0, 0), dataset.raster_size(), size, None)?;

        let data: Vec<i32> = buffer
            .data
            .into_iter()
            .map(|v| {
                if no_data.is_some_and(|nd| (v as f64 - nd).abs() < f64::EPSILON) {
                    NODATA
                } else {
                    v
                }
            })
            .collect();

        Ok(Raster::new(raster_extent, data)?)
    }
}
