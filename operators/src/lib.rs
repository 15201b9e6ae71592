//! The weighted-overlay raster pipeline: catalog access, geometry
//! ingestion, the two raster-source producers (extent and tile mode), the
//! weighted-sum combinator, the three mask stages, and the analytics that
//! consume a fused raster (class breaks, PNG rendering, histograms, point
//! sampling).

pub mod analytics;
pub mod catalog;
pub mod concurrency;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod overlay;
pub mod pipeline;
pub mod source;

pub use error::{Error, Result};
