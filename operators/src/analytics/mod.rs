//! Analytics: the four ways a fused, masked raster gets consumed,
//! class breaks, PNG rendering, histograms, and point sampling.

mod breaks;
mod histogram;
mod render;
mod sample;

pub use breaks::{class_breaks, is_unable_to_compute};
pub use histogram::histogram;
pub use render::render_png;
pub use sample::{sample_points, SampledPoint};
