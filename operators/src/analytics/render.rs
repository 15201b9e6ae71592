//! PNG rendering: a raster plus a set of class breaks plus a named
//! color ramp becomes an 8-bit RGBA PNG.

use crate::error::Result;
use gt_datatypes::color::{default_ramp, ColorRamp};
use gt_datatypes::raster::{Raster, NODATA};
use image::{ImageBuffer, ImageOutputFormat, Rgba};
use std::io::Cursor;

/// Renders `raster` to PNG bytes using `breaks` to bucket cell values and
/// `ramp` (or the built-in default if `ramp` doesn't match anything) to
/// color them. NoData cells render fully transparent. Buckets are
/// upper-inclusive: a cell's color is that of the smallest break `>=`
/// its value; values past the last break take the last color.
pub fn render_png(raster: &Raster, breaks: &[i32], ramp: Option<&ColorRamp>) -> Result<Vec<u8>> {
    let ramp = ramp.cloned().unwrap_or_else(default_ramp);
    let colors = ramp.interpolate(breaks.len().max(1));

    let width = raster.cols() as u32;
    let height = raster.rows() as u32;
    let mut image = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(width, height);

    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            let value = raster.get(col, row);
            let color = if value == NODATA {
                gt_datatypes::color::RgbaColor::transparent()
            } else {
                bucket_color(value, breaks, &colors)
            };
            image.put_pixel(
                col as u32,
                row as u32,
                Rgba([color.r, color.g, color.b, color.a]),
            );
        }
    }

    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image).write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

fn bucket_color(
    value: i32,
    breaks: &[i32],
    colors: &[gt_datatypes::color::RgbaColor],
) -> gt_datatypes::color::RgbaColor {
    let idx = breaks
        .iter()
        .position(|&b| value <= b)
        .unwrap_or(breaks.len().saturating_sub(1));
    colors[idx.min(colors.len() - 1)]
}
