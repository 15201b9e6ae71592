//! RGBA colors and named color ramps, interpolated to a requested number of
//! class breaks at render time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// A named, ordered lookup table of colors. `interpolate` stretches or
/// shrinks it to exactly `n` colors, one per class break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub name: String,
    pub stops: Vec<RgbaColor>,
}

impl ColorRamp {
    pub fn new(name: impl Into<String>, stops: Vec<RgbaColor>) -> Self {
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Interpolates this ramp to exactly `n` colors (`n >= 1`). Colors are
    /// sampled evenly across the ramp's stops.
    pub fn interpolate(&self, n: usize) -> Vec<RgbaColor> {
        if n == 0 {
            return Vec::new();
        }
        if self.stops.len() == 1 || n == 1 {
            return vec![self.stops[0]; n];
        }

        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                let scaled = t * (self.stops.len() - 1) as f64;
                let lower = scaled.floor() as usize;
                let upper = (lower + 1).min(self.stops.len() - 1);
                let frac = scaled - lower as f64;
                self.stops[lower].lerp(self.stops[upper], frac)
            })
            .collect()
    }
}

/// The fallback ramp used whenever a requested ramp name isn't registered:
/// a default blue-to-red ramp.
pub fn default_ramp() -> ColorRamp {
    ColorRamp::new(
        "blue-to-red",
        vec![RgbaColor::opaque(0, 0, 255), RgbaColor::opaque(255, 0, 0)],
    )
}

/// A small, read-only built-in registry of named ramps, initialized once at
/// startup. Real deployments may have a far larger table sourced from a
/// design-system palette file; this covers the defaults the HTTP surface
/// advertises from `GET /gt/colors`.
pub fn builtin_ramps() -> Vec<ColorRamp> {
    vec![
        default_ramp(),
        ColorRamp::new(
            "greens",
            vec![
                RgbaColor::opaque(237, 248, 233),
                RgbaColor::opaque(116, 196, 118),
                RgbaColor::opaque(0, 109, 44),
            ],
        ),
        ColorRamp::new(
            "viridis",
            vec![
                RgbaColor::opaque(68, 1, 84),
                RgbaColor::opaque(59, 82, 139),
                RgbaColor::opaque(33, 145, 140),
                RgbaColor::opaque(94, 201, 98),
                RgbaColor::opaque(253, 231, 37),
            ],
        ),
        ColorRamp::new(
            "grayscale",
            vec![RgbaColor::opaque(0, 0, 0), RgbaColor::opaque(255, 255, 255)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_preserves_endpoints() {
        let ramp = default_ramp();
        let colors = ramp.interpolate(5);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], ramp.stops[0]);
        assert_eq!(colors[4], ramp.stops[ramp.stops.len() - 1]);
    }

    #[test]
    fn interpolate_single_color_for_n_one() {
        let ramp = default_ramp();
        assert_eq!(ramp.interpolate(1), vec![ramp.stops[0]]);
    }
}
