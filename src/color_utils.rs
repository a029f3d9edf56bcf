//! Layer colours and the colour maps applied to normalised slice
//! intensities.

use serde::{Deserialize, Serialize};

/// Hue step between consecutive generated colours (degrees).
pub const GOLDEN_ANGLE: f32 = 137.5;

/// Convert HSV (hue in degrees, saturation and value in [0, 1]) to RGB in
/// [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let chroma = v * s;
    let sector = h.rem_euclid(360.0) / 60.0;
    let mid = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let base = v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, mid, 0.0),
        1 => (mid, chroma, 0.0),
        2 => (0.0, chroma, mid),
        3 => (0.0, mid, chroma),
        4 => (mid, 0.0, chroma),
        _ => (chroma, 0.0, mid),
    };
    (r + base, g + base, b + base)
}

/// Distinct display colour for the `index`-th item of a palette.
pub fn golden_angle_color(index: usize) -> [u8; 3] {
    let hue = (index as f32 * GOLDEN_ANGLE) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Quantise a [0, 1] value to a byte.
pub fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Colour map applied to a normalised intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMap {
    #[default]
    Gray,
    Hot,
    Jet,
    Cool,
}

impl ColorMap {
    /// All colour maps, in menu order.
    pub const ALL: [ColorMap; 4] = [ColorMap::Gray, ColorMap::Hot, ColorMap::Jet, ColorMap::Cool];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ColorMap::Gray => "Gray",
            ColorMap::Hot => "Hot",
            ColorMap::Jet => "Jet",
            ColorMap::Cool => "Cool",
        }
    }

    /// RGB for intensity `v`, clamped to [0, 1].
    pub fn lookup(self, v: f32) -> [u8; 3] {
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let (r, g, b) = match self {
            ColorMap::Gray => (v, v, v),
            ColorMap::Hot => (3.0 * v, 3.0 * v - 1.0, 3.0 * v - 2.0),
            ColorMap::Jet => (
                1.5 - (4.0 * v - 3.0).abs(),
                1.5 - (4.0 * v - 2.0).abs(),
                1.5 - (4.0 * v - 1.0).abs(),
            ),
            ColorMap::Cool => (v, 1.0 - v, 1.0),
        };
        [to_u8(r), to_u8(g), to_u8(b)]
    }
}
