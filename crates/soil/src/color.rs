//! Display colours for humidity, rocks, and tile previews.

use crate::cell::{Cell, Tile, MAX_HUMIDITY, ROCK_IMPERMEABILITY};

/// 4-byte RGBA pixel: `#[repr(C)]` so a grid of them is a ready-made image buffer.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::opaque(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::opaque(0x00, 0x00, 0x00);

    /// Overrides every other colour for the focused cell.
    pub const HIGHLIGHT: Self = Self::BLACK;

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    #[must_use]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Top of the humidity hue ramp, in degrees. Dry is red (0°), saturated is blue.
pub const WET_HUE: f32 = 240.0;

/// Colour of one simulated cell.
#[must_use]
pub fn color_of(cell: Cell, is_rock: bool, is_hovered: bool) -> Rgba {
    if is_hovered {
        return Rgba::HIGHLIGHT;
    }
    if is_rock {
        let alpha = (cell.impermeability / ROCK_IMPERMEABILITY) * 255.0;
        return Rgba {
            a: alpha as u8,
            ..Rgba::WHITE
        };
    }
    let hue = (cell.humidity / MAX_HUMIDITY) * WET_HUE;
    hsv(f32::from(hue as u16), 1.0, 1.0)
}

/// HSV to RGB, hue in degrees, saturation and value in `[0, 1]`.
#[must_use]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Rgba {
    let h = hue.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - f * saturation);
    let t = value * (1.0 - (1.0 - f) * saturation);
    let (r, g, b) = match sector as u8 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Rgba::opaque(channel(r), channel(g), channel(b))
}

fn channel(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

/// Static preview palette keyed by tile code; unknown codes are white.
#[must_use]
pub fn tile_color(tile: Tile) -> Rgba {
    match tile.code() {
        Tile::RAIN => Rgba::opaque(0x12, 0x4e, 0x89),
        Tile::ROCK => Rgba::opaque(0x5a, 0x69, 0x88),
        Tile::CLAY => Rgba::opaque(0xbe, 0x4a, 0x2f),
        Tile::SAND => Rgba::opaque(0xea, 0xd4, 0xaa),
        Tile::HARD_SOIL => Rgba::opaque(0x55, 0x38, 0x29),
        Tile::LOOSE_SOIL => Rgba::opaque(0x27, 0x1f, 0x1e),
        _ => Rgba::WHITE,
    }
}
