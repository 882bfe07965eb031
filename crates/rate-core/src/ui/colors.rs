//! Color definitions and conversions
//!
//! Colors are stored as RGB565. Configured colors arrive as `#RRGGBB` or
//! `#AARRGGBB` hex strings; the alpha channel is dropped because the raster
//! buffer has none.
//!
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;

// ============================================================================
// Default Colors
// ============================================================================

/// Selected color used when neither the attributes nor the theme supply one
pub const DEFAULT_SELECTED: Rgb565 = Rgb565::new(0xfe >> 3, 0xa0 >> 2, 0x02 >> 3);

/// Line and hollow point color
pub const DEFAULT_SIMPLE: Rgb565 = Rgb565::new(0xd8 >> 3, 0xd8 >> 2, 0xd8 >> 3);

/// Last link of the background chain
pub const FALLBACK_BACKGROUND: Rgb565 = Rgb565::WHITE;

/// Opacity (out of 255) of the black unselected label text
pub const SIMPLE_TEXT_ALPHA: u8 = 0x61;

// ============================================================================
// Conversions
// ============================================================================

/// Parse a `#RRGGBB` or `#AARRGGBB` hex color.
///
/// Returns `None` for anything else, including a missing `#`.
pub fn parse_hex(value: &str) -> Option<Rgb565> {
    let digits = value.trim().strip_prefix('#')?;
    if !matches!(digits.len(), 6 | 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let argb = u32::from_str_radix(digits, 16).ok()?;
    Some(from_argb(argb))
}

/// Convert a packed `0xAARRGGBB` value, ignoring alpha.
pub fn from_argb(argb: u32) -> Rgb565 {
    let r = (argb >> 16) as u8;
    let g = (argb >> 8) as u8;
    let b = argb as u8;
    Rgb888::new(r, g, b).into()
}

/// Composite `fg` with opacity `alpha` (0-255) over `bg`.
pub fn blend(fg: Rgb565, bg: Rgb565, alpha: u8) -> Rgb565 {
    let mix = |f: u8, b: u8| -> u8 {
        let a = u16::from(alpha);
        ((u16::from(f) * a + u16::from(b) * (255 - a) + 127) / 255) as u8
    };
    Rgb565::new(
        mix(fg.r(), bg.r()),
        mix(fg.g(), bg.g()),
        mix(fg.b(), bg.b()),
    )
}
