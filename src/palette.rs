//! Palette decoding of indexed map buffers into true-color rasters.
//!
//! Each buffer byte packs a palette index in its upper six bits and a shade
//! selector in its lower two. Code `0` is reserved for blank pixels and
//! decodes to opaque white without touching the palette.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, instrument, trace};

use crate::error::{MapError, Result};

/// Width and height of a map raster in pixels.
pub const MAP_SIZE: u32 = 128;

/// Number of bytes in an indexed map buffer.
pub const BUFFER_LEN: usize = (MAP_SIZE * MAP_SIZE) as usize;

/// Base map colors as `0xRRGGBB`, indexed by `(code >> 2) & 0x3F`.
pub const PALETTE: [u32; 64] = [
    0x000000, 0x7FB238, 0xF7E9A3, 0xC7C7C7, 0xFF0000, 0xA0A0FF, 0xA7A7A7, 0x007C00,
    0xFFFFFF, 0xA4A8B8, 0x976D4D, 0x707070, 0x4040FF, 0x8F7748, 0xFFFDFC, 0xD87F33,
    0xB24CD8, 0x6699D8, 0xE5E533, 0x7FCC19, 0xF27FA5, 0x4C4C4C, 0x999999, 0x4C7F99,
    0x7F3FB2, 0x334CB2, 0x664C33, 0x667F33, 0x993333, 0x191919, 0xFAEE4D, 0x5CDBD5,
    0x4A80FF, 0x00D93A, 0x815631, 0x700200, 0xD1B1A1, 0x9F5224, 0x95576C, 0x706C8A,
    0xBA8524, 0x677535, 0xA04D4E, 0x392923, 0x876B62, 0x575C5C, 0x7A4958, 0x4C3E5C,
    0x4C3223, 0x4C522A, 0x8E3C2E, 0x251610, 0xBD3031, 0x94405F, 0x5C191D, 0x167E86,
    0x3A8E8C, 0x562C3E, 0x14B485, 0x646464, 0xD8AF93, 0x7FA796, 0x000000, 0x000000,
];

/// Color emitted for the blank code.
pub const BLANK: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Brightness multiplier for a shade selector, as a numerator over 255.
pub const fn shade_multiplier(shade: u8) -> u32 {
    match shade & 0x3 {
        0 => 135,
        1 => 180,
        2 => 220,
        _ => 255,
    }
}

/// Decode a single color code to an opaque RGBA pixel.
///
/// Channels are scaled with truncating division, which yields the same bytes
/// as single-precision `channel * (n / 255)` truncation for every channel value.
pub const fn decode_color(code: u8) -> Rgba<u8> {
    if code == 0 {
        return BLANK;
    }
    let base = ((code >> 2) & 0x3F) as usize;
    let rgb = PALETTE[base];
    let m = shade_multiplier(code & 0x3);
    Rgba([
        scale((rgb >> 16) & 0xFF, m),
        scale((rgb >> 8) & 0xFF, m),
        scale(rgb & 0xFF, m),
        0xFF,
    ])
}

#[allow(clippy::cast_possible_truncation)]
const fn scale(channel: u32, m: u32) -> u8 {
    (channel * m / 255) as u8
}

/// Decode a row-major indexed buffer into a 128x128 raster.
#[instrument(skip(buffer), fields(len = buffer.len()))]
pub fn decode(buffer: &[u8]) -> Result<RgbaImage> {
    if buffer.len() != BUFFER_LEN {
        return Err(MapError::InvalidBuffer {
            expected: BUFFER_LEN,
            actual: buffer.len(),
        });
    }

    let raster = RgbaImage::from_fn(MAP_SIZE, MAP_SIZE, |x, y| {
        decode_color(buffer[(x + y * MAP_SIZE) as usize])
    });
    trace!("Decoded map buffer");
    Ok(raster)
}

/// Decode a buffer and write it as a PNG file, replacing any existing file.
#[instrument(skip(buffer), fields(path = %path.display()))]
pub fn write_png(buffer: &[u8], path: &Path) -> Result<()> {
    let raster = decode(buffer)?;
    raster
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| MapError::ImageEncode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    debug!("Wrote map raster");
    Ok(())
}
