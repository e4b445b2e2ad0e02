//! Color encodings shared by the quantizer, the mosaic readout and exports.
//!
//! A [`ColorInfo`] carries one color in three textual forms. All three are
//! always derived from the same 8-bit RGB triple, so they never disagree.

use std::fmt;
use std::str::FromStr;

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};

use crate::{PaletteError, Result};

/// Smallest palette size offered to the user.
pub const MIN_COLOR_COUNT: usize = 3;
/// Largest palette size offered to the user. The remote classifier is always
/// asked for this many colors so the palette can be narrowed client side.
pub const MAX_COLOR_COUNT: usize = 12;

/// One palette entry: `{ hex, rgb, hsl }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorInfo {
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
}

impl ColorInfo {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            hex: to_hex(r, g, b),
            rgb: to_rgb_string(r, g, b),
            hsl: to_hsl_string(r, g, b),
        }
    }

    pub fn from_srgb(color: Srgb<u8>) -> Self {
        Self::from_rgb(color.red, color.green, color.blue)
    }

    /// The field matching `format`.
    pub fn value(&self, format: ColorFormat) -> &str {
        match format {
            ColorFormat::Hex => &self.hex,
            ColorFormat::Rgb => &self.rgb,
            ColorFormat::Hsl => &self.hsl,
        }
    }
}

/// Which of the three encodings a palette is browsed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    #[default]
    Hex,
    Rgb,
    Hsl,
}

impl FromStr for ColorFormat {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "rgb" => Ok(Self::Rgb),
            "hsl" => Ok(Self::Hsl),
            other => Err(PaletteError::InvalidInput(format!("unknown color format {other:?}"))),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hex => "hex",
            Self::Rgb => "rgb",
            Self::Hsl => "hsl",
        })
    }
}

/// `#RRGGBB`, uppercase.
pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// `rgb(r, g, b)`.
pub fn to_rgb_string(r: u8, g: u8, b: u8) -> String {
    format!("rgb({r}, {g}, {b})")
}

/// `hsl(H, S%, L%)` with hue in whole degrees and saturation/lightness in
/// whole percent. Achromatic colors report a hue and saturation of zero.
pub fn to_hsl_string(r: u8, g: u8, b: u8) -> String {
    let rgb: Srgb<f64> = Srgb::new(r, g, b).into_format();
    let hsl: Hsl<palette::encoding::Srgb, f64> = Hsl::from_color(rgb);

    format!(
        "hsl({}, {}%, {}%)",
        hsl.hue.into_positive_degrees().round() as u32,
        (hsl.saturation * 100.0).round() as u32,
        (hsl.lightness * 100.0).round() as u32,
    )
}

/// Parse `#RRGGBB` (the leading `#` is optional, digits are case-insensitive).
pub fn parse_hex(s: &str) -> Result<Srgb<u8>> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidHex(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| PaletteError::InvalidHex(s.to_string()))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// The leading `count` entries of a palette sorted by dominance, with `count`
/// clamped to the sizes offered to the user.
pub fn select_colors(colors: &[ColorInfo], count: usize) -> &[ColorInfo] {
    let count = count.clamp(MIN_COLOR_COUNT, MAX_COLOR_COUNT);
    &colors[..count.min(colors.len())]
}
