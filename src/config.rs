//! Tunable parameters for palette extraction and the mosaic renderer.
//!
//! Every field has a default, so a JSON file only needs to name the values it
//! overrides:
//!
//! ```
//! use creature_palette_wasm::PaletteConfig;
//!
//! let config = PaletteConfig::from_json(r#"{ "mosaic": { "blocks_across": 20 } }"#)?;
//! assert_eq!(config.mosaic.blocks_across, 20);
//! assert_eq!(config.quantizer.working_width, 160);
//! # Ok::<(), creature_palette_wasm::PaletteError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub quantizer: QuantizerConfig,
    pub mosaic: MosaicConfig,
}

/// Parameters of the dominant-color quantizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    /// Width the source is resampled to before sampling. Bounds the cost of an
    /// extraction independently of the original resolution.
    pub working_width: u32,
    /// Upper bound on the working copy's height. Very tall, narrow sources are
    /// squashed to this height rather than stretched without limit.
    pub max_working_height: u32,
    /// Pixels with alpha below this value are treated as background.
    pub alpha_threshold: u8,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            working_width: 160,
            max_working_height: 1600,
            alpha_threshold: 128,
        }
    }
}

/// Parameters of the pixelation renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Approximate number of blocks across the source width.
    pub blocks_across: u32,
    /// Smallest block edge, in source pixels.
    pub min_block_size: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            blocks_across: 40,
            min_block_size: 8,
        }
    }
}

impl MosaicConfig {
    /// Block edge length in source pixels for an image of the given width.
    pub fn block_size(&self, source_width: u32) -> u32 {
        let across = self.blocks_across.max(1);
        (source_width / across).max(self.min_block_size).max(1)
    }
}

impl PaletteConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
