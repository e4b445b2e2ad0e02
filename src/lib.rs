//! Creature palette extraction and pixelated hover previews.
//!
//! Two independent passes over a decoded image:
//!
//! * [`extract_dominant_colors`] buckets opaque pixels at 4 bits per channel
//!   and reports the most populated buckets as [`ColorInfo`] values (hex, RGB
//!   and HSL strings).
//! * [`build_mosaic`] averages square blocks of the source into a flat-colored
//!   raster and keeps a grid of block colors for pointer lookups.
//!
//! Everything is exposed to JavaScript through `wasm-bindgen`; the byte-level
//! helpers ([`extract_palette_bytes`], [`pixelate_bytes`]) serve native callers.

use image::RgbaImage;
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod analysis;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod mosaic;
pub mod quantize;

pub use analysis::{
    Analysis, AnalysisResult, ClassifierError, CreatureClassifier, PaletteSource,
    analyze_with_fallback,
};
pub use color::{
    ColorFormat, ColorInfo, MAX_COLOR_COUNT, MIN_COLOR_COUNT, parse_hex, select_colors, to_hex,
    to_hsl_string, to_rgb_string,
};
pub use config::{MosaicConfig, PaletteConfig, QuantizerConfig};
pub use error::{PaletteError, Result};
pub use mosaic::{Mosaic, MosaicGrid, PixelatedView, build_mosaic, build_mosaic_with, query_mosaic_color};
pub use quantize::{extract_dominant_colors, extract_dominant_colors_with};

/// Decode image bytes (any format the `image` crate recognises) into RGBA8.
pub fn decode_image(input: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(input)?;
    tracing::debug!(width = img.width(), height = img.height(), "decoded image");
    Ok(img.to_rgba8())
}

/// Decode `input` and extract up to `max(3, n_colors)` dominant colors.
pub fn extract_palette_bytes(input: &[u8], n_colors: usize) -> Result<Vec<ColorInfo>> {
    let pixels = decode_image(input)?;
    extract_dominant_colors(&pixels, n_colors)
}

/// Decode `input`, render its mosaic at `display_width` and return the PNG
/// encoded raster together with the hover grid.
pub fn pixelate_bytes(input: &[u8], display_width: u32) -> Result<(Vec<u8>, MosaicGrid)> {
    let pixels = decode_image(input)?;
    let mosaic = build_mosaic(&pixels, display_width)?;
    let png = mosaic.to_png()?;
    let (_, grid) = mosaic.into_parts();
    Ok((png, grid))
}

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn color_to_js(color: &ColorInfo) -> Result<Object, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(&color.hex))?;
    Reflect::set(&obj, &JsValue::from_str("rgb"), &JsValue::from_str(&color.rgb))?;
    Reflect::set(&obj, &JsValue::from_str("hsl"), &JsValue::from_str(&color.hsl))?;
    Ok(obj)
}

fn colors_to_js(colors: &[ColorInfo]) -> Result<Array, JsValue> {
    let arr = Array::new();
    for color in colors {
        let obj = color_to_js(color)?;
        arr.push(&obj);
    }
    Ok(arr)
}

fn colors_from_json(colors_json: &str) -> Result<Vec<ColorInfo>, JsValue> {
    serde_json::from_str(colors_json).map_err(js_err)
}

/// Local palette for an encoded image: an array of `{ hex, rgb, hsl }`,
/// most dominant first.
#[wasm_bindgen]
pub fn extract_palette(input: Vec<u8>, n_colors: usize) -> Result<Array, JsValue> {
    let colors = extract_palette_bytes(&input, n_colors).map_err(js_err)?;
    colors_to_js(&colors)
}

/// Validate a classifier answer and narrow its palette to `n_colors`.
/// Returns `{ creatureName, description, colors }`.
#[wasm_bindgen]
pub fn parse_analysis(response: &str, n_colors: usize) -> Result<Object, JsValue> {
    let result = AnalysisResult::from_json(response)
        .map_err(|e| js_err(e.user_message()))?
        .with_color_count(n_colors);

    let obj = Object::new();
    Reflect::set(&obj, &JsValue::from_str("creatureName"), &JsValue::from_str(&result.creature_name))?;
    Reflect::set(&obj, &JsValue::from_str("description"), &JsValue::from_str(&result.description))?;
    let colors = colors_to_js(&result.colors)?;
    Reflect::set(&obj, &JsValue::from_str("colors"), &colors)?;
    Ok(obj)
}

/// CSS custom properties for a palette given as a JSON array of colors.
#[wasm_bindgen]
pub fn export_css(name: &str, colors_json: &str) -> Result<String, JsValue> {
    Ok(export::to_css(name, &colors_from_json(colors_json)?))
}

/// JSON export for a palette given as a JSON array of colors.
#[wasm_bindgen]
pub fn export_json(name: &str, colors_json: &str) -> Result<String, JsValue> {
    export::to_json(name, &colors_from_json(colors_json)?).map_err(js_err)
}

/// A pixelated view of one image, rebuilt whenever its container resizes.
#[wasm_bindgen]
pub struct WasmMosaic {
    view: PixelatedView,
}

#[wasm_bindgen]
impl WasmMosaic {
    #[wasm_bindgen(constructor)]
    pub fn new(input: Vec<u8>, display_width: u32) -> Result<WasmMosaic, JsValue> {
        let pixels = decode_image(&input).map_err(js_err)?;
        let view = PixelatedView::new(pixels, display_width).map_err(js_err)?;
        Ok(WasmMosaic { view })
    }

    pub fn resize(&mut self, display_width: u32) -> Result<(), JsValue> {
        self.view.resize(display_width).map_err(js_err)
    }

    /// Hex color under the pointer, or `undefined` outside the raster.
    #[wasm_bindgen(js_name = colorAt)]
    pub fn color_at(&self, x: f64, y: f64) -> Option<String> {
        self.view.color_at(x, y).map(str::to_owned)
    }

    /// The raster as PNG bytes.
    pub fn png(&self) -> Result<Uint8Array, JsValue> {
        let encoded = self.view.mosaic().to_png().map_err(js_err)?;
        Ok(Uint8Array::from(encoded.as_slice()))
    }

    /// The raster as raw RGBA bytes, ready for `ImageData`.
    pub fn rgba(&self) -> Uint8Array {
        Uint8Array::from(self.view.mosaic().raster().as_raw().as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.view.mosaic().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.view.mosaic().height()
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> usize {
        self.view.mosaic().grid().rows()
    }

    #[wasm_bindgen(getter)]
    pub fn columns(&self) -> usize {
        self.view.mosaic().grid().columns()
    }
}
