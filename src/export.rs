//! Palette export as CSS custom properties or JSON.

use serde::Serialize;

use crate::Result;
use crate::color::ColorInfo;

/// `"Scarlet  Macaw"` → `"scarlet-macaw"`.
pub fn palette_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

/// One `--{slug}-color-{n}: {hex};` line per color, numbered from 1.
pub fn to_css(name: &str, colors: &[ColorInfo]) -> String {
    let slug = palette_slug(name);
    colors
        .iter()
        .enumerate()
        .map(|(i, color)| format!("--{slug}-color-{}: {};", i + 1, color.hex))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteExport<'a> {
    palette_name: String,
    colors: &'a [ColorInfo],
}

/// Pretty-printed `{ "paletteName": ..., "colors": [...] }`.
pub fn to_json(name: &str, colors: &[ColorInfo]) -> Result<String> {
    let export = PaletteExport {
        palette_name: palette_slug(name),
        colors,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
