use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use creature_palette_wasm::{
    ColorFormat, PaletteConfig, build_mosaic_with, decode_image, export, extract_dominant_colors_with,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Extract dominant color palettes and pixelated previews from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of dominant colors to report (at least 3)
    #[arg(short = 'k', long, default_value_t = 7)]
    n_colors: usize,

    /// Color encoding to print: hex, rgb or hsl
    #[arg(short, long, default_value = "hex")]
    format: ColorFormat,

    /// Also write a pixelated preview of this display width
    #[arg(short, long)]
    mosaic_width: Option<u32>,

    /// Write <name>.css and <name>.json palette exports
    #[arg(short, long)]
    export: bool,

    /// Palette name used in exports (defaults to the file stem)
    #[arg(short, long)]
    name: Option<String>,

    /// JSON file overriding quantizer and mosaic tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for previews and exports
    #[arg(short = 'd', long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creature_palette_wasm=info,creature_palette=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PaletteConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PaletteConfig::default(),
    };

    fs::create_dir_all(&args.out_dir)?;

    for input in &args.inputs {
        process(input, &args, &config).with_context(|| format!("processing {}", input.display()))?;
    }

    Ok(())
}

fn process(input: &Path, args: &Args, config: &PaletteConfig) -> Result<()> {
    let bytes = fs::read(input)?;
    let pixels = decode_image(&bytes).context("image decode failed")?;
    let colors = extract_dominant_colors_with(&pixels, args.n_colors, &config.quantizer)?;

    let stem = input.file_stem().unwrap_or_default().to_string_lossy().into_owned();
    tracing::info!(input = %input.display(), colors = colors.len(), "extracted palette");

    println!("{}:", input.display());
    if colors.is_empty() {
        println!("  (no opaque pixels)");
    }
    for color in &colors {
        println!("  {}", color.value(args.format));
    }

    if let Some(width) = args.mosaic_width {
        let mosaic = build_mosaic_with(&pixels, width, &config.mosaic)?;
        let out_path = args.out_dir.join(format!("{stem}_mosaic.png"));
        fs::write(&out_path, mosaic.to_png()?)?;
        println!("Saved → {}", out_path.display());
    }

    if args.export {
        let name = args.name.clone().unwrap_or_else(|| stem.clone());
        let css_path = args.out_dir.join(format!("{stem}.css"));
        let json_path = args.out_dir.join(format!("{stem}.json"));
        fs::write(&css_path, export::to_css(&name, &colors))?;
        fs::write(&json_path, export::to_json(&name, &colors)?)?;
        println!("Saved → {}", css_path.display());
        println!("Saved → {}", json_path.display());
    }

    Ok(())
}
