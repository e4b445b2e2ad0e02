//! Dominant-color extraction by reduced-precision bucketing.
//!
//! The source is resampled to a small working width, every opaque pixel is
//! assigned to one of 4096 buckets (4 bits per channel), and each bucket
//! reports the true mean of the pixels that fell into it. Buckets are ranked
//! by how many pixels they collected.

use std::collections::HashMap;

use image::{RgbaImage, imageops::FilterType};
use palette::Srgb;

use crate::color::{ColorInfo, MIN_COLOR_COUNT};
use crate::config::QuantizerConfig;
use crate::{PaletteError, Result};

/// Running totals for one quantized color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    pub r_sum: u64,
    pub g_sum: u64,
    pub b_sum: u64,
    pub count: u32,
}

impl Bucket {
    fn add(&mut self, r: u8, g: u8, b: u8) {
        self.r_sum += r as u64;
        self.g_sum += g as u64;
        self.b_sum += b as u64;
        self.count += 1;
    }

    /// Mean color, each channel rounded to the nearest integer.
    pub fn mean(&self) -> Srgb<u8> {
        let n = self.count.max(1) as u64;
        let avg = |sum: u64| ((sum + n / 2) / n) as u8;
        Srgb::new(avg(self.r_sum), avg(self.g_sum), avg(self.b_sum))
    }
}

/// Pack the top four bits of each channel into a 12-bit key.
#[inline(always)]
pub fn bucket_key(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 4) << 8) | ((g as u16 >> 4) << 4) | (b as u16 >> 4)
}

/// Width/height of the working copy: `working_width` wide, aspect preserved,
/// at least one pixel and at most `max_height` pixels tall.
fn working_size(width: u32, height: u32, working_width: u32, max_height: u32) -> (u32, u32) {
    let w = working_width.max(1);
    let h = (height as f64 * w as f64 / width as f64).round();
    (w, h.clamp(1.0, max_height.max(1) as f64) as u32)
}

/// Accumulate buckets over `pixels`, skipping anything below the alpha
/// threshold. Buckets come back ranked by hit count, ties in the order their
/// first pixel was seen.
pub fn build_buckets(pixels: &RgbaImage, alpha_threshold: u8) -> Vec<Bucket> {
    let mut index: HashMap<u16, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for px in pixels.pixels() {
        let [r, g, b, a] = px.0;
        if a < alpha_threshold {
            continue;
        }
        let slot = *index.entry(bucket_key(r, g, b)).or_insert_with(|| {
            buckets.push(Bucket::default());
            buckets.len() - 1
        });
        buckets[slot].add(r, g, b);
    }

    // Stable, so equal counts keep first-seen order.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Extract up to `max(3, count)` dominant colors, most frequent first, using
/// the default tuning.
pub fn extract_dominant_colors(pixels: &RgbaImage, count: usize) -> Result<Vec<ColorInfo>> {
    extract_dominant_colors_with(pixels, count, &QuantizerConfig::default())
}

pub fn extract_dominant_colors_with(
    pixels: &RgbaImage,
    count: usize,
    config: &QuantizerConfig,
) -> Result<Vec<ColorInfo>> {
    let (orig_w, orig_h) = pixels.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(PaletteError::zero_dimension(orig_w, orig_h));
    }

    let (w, h) = working_size(orig_w, orig_h, config.working_width, config.max_working_height);
    let working = image::imageops::resize(pixels, w, h, FilterType::Nearest);

    let buckets = build_buckets(&working, config.alpha_threshold);
    let keep = count.max(MIN_COLOR_COUNT);

    tracing::debug!(
        width = orig_w,
        height = orig_h,
        working_height = h,
        populated = buckets.len(),
        keep,
        "quantized palette"
    );

    Ok(buckets
        .iter()
        .take(keep)
        .map(|bucket| ColorInfo::from_srgb(bucket.mean()))
        .collect())
}
