//! Pixelated "mosaic" rendering with a hover lookup grid.
//!
//! The source is cut into square blocks (roughly 40 across, never smaller
//! than 8 source pixels), every block is flattened to the mean of its pixels,
//! and the result is painted at display scale. The block colors are kept in a
//! row-major grid so pointer positions can be answered without touching the
//! raster again.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::color::to_hex;
use crate::config::MosaicConfig;
use crate::{PaletteError, Result};

/// Row-major hex colors, one per mosaic block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MosaicGrid {
    rows: usize,
    columns: usize,
    cells: Vec<String>,
}

impl MosaicGrid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + column).map(String::as_str)
    }
}

/// A rendered mosaic: the display-sized raster plus its lookup grid.
#[derive(Debug, Clone)]
pub struct Mosaic {
    raster: RgbaImage,
    grid: MosaicGrid,
    block_size: u32,
}

impl Mosaic {
    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn grid(&self) -> &MosaicGrid {
        &self.grid
    }

    /// Block edge length in source pixels.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Hex color under a pointer at display coordinates `(x, y)`.
    pub fn color_at(&self, x: f64, y: f64) -> Option<&str> {
        query_mosaic_color(
            &self.grid.cells,
            self.grid.rows,
            self.grid.columns,
            self.raster.width() as f64,
            self.raster.height() as f64,
            x,
            y,
        )
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(PaletteError::Encode)?;
        Ok(buf)
    }

    pub fn into_parts(self) -> (RgbaImage, MosaicGrid) {
        (self.raster, self.grid)
    }
}

/// Render `pixels` as a mosaic `display_width` pixels wide using the default
/// block sizing.
pub fn build_mosaic(pixels: &RgbaImage, display_width: u32) -> Result<Mosaic> {
    build_mosaic_with(pixels, display_width, &MosaicConfig::default())
}

pub fn build_mosaic_with(
    pixels: &RgbaImage,
    display_width: u32,
    config: &MosaicConfig,
) -> Result<Mosaic> {
    let (src_w, src_h) = pixels.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(PaletteError::zero_dimension(src_w, src_h));
    }
    if display_width == 0 {
        return Err(PaletteError::InvalidInput("display width cannot be zero".into()));
    }

    let scale = display_width as f64 / src_w as f64;
    // Truncated, like assigning a fractional size to a canvas.
    let display_height = (src_h as u64 * display_width as u64 / src_w as u64).max(1) as u32;
    let block = config.block_size(src_w);

    let columns = src_w.div_ceil(block) as usize;
    let rows = src_h.div_ceil(block) as usize;

    let mut raster = RgbaImage::new(display_width, display_height);
    let mut cells = Vec::with_capacity(rows * columns);

    // Block edges on screen; rounding keeps neighbouring blocks gap-free.
    let to_screen_x = |v: u32| ((v as f64 * scale).round() as u32).min(display_width);
    let to_screen_y = |v: u32| ((v as f64 * scale).round() as u32).min(display_height);

    for y in (0..src_h).step_by(block as usize) {
        for x in (0..src_w).step_by(block as usize) {
            let w = block.min(src_w - x);
            let h = block.min(src_h - y);
            let [r, g, b] = block_mean(pixels, x, y, w, h);

            cells.push(to_hex(r, g, b));

            let fill = Rgba([r, g, b, 255]);
            for sy in to_screen_y(y)..to_screen_y(y + h) {
                for sx in to_screen_x(x)..to_screen_x(x + w) {
                    raster.put_pixel(sx, sy, fill);
                }
            }
        }
    }

    tracing::debug!(
        width = src_w,
        height = src_h,
        display_width,
        display_height,
        block,
        rows,
        columns,
        "built mosaic"
    );

    Ok(Mosaic {
        raster,
        grid: MosaicGrid { rows, columns, cells },
        block_size: block,
    })
}

/// Truncated mean of R, G, B over a block. Alpha does not take part.
fn block_mean(pixels: &RgbaImage, x0: u32, y0: u32, w: u32, h: u32) -> [u8; 3] {
    let mut sum = [0u64; 3];
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let px = pixels.get_pixel(x, y).0;
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }
    let n = (w as u64 * h as u64).max(1);
    [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8]
}

/// Look up the hex color under a pointer.
///
/// `cells` is the row-major grid of `rows × columns` entries and the raster
/// is `raster_width × raster_height` display pixels. Positions outside the
/// raster, non-finite positions and empty grids all yield `None`.
pub fn query_mosaic_color(
    cells: &[String],
    rows: usize,
    columns: usize,
    raster_width: f64,
    raster_height: f64,
    x: f64,
    y: f64,
) -> Option<&str> {
    if rows == 0 || columns == 0 || raster_width <= 0.0 || raster_height <= 0.0 {
        return None;
    }
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }

    let block_w = raster_width / columns as f64;
    let block_h = raster_height / rows as f64;
    let column = (x / block_w).floor() as usize;
    let row = (y / block_h).floor() as usize;

    if row >= rows || column >= columns {
        return None;
    }
    cells.get(row * columns + column).map(String::as_str)
}

/// Keeps the current source image and the mosaic rendered from it.
///
/// Every change of image or display width rebuilds the mosaic from scratch
/// and replaces the previous one; the most recent call always wins.
#[derive(Debug, Clone)]
pub struct PixelatedView {
    source: RgbaImage,
    config: MosaicConfig,
    mosaic: Mosaic,
}

impl PixelatedView {
    pub fn new(source: RgbaImage, display_width: u32) -> Result<Self> {
        Self::with_config(source, display_width, MosaicConfig::default())
    }

    pub fn with_config(source: RgbaImage, display_width: u32, config: MosaicConfig) -> Result<Self> {
        let mosaic = build_mosaic_with(&source, display_width, &config)?;
        Ok(Self { source, config, mosaic })
    }

    pub fn mosaic(&self) -> &Mosaic {
        &self.mosaic
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// Rebuild for a new container width.
    pub fn resize(&mut self, display_width: u32) -> Result<()> {
        self.mosaic = build_mosaic_with(&self.source, display_width, &self.config)?;
        Ok(())
    }

    /// Swap in a new source image and rebuild.
    pub fn set_image(&mut self, source: RgbaImage, display_width: u32) -> Result<()> {
        self.mosaic = build_mosaic_with(&source, display_width, &self.config)?;
        self.source = source;
        Ok(())
    }

    pub fn color_at(&self, x: f64, y: f64) -> Option<&str> {
        self.mosaic.color_at(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrants(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| match (x < w / 2, y < h / 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        })
    }

    #[test]
    fn grid_shape_for_400_by_300() {
        let mosaic = build_mosaic(&quadrants(400, 300), 400).unwrap();
        assert_eq!(mosaic.block_size(), 10);
        assert_eq!(mosaic.grid().rows(), 30);
        assert_eq!(mosaic.grid().columns(), 40);
        assert_eq!(mosaic.grid().cells().len(), 1200);
    }

    #[test]
    fn trailing_blocks_are_clamped() {
        let img = RgbaImage::from_fn(20, 9, |x, _| {
            if x < 16 { Rgba([0, 0, 0, 255]) } else { Rgba([200, 100, 50, 255]) }
        });
        let mosaic = build_mosaic(&img, 20).unwrap();
        assert_eq!(mosaic.block_size(), 8);
        assert_eq!((mosaic.grid().rows(), mosaic.grid().columns()), (2, 3));
        assert_eq!(mosaic.grid().get(0, 2), Some("#C86432"));
        assert_eq!(mosaic.grid().get(1, 2), Some("#C86432"));
        assert_eq!(mosaic.grid().get(1, 0), Some("#000000"));
    }

    #[test]
    fn block_mean_truncates_and_ignores_alpha() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([10, 10, 10, 255]));
        img.put_pixel(0, 0, Rgba([11, 75, 255, 0]));
        // sums: 63*10 + 11 = 641, 63*10 + 75 = 705, 63*10 + 255 = 885
        assert_eq!(block_mean(&img, 0, 0, 8, 8), [10, 11, 13]);
    }

    #[test]
    fn raster_is_scaled_and_flat() {
        let mosaic = build_mosaic(&quadrants(400, 300), 200).unwrap();
        assert_eq!((mosaic.width(), mosaic.height()), (200, 150));
        assert_eq!(mosaic.raster().get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(mosaic.raster().get_pixel(190, 10).0, [0, 255, 0, 255]);
        assert_eq!(mosaic.raster().get_pixel(10, 140).0, [0, 0, 255, 255]);
        assert_eq!(mosaic.raster().get_pixel(199, 149).0, [255, 255, 255, 255]);
    }

    #[test]
    fn display_height_is_truncated() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([9, 9, 9, 255]));
        let mosaic = build_mosaic(&img, 2).unwrap();
        assert_eq!((mosaic.width(), mosaic.height()), (2, 1));
        assert_eq!(mosaic.raster().get_pixel(1, 0).0, [9, 9, 9, 255]);

        let tall = build_mosaic(&quadrants(400, 299), 200).unwrap();
        assert_eq!(tall.height(), 149);
        assert_eq!(tall.raster().get_pixel(199, 148).0, [255, 255, 255, 255]);

        let flat = build_mosaic(&RgbaImage::new(100, 1), 10).unwrap();
        assert_eq!(flat.height(), 1);
    }

    #[test]
    fn point_query_maps_to_blocks() {
        let mosaic = build_mosaic(&quadrants(400, 300), 200).unwrap();
        assert_eq!(mosaic.color_at(0.0, 0.0), Some("#FF0000"));
        assert_eq!(mosaic.color_at(150.0, 20.0), Some("#00FF00"));
        assert_eq!(mosaic.color_at(20.0, 120.0), Some("#0000FF"));
        assert_eq!(mosaic.color_at(199.9, 149.9), Some("#FFFFFF"));
    }

    #[test]
    fn point_query_outside_raster_is_none() {
        let mosaic = build_mosaic(&quadrants(400, 300), 200).unwrap();
        assert_eq!(mosaic.color_at(-1.0, 10.0), None);
        assert_eq!(mosaic.color_at(10.0, -0.5), None);
        assert_eq!(mosaic.color_at(200.0, 10.0), None);
        assert_eq!(mosaic.color_at(10.0, 150.0), None);
        assert_eq!(mosaic.color_at(f64::NAN, 10.0), None);
        assert_eq!(mosaic.color_at(f64::INFINITY, 10.0), None);
    }

    #[test]
    fn empty_grid_has_no_colors() {
        assert_eq!(query_mosaic_color(&[], 0, 0, 100.0, 100.0, 5.0, 5.0), None);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert!(matches!(
            build_mosaic(&RgbaImage::new(10, 0), 100),
            Err(PaletteError::InvalidInput(_))
        ));
        assert!(matches!(
            build_mosaic(&quadrants(16, 16), 0),
            Err(PaletteError::InvalidInput(_))
        ));
    }

    #[test]
    fn resize_replaces_the_mosaic() {
        let mut view = PixelatedView::new(quadrants(400, 300), 400).unwrap();
        assert_eq!(view.mosaic().width(), 400);
        view.resize(100).unwrap();
        assert_eq!((view.mosaic().width(), view.mosaic().height()), (100, 75));
        assert_eq!(view.color_at(99.0, 74.0), Some("#FFFFFF"));

        view.set_image(RgbaImage::from_pixel(80, 80, Rgba([1, 2, 3, 255])), 40).unwrap();
        assert_eq!(view.mosaic().grid().rows(), 10);
        assert_eq!(view.color_at(39.0, 0.0), Some("#010203"));
    }

    #[test]
    fn png_output_decodes_back() {
        let mosaic = build_mosaic(&quadrants(64, 64), 32).unwrap();
        let png = mosaic.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 32));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
