//! [`PatchCanvas`], the pixel buffer a patch is drawn into, and [`RenderedPatch`], the
//! finished image.

use alloc::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::{CellSize, ContentHash, LocalPoint, RasterOptions, Texel};

/// Resolution of a [`PatchCanvas`].
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CanvasMode {
    /// One pixel per face. Used while no face of the patch has drawn a tile.
    Flat,
    /// [`RasterOptions::tile_resolution`] pixels square per face.
    Tiled,
}

/// Pixel buffer for one patch.
///
/// The canvas is addressed in cells, one per face, in the patch's local coordinates.
/// There is a margin of one cell on every side, so valid cells range from `-1` to
/// `width` (or `height`) inclusive; the margin receives [border extension] only.
///
/// The canvas starts in [`CanvasMode::Flat`] and may switch to [`CanvasMode::Tiled`] once,
/// by [`PatchCanvas::upscale()`]; it never switches back.
///
/// [border extension]: crate::extend_border
#[derive(Clone, Debug)]
pub struct PatchCanvas {
    image: RgbaImage,
    mode: CanvasMode,
    tile_resolution: u32,
}

impl PatchCanvas {
    /// Creates a flat canvas for a patch of `size` faces, filled with the background color.
    pub fn new(size: CellSize, options: &RasterOptions) -> Self {
        Self {
            image: RgbaImage::from_pixel(
                size.width + 2,
                size.height + 2,
                Rgba(options.background),
            ),
            mode: CanvasMode::Flat,
            tile_resolution: options.tile_resolution,
        }
    }

    #[allow(missing_docs)]
    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Side length of one cell in pixels: 1 when flat, the tile resolution when tiled.
    pub fn cell_pixels(&self) -> u32 {
        match self.mode {
            CanvasMode::Flat => 1,
            CanvasMode::Tiled => self.tile_resolution,
        }
    }

    /// The image as drawn so far.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Returns the pixel coordinates of the upper-left corner of `cell`, or [`None`] if the
    /// cell is outside the canvas (including its margin).
    fn cell_origin(&self, cell: LocalPoint) -> Option<(u32, u32)> {
        let px = self.cell_pixels();
        let x = u32::try_from(cell.x.checked_add(1)?).ok()?.checked_mul(px)?;
        let y = u32::try_from(cell.y.checked_add(1)?).ok()?.checked_mul(px)?;
        let (width, height) = self.image.dimensions();
        (x < width && y < height).then_some((x, y))
    }

    /// Switches from [`CanvasMode::Flat`] to [`CanvasMode::Tiled`], stretching every pixel
    /// drawn so far to cover its whole cell.
    ///
    /// Returns false and does nothing if the canvas is already tiled.
    pub fn upscale(&mut self) -> bool {
        if self.mode == CanvasMode::Tiled {
            return false;
        }
        let scale = self.tile_resolution;
        let flat = &self.image;
        let (width, height) = flat.dimensions();
        self.image = RgbaImage::from_fn(width * scale, height * scale, |x, y| {
            *flat.get_pixel(x / scale, y / scale)
        });
        self.mode = CanvasMode::Tiled;
        log::debug!(
            "upscaled patch canvas from {width}×{height} to {}×{}",
            self.image.width(),
            self.image.height()
        );
        true
    }

    /// Paints a whole cell with `color`: a single pixel when flat, a block when tiled.
    ///
    /// Returns false if the cell is outside the canvas.
    pub fn fill_cell(&mut self, cell: LocalPoint, color: Texel) -> bool {
        let Some((x0, y0)) = self.cell_origin(cell) else {
            return false;
        };
        let px = self.cell_pixels();
        for y in y0..y0 + px {
            for x in x0..x0 + px {
                self.image.put_pixel(x, y, Rgba(color));
            }
        }
        true
    }

    /// Copies `tile` into `cell` as-is.
    ///
    /// Returns false if the canvas is not tiled or the cell is outside the canvas.
    pub fn draw_tile(&mut self, cell: LocalPoint, tile: &RgbaImage) -> bool {
        let Some((x0, y0)) = self.tile_destination(cell) else {
            return false;
        };
        let tile = fit_tile(tile, self.tile_resolution);
        imageops::replace(&mut self.image, &*tile, i64::from(x0), i64::from(y0));
        true
    }

    /// Copies `tile` into `cell` reflected through its center, which is the same as
    /// rotating it by 180°, without making a rotated copy.
    ///
    /// Returns false if the canvas is not tiled or the cell is outside the canvas.
    pub fn draw_tile_reflected(&mut self, cell: LocalPoint, tile: &RgbaImage) -> bool {
        let Some((x0, y0)) = self.tile_destination(cell) else {
            return false;
        };
        let tile = fit_tile(tile, self.tile_resolution);
        let last = self.tile_resolution.saturating_sub(1);
        for y in 0..self.tile_resolution {
            for x in 0..self.tile_resolution {
                self.image
                    .put_pixel(x0 + x, y0 + y, *tile.get_pixel(last - x, last - y));
            }
        }
        true
    }

    fn tile_destination(&self, cell: LocalPoint) -> Option<(u32, u32)> {
        if self.mode != CanvasMode::Tiled {
            log::debug!("ignoring tile drawn onto flat canvas at {cell:?}");
            return None;
        }
        self.cell_origin(cell)
    }

    /// Returns the color of the upper-left pixel of `cell`.
    pub fn cell_texel(&self, cell: LocalPoint) -> Option<Texel> {
        let (x, y) = self.cell_origin(cell)?;
        Some(self.image.get_pixel(x, y).0)
    }

    /// Stops drawing and returns the finished image.
    pub fn finish(self) -> RenderedPatch {
        RenderedPatch {
            image: self.image,
            mode: self.mode,
        }
    }
}

/// Scales `tile` to `resolution` square by nearest-neighbor sampling, if it is not
/// already that size.
fn fit_tile(tile: &RgbaImage, resolution: u32) -> Cow<'_, RgbaImage> {
    if tile.dimensions() == (resolution, resolution) {
        Cow::Borrowed(tile)
    } else {
        log::trace!(
            "resizing {}×{} tile to {resolution}×{resolution}",
            tile.width(),
            tile.height()
        );
        Cow::Owned(imageops::resize(
            tile,
            resolution,
            resolution,
            FilterType::Nearest,
        ))
    }
}

/// The finished texture of a patch, produced by
/// [`PatchRasterizer::render()`](crate::PatchRasterizer::render).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedPatch {
    image: RgbaImage,
    mode: CanvasMode,
}

impl RenderedPatch {
    #[allow(missing_docs)]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The resolution the canvas ended up at.
    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Computes the atlas key of this image.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_image(&self.image)
    }

    #[allow(missing_docs)]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point2;
    use pretty_assertions::assert_eq;

    const BLACK: Texel = [0, 0, 0, 255];
    const RED: Texel = [255, 0, 0, 255];
    const BLUE: Texel = [0, 0, 255, 255];

    fn options(tile_resolution: u32) -> RasterOptions {
        RasterOptions {
            tile_resolution,
            ..RasterOptions::default()
        }
    }

    #[test]
    fn new_canvas_has_margin_and_background() {
        let canvas = PatchCanvas::new(CellSize::new(3, 2), &RasterOptions::default());
        assert_eq!(canvas.image().dimensions(), (5, 4));
        assert_eq!(canvas.mode(), CanvasMode::Flat);
        assert!(canvas.image().pixels().all(|p| p.0 == BLACK));
    }

    #[test]
    fn fill_cell_flat_is_one_pixel() {
        let mut canvas = PatchCanvas::new(CellSize::new(2, 2), &RasterOptions::default());
        assert!(canvas.fill_cell(point2(0, 0), RED));
        assert_eq!(canvas.image().get_pixel(1, 1).0, RED);
        assert_eq!(canvas.image().get_pixel(0, 0).0, BLACK);
        assert_eq!(canvas.image().get_pixel(2, 1).0, BLACK);
    }

    #[test]
    fn fill_cell_out_of_canvas() {
        let mut canvas = PatchCanvas::new(CellSize::new(2, 2), &RasterOptions::default());
        // margin cells are writable
        assert!(canvas.fill_cell(point2(-1, -1), RED));
        assert!(canvas.fill_cell(point2(2, 2), RED));
        // beyond the margin is not
        assert!(!canvas.fill_cell(point2(-2, 0), RED));
        assert!(!canvas.fill_cell(point2(0, 3), RED));
    }

    #[test]
    fn upscale_stretches_pixels_once() {
        let mut canvas = PatchCanvas::new(CellSize::new(1, 1), &options(4));
        canvas.fill_cell(point2(0, 0), RED);
        assert!(canvas.upscale());
        assert_eq!(canvas.mode(), CanvasMode::Tiled);
        assert_eq!(canvas.image().dimensions(), (12, 12));
        for y in 0..12 {
            for x in 0..12 {
                let inside = (4..8).contains(&x) && (4..8).contains(&y);
                let expected = if inside { RED } else { BLACK };
                assert_eq!(canvas.image().get_pixel(x, y).0, expected, "({x}, {y})");
            }
        }
        assert!(!canvas.upscale());
        assert_eq!(canvas.image().dimensions(), (12, 12));
    }

    #[test]
    fn fill_cell_tiled_is_block() {
        let mut canvas = PatchCanvas::new(CellSize::new(2, 1), &options(4));
        canvas.upscale();
        canvas.fill_cell(point2(1, 0), BLUE);
        assert_eq!(canvas.cell_texel(point2(1, 0)), Some(BLUE));
        assert_eq!(canvas.image().get_pixel(8, 4).0, BLUE);
        assert_eq!(canvas.image().get_pixel(11, 7).0, BLUE);
        assert_eq!(canvas.image().get_pixel(12, 4).0, BLACK);
        assert_eq!(canvas.image().get_pixel(7, 4).0, BLACK);
    }

    #[test]
    fn tiles_need_tiled_mode() {
        let tile = RgbaImage::from_pixel(4, 4, Rgba(RED));
        let mut canvas = PatchCanvas::new(CellSize::new(1, 1), &options(4));
        assert!(!canvas.draw_tile(point2(0, 0), &tile));
        assert!(!canvas.draw_tile_reflected(point2(0, 0), &tile));
        canvas.upscale();
        assert!(canvas.draw_tile(point2(0, 0), &tile));
        assert_eq!(canvas.cell_texel(point2(0, 0)), Some(RED));
    }

    #[test]
    fn draw_tile_reflected_matches_rotate180() {
        let tile = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let mut direct = PatchCanvas::new(CellSize::new(1, 1), &options(4));
        let mut reflected = direct.clone();
        direct.upscale();
        reflected.upscale();
        direct.draw_tile(point2(0, 0), &imageops::rotate180(&tile));
        reflected.draw_tile_reflected(point2(0, 0), &tile);
        assert_eq!(direct.image(), reflected.image());
        assert_eq!(reflected.image().get_pixel(4, 4).0, [3, 3, 7, 255]);
    }

    #[test]
    fn draw_tile_resizes_mismatched_tile() {
        let tile = RgbaImage::from_pixel(2, 2, Rgba(BLUE));
        let mut canvas = PatchCanvas::new(CellSize::new(1, 1), &options(4));
        canvas.upscale();
        canvas.draw_tile(point2(0, 0), &tile);
        for y in 4..8 {
            for x in 4..8 {
                assert_eq!(canvas.image().get_pixel(x, y).0, BLUE);
            }
        }
        assert_eq!(canvas.image().get_pixel(8, 4).0, BLACK);
    }

    #[test]
    fn finish_keeps_mode() {
        let mut canvas = PatchCanvas::new(CellSize::new(1, 1), &options(2));
        canvas.upscale();
        let rendered = canvas.finish();
        assert_eq!(rendered.mode(), CanvasMode::Tiled);
        assert_eq!(rendered.image().dimensions(), (6, 6));
        assert_eq!(rendered.content_hash(), rendered.clone().content_hash());
    }
}
