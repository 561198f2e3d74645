use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::components::notes::Note;
use crate::error::CoreError;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::primitives::blend_over;

/// Fully transparent pixel, returned for reads outside the buffer.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest canvas the core will create (256 megapixels).
pub const MAX_CANVAS_PIXELS: u64 = 256_000_000;

// ============================================================================
// PIXEL BUFFER – one layer's RGBA grid
// ============================================================================

/// A width×height grid of RGBA8 pixels.
///
/// Reads outside the buffer return [`TRANSPARENT`] and writes outside it are
/// dropped, so callers never have to bounds-check individual pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, color) }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::canvas(self.width(), self.height())
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Read a pixel (transparent outside the buffer).
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba<u8> {
        if self.in_bounds(x, y) {
            *self.image.get_pixel(x as u32, y as u32)
        } else {
            TRANSPARENT
        }
    }

    #[inline]
    pub fn pixel_at(&self, pos: PixelPos) -> Rgba<u8> {
        self.pixel(pos.x, pos.y)
    }

    /// Write a pixel (ignored outside the buffer).
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, pixel);
        }
    }

    /// Copy the part of `rect` that lies inside the buffer.
    /// The returned image has the clamped rect's size.
    pub fn copy_region(&self, rect: PixelRect) -> RgbaImage {
        let r = rect.clamped(self.width(), self.height());
        if r.is_empty() {
            return RgbaImage::new(0, 0);
        }
        image::imageops::crop_imm(&self.image, r.x as u32, r.y as u32, r.width, r.height).to_image()
    }

    /// Copy `rect` verbatim, padding the parts outside the buffer with transparency.
    /// The returned image always has `rect`'s size.
    pub fn copy_region_padded(&self, rect: PixelRect) -> RgbaImage {
        let mut out = RgbaImage::new(rect.width, rect.height);
        for (lx, ly, px) in out.enumerate_pixels_mut() {
            *px = self.pixel(rect.x + lx as i32, rect.y + ly as i32);
        }
        out
    }

    /// Overwrite pixels with `src` placed at `origin`, clipped to the buffer.
    pub fn blit(&mut self, origin: PixelPos, src: &RgbaImage) {
        let target = PixelRect::new(origin.x, origin.y, src.width(), src.height())
            .clamped(self.width(), self.height());
        if target.is_empty() {
            return;
        }
        let stride = self.width() as usize * 4;
        let run = target.width as usize * 4;
        let src_stride = src.width() as usize * 4;
        let src_x = (target.x - origin.x) as usize;
        let dst = self.image.as_mut();
        let src_raw = src.as_raw();
        for row in 0..target.height as usize {
            let sy = (target.y - origin.y) as usize + row;
            let dy = target.y as usize + row;
            let s_off = sy * src_stride + src_x * 4;
            let d_off = dy * stride + target.x as usize * 4;
            dst[d_off..d_off + run].copy_from_slice(&src_raw[s_off..s_off + run]);
        }
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for p in self.image.pixels_mut() {
            *p = color;
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.image.as_raw().len()
    }
}

// ============================================================================
// LAYERS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub pixels: PixelBuffer,
}

impl Layer {
    pub fn new(name: String, width: u32, height: u32, fill_color: Rgba<u8>) -> Self {
        Self {
            name,
            visible: true,
            opacity: 1.0,
            pixels: PixelBuffer::new_filled(width, height, fill_color),
        }
    }
}

// ============================================================================
// CANVAS STATE
// ============================================================================

/// The document being edited: layer stack, dimensions and annotations.
#[derive(Clone, Debug)]
pub struct CanvasState {
    pub layers: Vec<Layer>,
    pub active_layer_index: usize,
    pub width: u32,
    pub height: u32,
    pub notes: Vec<Note>,
    /// Union of everything modified since the collaborator last took it.
    pub dirty_rect: Option<PixelRect>,
    /// Monotonically increasing counter, bumped on each mark_dirty call
    pub dirty_generation: u64,
}

impl CanvasState {
    /// A canvas with one transparent layer.
    pub fn new(width: u32, height: u32) -> Result<Self, CoreError> {
        Self::check_dimensions(width, height)?;
        Ok(Self {
            layers: vec![Layer::new("Layer 1".to_string(), width, height, TRANSPARENT)],
            active_layer_index: 0,
            width,
            height,
            notes: Vec::new(),
            dirty_rect: None,
            dirty_generation: 0,
        })
    }

    /// A canvas whose single layer holds `image`.
    pub fn from_image(image: RgbaImage) -> Result<Self, CoreError> {
        let (width, height) = image.dimensions();
        let mut state = Self::new(width, height)?;
        state.layers[0].pixels = PixelBuffer::from_image(image);
        Ok(state)
    }

    pub fn check_dimensions(width: u32, height: u32) -> Result<(), CoreError> {
        if width == 0 || height == 0 || width as u64 * height as u64 > MAX_CANVAS_PIXELS {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(())
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::canvas(self.width, self.height)
    }

    pub fn layer(&self, index: usize) -> Result<&Layer, CoreError> {
        let count = self.layers.len();
        self.layers.get(index).ok_or(CoreError::LayerOutOfRange { index, count })
    }

    pub fn layer_mut(&mut self, index: usize) -> Result<&mut Layer, CoreError> {
        let count = self.layers.len();
        self.layers.get_mut(index).ok_or(CoreError::LayerOutOfRange { index, count })
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(self.active_layer_index)
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(self.active_layer_index)
    }

    /// Record that `rect` (or everything, for `None`) needs redrawing.
    pub fn mark_dirty(&mut self, rect: Option<PixelRect>) {
        let new_rect = rect.unwrap_or_else(|| self.bounds()).clamped(self.width, self.height);
        // Merge with any existing dirty rect so we never lose pending updates
        self.dirty_rect = Some(match self.dirty_rect {
            Some(existing) => existing.union(&new_rect),
            None => new_rect,
        });
        self.dirty_generation = self.dirty_generation.wrapping_add(1);
    }

    pub fn take_dirty_rect(&mut self) -> Option<PixelRect> {
        self.dirty_rect.take()
    }

    /// Flatten the visible layers bottom-to-top.
    pub fn composite(&self) -> RgbaImage {
        let w = self.width as usize;
        let mut result = RgbaImage::new(self.width, self.height);
        if w == 0 {
            return result;
        }
        let layers: Vec<&Layer> = self
            .layers
            .iter()
            .filter(|l| l.visible && l.opacity > 0.0)
            .collect();

        result
            .as_mut()
            .par_chunks_mut(w * 4)
            .enumerate()
            .for_each(|(y, row_out)| {
                for layer in &layers {
                    let raw = layer.pixels.as_raw();
                    let row_in = &raw[y * w * 4..(y + 1) * w * 4];
                    for x in 0..w {
                        let o = x * 4;
                        let top = Rgba([row_in[o], row_in[o + 1], row_in[o + 2], row_in[o + 3]]);
                        if top[3] == 0 {
                            continue;
                        }
                        let base = Rgba([row_out[o], row_out[o + 1], row_out[o + 2], row_out[o + 3]]);
                        let out = blend_over(base, top, layer.opacity);
                        row_out[o..o + 4].copy_from_slice(&out.0);
                    }
                }
            });
        result
    }

    /// Hash of everything an undo step can change: dimensions, layers, notes.
    /// Used to recognise edits that net out to no change.
    pub fn content_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.layers.len().hash(&mut hasher);
        for layer in &self.layers {
            layer.name.hash(&mut hasher);
            layer.visible.hash(&mut hasher);
            layer.opacity.to_bits().hash(&mut hasher);
            layer.pixels.as_raw().hash(&mut hasher);
        }
        self.notes.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_out_of_bounds_access_is_harmless() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.put_pixel(-1, 2, RED);
        buf.put_pixel(4, 0, RED);
        assert_eq!(buf.pixel(-1, 2), TRANSPARENT);
        assert!(buf.as_raw().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_copy_region_clamps() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.put_pixel(3, 3, RED);
        let region = buf.copy_region(PixelRect::new(2, 2, 5, 5));
        assert_eq!(region.dimensions(), (2, 2));
        assert_eq!(*region.get_pixel(1, 1), RED);
        let padded = buf.copy_region_padded(PixelRect::new(2, 2, 5, 5));
        assert_eq!(padded.dimensions(), (5, 5));
        assert_eq!(*padded.get_pixel(1, 1), RED);
        assert_eq!(*padded.get_pixel(4, 4), TRANSPARENT);
    }

    #[test]
    fn test_blit_clips_to_buffer() {
        let mut buf = PixelBuffer::new(4, 4);
        let src = RgbaImage::from_pixel(3, 3, RED);
        buf.blit(PixelPos::new(-1, 2), &src);
        assert_eq!(buf.pixel(0, 2), RED);
        assert_eq!(buf.pixel(1, 3), RED);
        assert_eq!(buf.pixel(2, 2), TRANSPARENT);
        assert_eq!(buf.pixel(0, 1), TRANSPARENT);
    }

    #[test]
    fn test_rejects_zero_size_canvas() {
        assert!(CanvasState::new(0, 10).is_err());
        assert!(CanvasState::new(10, 10).is_ok());
    }

    #[test]
    fn test_composite_respects_visibility_and_order() {
        let mut state = CanvasState::new(2, 1).unwrap();
        state.layers[0].pixels.put_pixel(0, 0, RED);
        let mut top = Layer::new("top".into(), 2, 1, TRANSPARENT);
        top.pixels.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        top.pixels.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        state.layers.push(top);

        let img = state.composite();
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));

        state.layers[1].visible = false;
        let img = state.composite();
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(1, 0), TRANSPARENT);
    }

    #[test]
    fn test_fingerprint_tracks_pixels() {
        let mut state = CanvasState::new(3, 3).unwrap();
        let before = state.content_fingerprint();
        state.layers[0].pixels.put_pixel(1, 1, RED);
        assert_ne!(state.content_fingerprint(), before);
        state.layers[0].pixels.put_pixel(1, 1, TRANSPARENT);
        assert_eq!(state.content_fingerprint(), before);
    }
}
