// ============================================================================
// MUTATION PRIMITIVES — region paint / replace / erase on a single layer
// ============================================================================
//
// Every primitive clamps its rectangle to the buffer first. A rectangle that
// falls completely outside the buffer is a no-op. Each returns the rectangle
// it actually touched so callers can mark it dirty and snapshot it for undo.
// ============================================================================

use image::{Rgba, RgbaImage};

use crate::canvas::{PixelBuffer, TRANSPARENT};
use crate::geometry::{PixelPos, PixelRect};

/// How a stamped colour combines with what is already in the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompositionMode {
    /// Alpha-composite the source over the destination.
    #[default]
    SourceOver,
    /// Overwrite the destination.
    Source,
    /// Make the destination fully transparent.
    Clear,
}

/// Source-over alpha compositing, with an extra opacity factor on `src`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let opacity = opacity.clamp(0.0, 1.0);
    if src[3] == 0 || opacity <= 0.0 {
        return dst;
    }
    if opacity >= 1.0 && (src[3] == 255 || dst[3] == 0) {
        return src;
    }
    let sa = src[3] as f32 / 255.0 * opacity;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a < 0.001 {
        return TRANSPARENT;
    }
    let inv = 1.0 / out_a;
    let channel = |s: u8, d: u8| -> u8 {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) * inv).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// The colour a pixel ends up with when `color` is applied in `mode`.
#[inline]
pub fn composed(existing: Rgba<u8>, color: Rgba<u8>, mode: CompositionMode) -> Rgba<u8> {
    match mode {
        CompositionMode::SourceOver => blend_over(existing, color, 1.0),
        CompositionMode::Source => color,
        CompositionMode::Clear => TRANSPARENT,
    }
}

/// The part of `rect` a source image of `source_size` placed at the rect's
/// origin can cover, clipped to the buffer.
fn source_target(buffer: &PixelBuffer, rect: PixelRect, source: &RgbaImage) -> PixelRect {
    PixelRect::new(
        rect.x,
        rect.y,
        rect.width.min(source.width()),
        rect.height.min(source.height()),
    )
    .clamped(buffer.width(), buffer.height())
}

/// Alpha-composite `source` (placed at `rect`'s origin) over the buffer.
pub fn paint_region(buffer: &mut PixelBuffer, rect: PixelRect, source: &RgbaImage) -> PixelRect {
    let target = source_target(buffer, rect, source);
    for pos in target.positions() {
        let src = *source.get_pixel((pos.x - rect.x) as u32, (pos.y - rect.y) as u32);
        if src[3] == 0 {
            continue;
        }
        let dst = buffer.pixel_at(pos);
        buffer.put_pixel(pos.x, pos.y, blend_over(dst, src, 1.0));
    }
    target
}

/// Overwrite the buffer with `source` (placed at `rect`'s origin), no blending.
pub fn replace_region(buffer: &mut PixelBuffer, rect: PixelRect, source: &RgbaImage) -> PixelRect {
    let target = source_target(buffer, rect, source);
    if target.is_empty() {
        return target;
    }
    let src_rect = PixelRect::new(
        target.x - rect.x,
        target.y - rect.y,
        target.width,
        target.height,
    );
    let clipped = image::imageops::crop_imm(
        source,
        src_rect.x as u32,
        src_rect.y as u32,
        src_rect.width,
        src_rect.height,
    )
    .to_image();
    buffer.blit(target.top_left(), &clipped);
    target
}

/// Make every pixel in `rect` fully transparent.
pub fn erase_region(buffer: &mut PixelBuffer, rect: PixelRect) -> PixelRect {
    let target = rect.clamped(buffer.width(), buffer.height());
    for pos in target.positions() {
        buffer.put_pixel(pos.x, pos.y, TRANSPARENT);
    }
    target
}

/// Apply `color` in `mode` at every position, returning the bounding rect of
/// the pixels that actually changed.
pub fn apply_pixels<I>(buffer: &mut PixelBuffer, positions: I, color: Rgba<u8>, mode: CompositionMode) -> PixelRect
where
    I: IntoIterator<Item = PixelPos>,
{
    let mut changed = PixelRect::EMPTY;
    for pos in positions {
        if !buffer.in_bounds(pos.x, pos.y) {
            continue;
        }
        let old = buffer.pixel_at(pos);
        let new = composed(old, color, mode);
        if new != old {
            buffer.put_pixel(pos.x, pos.y, new);
            changed = changed.union(&PixelRect::new(pos.x, pos.y, 1, 1));
        }
    }
    changed
}
