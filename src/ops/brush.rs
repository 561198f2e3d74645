//! Brush footprints and line stamping.
//!
//! A stroke is rasterised as a 1-pixel Bresenham line and the brush footprint
//! is stamped at every step, so fast pointer moves still give a continuous
//! stroke.

use std::collections::HashSet;

use image::Rgba;

use crate::canvas::PixelBuffer;
use crate::components::tools::ToolShape;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::primitives::{CompositionMode, apply_pixels};

/// The `size × size` block a brush covers around `center`.
/// The top-left offset rounds down, so a size-1 brush is exactly one pixel.
pub fn brush_rect(center: PixelPos, size: u32) -> PixelRect {
    let size = size.max(1);
    let offset = (size / 2) as i32;
    PixelRect::new(center.x.saturating_sub(offset), center.y.saturating_sub(offset), size, size)
}

/// Pixels covered by one brush stamp.
pub fn brush_candidates(center: PixelPos, shape: ToolShape, size: u32) -> Vec<PixelPos> {
    let block = brush_rect(center, size);
    match shape {
        ToolShape::Square => block.positions().collect(),
        ToolShape::Circle => {
            let (cx, cy) = block.center();
            let radius = block.width as f32 / 2.0;
            block
                .positions()
                .filter(|p| {
                    let dx = p.x as f32 + 0.5 - cx;
                    let dy = p.y as f32 + 0.5 - cy;
                    (dx * dx + dy * dy).sqrt() <= radius
                })
                .collect()
        }
    }
}

/// Every pixel on the Bresenham line from `start` to `end`, both included.
pub fn line_points(start: PixelPos, end: PixelPos) -> Vec<PixelPos> {
    let mut x0 = start.x;
    let mut y0 = start.y;
    let (x1, y1) = (end.x, end.y);

    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = (y1 as i64 - y0 as i64).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut points = Vec::with_capacity(dx.max(dy) as usize + 1);
    loop {
        points.push(PixelPos::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

/// All pixels a brush touches while travelling from `start` to `end`,
/// without duplicates.
pub fn stroke_candidates(start: PixelPos, end: PixelPos, shape: ToolShape, size: u32) -> Vec<PixelPos> {
    let stamp = brush_candidates(PixelPos::new(0, 0), shape, size);
    let mut out: Vec<PixelPos> = line_points(start, end)
        .into_iter()
        .flat_map(|c| stamp.iter().map(move |o| c.offset(o.x, o.y)))
        .collect();
    out.sort_unstable_by_key(|p| (p.y, p.x));
    out.dedup();
    out
}

/// Bounding rect of a stroke from `start` to `end` (before clamping).
pub fn stroke_bounds(start: PixelPos, end: PixelPos, size: u32) -> PixelRect {
    brush_rect(start, size).union(&brush_rect(end, size))
}

/// Cut the segment down to the part that passes through `rect`
/// (Liang-Barsky). Segments already inside are returned untouched, so their
/// Bresenham line does not change.
pub fn clip_segment(start: PixelPos, end: PixelPos, rect: PixelRect) -> Option<(PixelPos, PixelPos)> {
    if rect.is_empty() {
        return None;
    }
    if rect.contains(start) && rect.contains(end) {
        return Some((start, end));
    }
    let (x0, y0) = (start.x as f64, start.y as f64);
    let (dx, dy) = (end.x as f64 - x0, end.y as f64 - y0);
    let (left, top) = (rect.x as f64, rect.y as f64);
    let (right, bottom) = (rect.right() as f64 - 1.0, rect.bottom() as f64 - 1.0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - left), (dx, right - x0), (-dy, y0 - top), (dy, bottom - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| {
        let x = (x0 + t * dx).round().clamp(left, right) as i32;
        let y = (y0 + t * dy).round().clamp(top, bottom) as i32;
        PixelPos::new(x, y)
    };
    Some((at(t0), at(t1)))
}

/// The buffer grown by a brush's reach, i.e. every centre whose stamp can
/// still touch a pixel.
fn reach_rect(buffer: &PixelBuffer, size: u32) -> PixelRect {
    let reach = size.max(1) as i32;
    PixelRect::new(
        -reach,
        -reach,
        buffer.width() + 2 * reach as u32,
        buffer.height() + 2 * reach as u32,
    )
}

/// Stamp the brush along the line from `start` to `end`.
/// Returns the bounding rect of the pixels that changed.
pub fn draw_line(
    buffer: &mut PixelBuffer,
    start: PixelPos,
    end: PixelPos,
    shape: ToolShape,
    size: u32,
    color: Rgba<u8>,
    mode: CompositionMode,
) -> PixelRect {
    let Some((start, end)) = clip_segment(start, end, reach_rect(buffer, size)) else {
        return PixelRect::EMPTY;
    };
    apply_pixels(buffer, stroke_candidates(start, end, shape, size), color, mode)
}

/// Like [`draw_line`], but skips pixels already in `painted` and records the
/// new ones. One stroke keeps one set, so its segments never blend a pixel twice.
pub fn draw_stroke_segment(
    buffer: &mut PixelBuffer,
    start: PixelPos,
    end: PixelPos,
    shape: ToolShape,
    size: u32,
    color: Rgba<u8>,
    mode: CompositionMode,
    painted: &mut HashSet<PixelPos>,
) -> PixelRect {
    let Some((start, end)) = clip_segment(start, end, reach_rect(buffer, size)) else {
        return PixelRect::EMPTY;
    };
    let fresh: Vec<PixelPos> = stroke_candidates(start, end, shape, size)
        .into_iter()
        .filter(|p| buffer.in_bounds(p.x, p.y) && painted.insert(*p))
        .collect();
    apply_pixels(buffer, fresh, color, mode)
}
