// ============================================================================
// FLOOD FILL — contiguous, greedy and textured variants
// ============================================================================
//
// Fills are computed in two phases: first the candidate pixels are found
// (nothing is mutated), then the caller snapshots them for undo and applies
// the plan. Tolerance is the Chebyshev distance over RGBA (0 = exact).
// ============================================================================

use image::Rgba;

use crate::canvas::PixelBuffer;
use crate::components::colors::Swatch;
use crate::error::CoreError;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::brush::brush_rect;

/// Which pixels a fill may reach from the seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillExtent {
    /// 4-connected region around the seed.
    #[default]
    Contiguous,
    /// Every matching pixel, connected or not, inside a `reach × reach`
    /// square around the seed (`None` = the whole layer).
    Greedy { reach: Option<u32> },
}

/// Pixels selected by a fill, before any colour is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct FillCandidates {
    pub seed_colour: Rgba<u8>,
    /// Row-major for greedy fills, traversal order for contiguous ones.
    pub positions: Vec<PixelPos>,
    pub bounds: PixelRect,
}

// `Rgba<u8>` has no `Default` in image 0.24; this matches what the derive would produce.
impl Default for FillCandidates {
    fn default() -> Self {
        Self { seed_colour: Rgba([0, 0, 0, 0]), positions: Vec::new(), bounds: PixelRect::default() }
    }
}

impl FillCandidates {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Pixels and the colours a fill will give them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillPlan {
    pub pixels: Vec<(PixelPos, Rgba<u8>)>,
    pub bounds: PixelRect,
}

impl FillPlan {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Largest per-channel difference between two colours.
#[inline]
pub fn colour_distance(a: Rgba<u8>, b: Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

/// Find the pixels a fill starting at `seed` would cover.
pub fn fill_candidates(buffer: &PixelBuffer, seed: PixelPos, tolerance: u8, extent: FillExtent) -> FillCandidates {
    if !buffer.in_bounds(seed.x, seed.y) {
        return FillCandidates::default();
    }
    let seed_colour = buffer.pixel_at(seed);
    match extent {
        FillExtent::Contiguous => contiguous(buffer, seed, seed_colour, tolerance),
        FillExtent::Greedy { reach } => greedy(buffer, seed, seed_colour, tolerance, reach),
    }
}

/// DFS over a flat visited mask; the mask doubles as the output marker.
fn contiguous(buffer: &PixelBuffer, seed: PixelPos, seed_colour: Rgba<u8>, tol: u8) -> FillCandidates {
    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    let raw = buffer.as_raw();
    let mut visited = vec![false; w * h];

    #[inline(always)]
    fn pix(flat: &[u8], idx: usize) -> Rgba<u8> {
        let o = idx * 4;
        Rgba([flat[o], flat[o + 1], flat[o + 2], flat[o + 3]])
    }

    let mut positions = Vec::new();
    let mut bounds = PixelRect::EMPTY;
    let seed_idx = seed.y as usize * w + seed.x as usize;
    let mut stack: Vec<usize> = Vec::with_capacity(4096);
    visited[seed_idx] = true;
    stack.push(seed_idx);

    while let Some(idx) = stack.pop() {
        let x = idx % w;
        let y = idx / w;
        let pos = PixelPos::new(x as i32, y as i32);
        positions.push(pos);
        bounds = bounds.union(&PixelRect::new(pos.x, pos.y, 1, 1));

        let mut visit = |ni: usize| {
            if !visited[ni] && colour_distance(pix(raw, ni), seed_colour) <= tol {
                visited[ni] = true;
                stack.push(ni);
            }
        };
        if x > 0 {
            visit(idx - 1);
        }
        if x + 1 < w {
            visit(idx + 1);
        }
        if y > 0 {
            visit(idx - w);
        }
        if y + 1 < h {
            visit(idx + w);
        }
    }

    FillCandidates { seed_colour, positions, bounds }
}

fn greedy(
    buffer: &PixelBuffer,
    seed: PixelPos,
    seed_colour: Rgba<u8>,
    tol: u8,
    reach: Option<u32>,
) -> FillCandidates {
    let area = match reach {
        Some(r) => brush_rect(seed, r).clamped(buffer.width(), buffer.height()),
        None => buffer.bounds(),
    };
    let mut positions = Vec::new();
    let mut bounds = PixelRect::EMPTY;
    for pos in area.positions() {
        if colour_distance(buffer.pixel_at(pos), seed_colour) <= tol {
            positions.push(pos);
            bounds = bounds.union(&PixelRect::new(pos.x, pos.y, 1, 1));
        }
    }
    FillCandidates { seed_colour, positions, bounds }
}

/// Plan a single-colour fill.
pub fn flood_fill_contiguous(
    buffer: &PixelBuffer,
    seed: PixelPos,
    replacement: Rgba<u8>,
    tolerance: u8,
) -> FillPlan {
    solid_plan(fill_candidates(buffer, seed, tolerance, FillExtent::Contiguous), replacement)
}

/// Plan a single-colour fill of every matching pixel within reach.
pub fn flood_fill_greedy(
    buffer: &PixelBuffer,
    seed: PixelPos,
    replacement: Rgba<u8>,
    tolerance: u8,
    reach: Option<u32>,
) -> FillPlan {
    solid_plan(fill_candidates(buffer, seed, tolerance, FillExtent::Greedy { reach }), replacement)
}

pub fn solid_plan(candidates: FillCandidates, replacement: Rgba<u8>) -> FillPlan {
    FillPlan {
        bounds: candidates.bounds,
        pixels: candidates.positions.into_iter().map(|p| (p, replacement)).collect(),
    }
}

/// Plan a fill whose colours are drawn from `swatch`, weighted by how often
/// each colour appears in it. The same `rng_seed` reproduces the same fill.
pub fn flood_fill_textured(
    buffer: &PixelBuffer,
    seed: PixelPos,
    swatch: &Swatch,
    tolerance: u8,
    extent: FillExtent,
    rng_seed: u64,
) -> Result<FillPlan, CoreError> {
    let weights = swatch.weights();
    if weights.is_empty() {
        return Err(CoreError::EmptySwatch);
    }
    let candidates = fill_candidates(buffer, seed, tolerance, extent);
    Ok(FillPlan {
        bounds: candidates.bounds,
        pixels: candidates
            .positions
            .into_iter()
            .map(|p| (p, pick_weighted(&weights, texture_hash(p.x, p.y, rng_seed))))
            .collect(),
    })
}

/// Write a fill plan into the buffer. Returns the bounding rect of pixels that changed.
pub fn apply_fill(buffer: &mut PixelBuffer, plan: &FillPlan) -> PixelRect {
    let mut changed = PixelRect::EMPTY;
    for &(pos, colour) in &plan.pixels {
        if buffer.pixel_at(pos) != colour {
            buffer.put_pixel(pos.x, pos.y, colour);
            changed = changed.union(&PixelRect::new(pos.x, pos.y, 1, 1));
        }
    }
    changed
}

/// Positional hash used as the per-pixel random draw.
fn texture_hash(x: i32, y: i32, seed: u64) -> u32 {
    let s = (seed ^ (seed >> 32)) as u32;
    let mut h = (x as u32)
        .wrapping_mul(374761393)
        .wrapping_add((y as u32).wrapping_mul(668265263))
        .wrapping_add(s.wrapping_mul(1013904223));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// Pick from `(colour, probability)` pairs whose probabilities sum to 1.
fn pick_weighted(weights: &[(Rgba<u8>, f32)], hash: u32) -> Rgba<u8> {
    let t = hash as f32 / u32::MAX as f32;
    let mut acc = 0.0;
    for &(colour, p) in weights {
        acc += p;
        if t <= acc {
            return colour;
        }
    }
    weights[weights.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::colors::SwatchColour;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn split_buffer() -> PixelBuffer {
        let mut buf = PixelBuffer::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                buf.put_pixel(x, y, if x < 5 { RED } else { BLUE });
            }
        }
        buf
    }

    #[test]
    fn test_colour_distance_is_max_channel() {
        assert_eq!(colour_distance(RED, RED), 0);
        assert_eq!(colour_distance(Rgba([10, 20, 30, 255]), Rgba([12, 10, 31, 250])), 10);
    }

    #[test]
    fn test_fill_half_red_half_blue() {
        let mut buf = split_buffer();
        let plan = flood_fill_contiguous(&buf, PixelPos::new(0, 0), GREEN, 0);
        assert_eq!(plan.pixels.len(), 50);
        assert_eq!(plan.bounds, PixelRect::new(0, 0, 5, 10));
        apply_fill(&mut buf, &plan);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(buf.pixel(x, y), if x < 5 { GREEN } else { BLUE });
            }
        }
    }

    #[test]
    fn test_fill_is_four_connected() {
        let mut buf = PixelBuffer::new(3, 3);
        // Diagonal wall of red splits the corners.
        for i in 0..3 {
            buf.put_pixel(i, i, RED);
        }
        let c = fill_candidates(&buf, PixelPos::new(2, 0), 0, FillExtent::Contiguous);
        assert_eq!(c.positions.len(), 3);
    }

    #[test]
    fn test_tolerance_extends_match() {
        let mut buf = PixelBuffer::new_filled(4, 1, RED);
        buf.put_pixel(2, 0, Rgba([250, 0, 0, 255]));
        assert_eq!(fill_candidates(&buf, PixelPos::new(0, 0), 0, FillExtent::Contiguous).positions.len(), 2);
        assert_eq!(fill_candidates(&buf, PixelPos::new(0, 0), 5, FillExtent::Contiguous).positions.len(), 4);
    }

    #[test]
    fn test_seed_outside_is_empty() {
        let buf = split_buffer();
        assert!(fill_candidates(&buf, PixelPos::new(-1, 3), 0, FillExtent::Contiguous).is_empty());
    }

    #[test]
    fn test_greedy_reaches_disconnected_regions() {
        let mut buf = PixelBuffer::new_filled(7, 1, RED);
        buf.put_pixel(3, 0, BLUE);
        let all = fill_candidates(&buf, PixelPos::new(0, 0), 0, FillExtent::Greedy { reach: None });
        assert_eq!(all.positions.len(), 6);
        let near = fill_candidates(&buf, PixelPos::new(0, 0), 0, FillExtent::Greedy { reach: Some(3) });
        // Square of side 3 around x=0 spans x=-1..=1, clamped to 0..=1.
        assert_eq!(near.positions, vec![PixelPos::new(0, 0), PixelPos::new(1, 0)]);
    }

    #[test]
    fn test_textured_fill_uses_only_swatch_colours() {
        let buf = PixelBuffer::new(8, 8);
        let swatch = Swatch::new(vec![
            SwatchColour::new("a", RED),
            SwatchColour::new("b", RED),
            SwatchColour::new("c", GREEN),
        ]);
        let plan = flood_fill_textured(&buf, PixelPos::new(0, 0), &swatch, 0, FillExtent::Contiguous, 7).unwrap();
        assert_eq!(plan.pixels.len(), 64);
        assert!(plan.pixels.iter().all(|(_, c)| *c == RED || *c == GREEN));
        let reds = plan.pixels.iter().filter(|(_, c)| *c == RED).count();
        assert!(reds > 20 && reds < 64, "expected a mix weighted toward red, got {reds}");

        let again = flood_fill_textured(&buf, PixelPos::new(0, 0), &swatch, 0, FillExtent::Contiguous, 7).unwrap();
        assert_eq!(plan, again);
    }

    #[test]
    fn test_textured_fill_needs_colours() {
        let buf = PixelBuffer::new(2, 2);
        let err = flood_fill_textured(&buf, PixelPos::new(0, 0), &Swatch::default(), 0, FillExtent::Contiguous, 1);
        assert_eq!(err, Err(CoreError::EmptySwatch));
    }
}
