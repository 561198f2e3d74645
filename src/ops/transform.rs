// ============================================================================
// TRANSFORM OPERATIONS — flip, rotate, HSL for floating contents; resize for
// the whole canvas
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

use crate::canvas::{CanvasState, PixelBuffer, TRANSPARENT};
use crate::error::CoreError;
use crate::geometry::{PixelPos, PixelRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOrientation {
    /// Mirror left↔right.
    Horizontal,
    /// Mirror top↔bottom.
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationAngle {
    Clockwise90,
    CounterClockwise90,
    Half,
}

impl RotationAngle {
    /// Angle in degrees; only ±90 and ±180 are representable.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            90 => Some(Self::Clockwise90),
            270 => Some(Self::CounterClockwise90),
            180 => Some(Self::Half),
            _ => None,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        !matches!(self, Self::Half)
    }
}

/// Hue shift in degrees, saturation and lightness in -100..=100 percent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HslAdjustment {
    pub hue_shift: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HslAdjustment {
    pub fn is_identity(&self) -> bool {
        self.hue_shift.rem_euclid(360.0) == 0.0 && self.saturation == 0.0 && self.lightness == 0.0
    }
}

// ---------------------------------------------------------------------------
//  Floating-contents transforms
// ---------------------------------------------------------------------------

pub fn flip_image(img: &RgbaImage, orientation: FlipOrientation) -> RgbaImage {
    match orientation {
        FlipOrientation::Horizontal => imageops::flip_horizontal(img),
        FlipOrientation::Vertical => imageops::flip_vertical(img),
    }
}

pub fn rotate_image(img: &RgbaImage, angle: RotationAngle) -> RgbaImage {
    match angle {
        RotationAngle::Clockwise90 => imageops::rotate90(img),
        RotationAngle::CounterClockwise90 => imageops::rotate270(img),
        RotationAngle::Half => imageops::rotate180(img),
    }
}

/// Where content occupying `rect` lands after rotating about the rect's centre,
/// kept inside the canvas.
pub fn rotated_bounds(rect: PixelRect, angle: RotationAngle, width: u32, height: u32) -> PixelRect {
    if !angle.swaps_dimensions() {
        return rect;
    }
    let dx = (rect.width as i32 - rect.height as i32).div_euclid(2);
    let dy = (rect.height as i32 - rect.width as i32).div_euclid(2);
    PixelRect::new(rect.x + dx, rect.y + dy, rect.height, rect.width).bounded(width, height)
}

/// Shift hue, scale saturation and offset lightness of every pixel. Alpha is kept.
pub fn adjust_hsl(img: &RgbaImage, adjustment: HslAdjustment) -> RgbaImage {
    let mut out = img.clone();
    if adjustment.is_identity() {
        return out;
    }
    let hue_shift = adjustment.hue_shift / 360.0;
    let sat_factor = 1.0 + adjustment.saturation.clamp(-100.0, 100.0) / 100.0;
    let light_offset = adjustment.lightness.clamp(-100.0, 100.0) / 100.0;

    out.as_mut().par_chunks_mut(4).for_each(|px| {
        if px[3] == 0 {
            return;
        }
        let (h, s, l) = rgb_to_hsl(px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0);
        let nh = (h + hue_shift).rem_euclid(1.0);
        let ns = (s * sat_factor).clamp(0.0, 1.0);
        let nl = (l + light_offset).clamp(0.0, 1.0);
        let (r, g, b) = hsl_to_rgb(nh, ns, nl);
        px[0] = (r * 255.0).round().clamp(0.0, 255.0) as u8;
        px[1] = (g * 255.0).round().clamp(0.0, 255.0) as u8;
        px[2] = (b * 255.0).round().clamp(0.0, 255.0) as u8;
    });
    out
}

/// RGB (0..1) → HSL (H: 0..1, S: 0..1, L: 0..1)
fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < 1e-6 {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h / 6.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    (h, s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

// ---------------------------------------------------------------------------
//  Whole-canvas transforms (affect ALL layers)
// ---------------------------------------------------------------------------

/// Scale every layer to the new size with nearest-neighbour sampling.
pub fn resize_image(state: &mut CanvasState, new_w: u32, new_h: u32) -> Result<(), CoreError> {
    CanvasState::check_dimensions(new_w, new_h)?;
    state.layers.par_iter_mut().for_each(|layer| {
        let resized = imageops::resize(layer.pixels.as_image(), new_w, new_h, imageops::FilterType::Nearest);
        layer.pixels = PixelBuffer::from_image(resized);
    });
    state.width = new_w;
    state.height = new_h;
    state.notes.retain(|n| n.position.x < new_w as i32 && n.position.y < new_h as i32);
    state.mark_dirty(None);
    Ok(())
}

/// Change the canvas size keeping content anchored at the top-left.
/// New area is transparent.
pub fn resize_canvas(state: &mut CanvasState, new_w: u32, new_h: u32) -> Result<(), CoreError> {
    CanvasState::check_dimensions(new_w, new_h)?;
    state.layers.par_iter_mut().for_each(|layer| {
        let mut resized = PixelBuffer::new_filled(new_w, new_h, TRANSPARENT);
        resized.blit(PixelPos::new(0, 0), layer.pixels.as_image());
        layer.pixels = resized;
    });
    state.width = new_w;
    state.height = new_h;
    state.notes.retain(|n| n.position.x < new_w as i32 && n.position.y < new_h as i32);
    state.mark_dirty(None);
    Ok(())
}
