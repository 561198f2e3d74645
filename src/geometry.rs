use serde::{Deserialize, Serialize};

/// A pixel coordinate in image space. May lie outside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Axis-aligned rectangle in image pixels. `x`/`y` is the top-left pixel,
/// the rectangle covers `[x, x + width) × [y, y + height)`.
///
/// A rectangle with zero width or height is "empty" and means "no area".
/// Edge math runs in `i64`, and results that leave the `i32` plane are cut
/// back to it rather than wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const EMPTY: PixelRect = PixelRect { x: 0, y: 0, width: 0, height: 0 };

    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two corner pixels (inclusive), in any order.
    pub fn from_corners(a: PixelPos, b: PixelPos) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(
            min_x,
            min_y,
            a.x.abs_diff(b.x).saturating_add(1),
            a.y.abs_diff(b.y).saturating_add(1),
        )
        .fitted()
    }

    /// Rectangle spanning `[a, b)`, i.e. a drag where both corners are edges
    /// rather than pixels. Two equal points give an empty rect.
    pub fn from_edges(a: PixelPos, b: PixelPos) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(
            min_x,
            min_y,
            a.x.abs_diff(b.x),
            a.y.abs_diff(b.y),
        )
        .fitted()
    }

    /// Cut the rect so `right()` and `bottom()` fit in an `i32`.
    fn fitted(self) -> Self {
        let room_x = (i32::MAX as i64 - self.x as i64) as u64;
        let room_y = (i32::MAX as i64 - self.y as i64) as u64;
        Self::new(
            self.x,
            self.y,
            (self.width as u64).min(room_x) as u32,
            (self.height as u64).min(room_y) as u32,
        )
    }

    fn from_edges_i64(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        let min_x = min_x.clamp(i32::MIN as i64, i32::MAX as i64);
        let min_y = min_y.clamp(i32::MIN as i64, i32::MAX as i64);
        let max_x = max_x.clamp(min_x, i32::MAX as i64);
        let max_y = max_y.clamp(min_y, i32::MAX as i64);
        Self::new(min_x as i32, min_y as i32, (max_x - min_x) as u32, (max_y - min_y) as u32)
    }

    /// The whole canvas.
    pub fn canvas(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i32 {
        self.right_i64().min(i32::MAX as i64) as i32
    }

    pub fn bottom(&self) -> i32 {
        self.bottom_i64().min(i32::MAX as i64) as i32
    }

    fn right_i64(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    fn bottom_i64(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn top_left(&self) -> PixelPos {
        PixelPos::new(self.x, self.y)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, pos: PixelPos) -> bool {
        let (x, y) = (pos.x as i64, pos.y as i64);
        pos.x >= self.x && x < self.right_i64() && pos.y >= self.y && y < self.bottom_i64()
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right_i64() <= self.right_i64()
                && other.bottom_i64() <= self.bottom_i64())
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }

    /// Intersection with another rect. Empty if they do not overlap.
    pub fn intersect(&self, other: &PixelRect) -> Self {
        let min_x = self.x.max(other.x) as i64;
        let min_y = self.y.max(other.y) as i64;
        let max_x = self.right_i64().min(other.right_i64());
        let max_y = self.bottom_i64().min(other.bottom_i64());
        if max_x <= min_x || max_y <= min_y {
            return Self::EMPTY;
        }
        Self::from_edges_i64(min_x, min_y, max_x, max_y)
    }

    /// Smallest rect covering both. An empty operand is ignored.
    pub fn union(&self, other: &PixelRect) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let min_x = self.x.min(other.x) as i64;
        let min_y = self.y.min(other.y) as i64;
        let max_x = self.right_i64().max(other.right_i64());
        let max_y = self.bottom_i64().max(other.bottom_i64());
        Self::from_edges_i64(min_x, min_y, max_x, max_y)
    }

    /// Clip to `[0, width) × [0, height)`.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        self.intersect(&Self::canvas(width, height))
    }

    /// Shift the rect (without resizing) so it lies inside the canvas where
    /// possible. A rect larger than the canvas is pinned to the origin and clipped.
    pub fn bounded(&self, width: u32, height: u32) -> Self {
        let max_x = width as i64 - self.width as i64;
        let max_y = height as i64 - self.height as i64;
        let x = (self.x as i64).min(max_x).max(0);
        let y = (self.y as i64).min(max_y).max(0);
        Self::new(x as i32, y as i32, self.width, self.height).clamped(width, height)
    }

    /// Center of the rect in continuous coordinates.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Iterate over every pixel position inside the rect, row-major.
    pub fn positions(&self) -> impl Iterator<Item = PixelPos> + '_ {
        let (x0, x1) = (self.x, self.right());
        (self.y..self.bottom()).flat_map(move |y| (x0..x1).map(move |x| PixelPos::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_is_inclusive() {
        let r = PixelRect::from_corners(PixelPos::new(6, 6), PixelPos::new(4, 4));
        assert_eq!(r, PixelRect::new(4, 4, 3, 3));
    }

    #[test]
    fn test_from_edges_zero_size() {
        let r = PixelRect::from_edges(PixelPos::new(3, 3), PixelPos::new(3, 3));
        assert!(r.is_empty());
        let r = PixelRect::from_edges(PixelPos::new(5, 1), PixelPos::new(2, 4));
        assert_eq!(r, PixelRect::new(2, 1, 3, 3));
    }

    #[test]
    fn test_clamped_out_of_bounds_is_empty() {
        let r = PixelRect::new(20, 20, 5, 5).clamped(10, 10);
        assert!(r.is_empty());
        let r = PixelRect::new(-3, 8, 6, 6).clamped(10, 10);
        assert_eq!(r, PixelRect::new(0, 8, 3, 2));
    }

    #[test]
    fn test_bounded_keeps_size() {
        let r = PixelRect::new(8, -2, 4, 4).bounded(10, 10);
        assert_eq!(r, PixelRect::new(6, 0, 4, 4));
        let r = PixelRect::new(3, 3, 20, 2).bounded(10, 10);
        assert_eq!(r, PixelRect::new(0, 3, 10, 2));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = PixelRect::new(1, 1, 2, 2);
        assert_eq!(a.union(&PixelRect::EMPTY), a);
        assert_eq!(
            a.union(&PixelRect::new(5, 0, 1, 1)),
            PixelRect::new(1, 0, 5, 3)
        );
    }

    #[test]
    fn test_positions_row_major() {
        let r = PixelRect::new(1, 2, 2, 2);
        let pts: Vec<_> = r.positions().collect();
        assert_eq!(
            pts,
            vec![
                PixelPos::new(1, 2),
                PixelPos::new(2, 2),
                PixelPos::new(1, 3),
                PixelPos::new(2, 3)
            ]
        );
    }

    #[test]
    fn test_extreme_rects_do_not_wrap() {
        let r = PixelRect::from_corners(PixelPos::new(-2_000_000_000, 0), PixelPos::new(2_000_000_000, 5));
        assert_eq!(r.x, -2_000_000_000);
        assert_eq!(r.right(), 2_000_000_001);
        assert_eq!(r.clamped(10, 8), PixelRect::new(0, 0, 10, 6));

        let whole = PixelRect::from_corners(PixelPos::new(i32::MIN, i32::MIN), PixelPos::new(i32::MAX, i32::MAX));
        assert_eq!(whole.right(), i32::MAX);
        assert_eq!(whole.clamped(4, 4), PixelRect::canvas(4, 4));

        let edges = PixelRect::from_edges(PixelPos::new(i32::MAX, 0), PixelPos::new(i32::MIN, 3));
        assert_eq!(edges.clamped(4, 4), PixelRect::new(0, 0, 4, 3));

        let far = PixelRect::new(i32::MAX - 1, 0, 1, 1).translated(i32::MAX, 0);
        assert_eq!(far.right(), i32::MAX);
        assert!(far.clamped(4, 4).is_empty());
        assert_eq!(far.bounded(10, 10), PixelRect::new(9, 0, 1, 1));
        assert_eq!(PixelRect::new(i32::MIN, 0, 3, 3).bounded(10, 10), PixelRect::new(0, 0, 3, 3));
        assert_eq!(far.union(&PixelRect::new(i32::MIN, 0, 1, 1)).x, i32::MIN);
    }
}
