use image::RgbaImage;
use tracing::{debug, warn};

use crate::canvas::PixelBuffer;
use crate::components::history::{Command, PatchEdit, PixelPatch, SelectionEdit};
use crate::edit::EditContext;
use crate::error::CoreError;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::primitives::{erase_region, paint_region};
use crate::ops::transform::{
    FlipOrientation, HslAdjustment, RotationAngle, adjust_hsl, flip_image, rotate_image, rotated_bounds,
};

// ============================================================================
// SELECTION MODEL — rectangular selection with floating modifications
// ============================================================================

/// What the pending (unconfirmed) modification of the selection is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModificationKind {
    #[default]
    None,
    Paste,
    Move,
    Flip,
    Rotate,
    Hsl,
}

impl ModificationKind {
    pub fn description(self) -> &'static str {
        match self {
            ModificationKind::None => "Selection",
            ModificationKind::Paste => "Paste",
            ModificationKind::Move => "Move Selection",
            ModificationKind::Flip => "Flip Selection",
            ModificationKind::Rotate => "Rotate Selection",
            ModificationKind::Hsl => "Adjust Hue/Saturation",
        }
    }
}

/// Pointer gesture in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    /// Rubber-banding a new selection from `anchor`.
    Selecting { anchor: PixelPos },
    /// Dragging the contents; `grab` is the press point, `start_area` the
    /// area at press time.
    Dragging { grab: PixelPos, start_area: PixelRect },
}

/// Contents lifted off the layer, shown live but not yet committed.
#[derive(Clone, Debug)]
struct Modification {
    kind: ModificationKind,
    layer_index: usize,
    /// The whole layer as it was when the modification began.
    layer_snapshot: PixelBuffer,
    /// Where the contents were lifted from (empty for a paste).
    source_area: PixelRect,
    /// Selection area before the modification began.
    area_before: PixelRect,
    /// Current floating pixels.
    contents: RgbaImage,
    /// Contents at the start of an HSL session; each adjustment starts from these.
    hsl_base: Option<RgbaImage>,
    /// Everything written live so far.
    touched: PixelRect,
}

#[derive(Clone, Debug)]
pub struct SelectionModel {
    area: PixelRect,
    last_valid_area: PixelRect,
    drag: DragState,
    modification: Option<Modification>,
    pan_margin: u32,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SelectionModel {
    pub fn new(pan_margin: u32) -> Self {
        Self {
            area: PixelRect::EMPTY,
            last_valid_area: PixelRect::EMPTY,
            drag: DragState::Idle,
            modification: None,
            pan_margin,
        }
    }

    pub fn area(&self) -> PixelRect {
        self.area
    }

    pub fn has_selection(&self) -> bool {
        !self.area.is_empty()
    }

    pub fn has_modified_selection(&self) -> bool {
        self.modification.is_some()
    }

    pub fn modification_kind(&self) -> ModificationKind {
        self.modification.as_ref().map_or(ModificationKind::None, |m| m.kind)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// Forget everything without touching the canvas. Used when the canvas
    /// is replaced wholesale.
    pub fn reset(&mut self) {
        self.area = PixelRect::EMPTY;
        self.last_valid_area = PixelRect::EMPTY;
        self.drag = DragState::Idle;
        self.modification = None;
    }

    /// Adopt an area restored by undo/redo.
    pub fn restore_area(&mut self, rect: PixelRect, width: u32, height: u32) {
        self.drag = DragState::Idle;
        self.area = rect.clamped(width, height);
        if !self.area.is_empty() {
            self.last_valid_area = self.area;
        }
    }

    // ------------------------------------------------------------------
    //  Pointer gestures
    // ------------------------------------------------------------------

    pub fn press(&mut self, ctx: &mut EditContext<'_>, pos: PixelPos) {
        if self.has_selection() && self.area.contains(pos) {
            if self.modification.is_none() && !self.begin_modification(ctx, ModificationKind::Move) {
                return;
            }
            self.drag = DragState::Dragging { grab: pos, start_area: self.area };
            return;
        }

        self.confirm_pending(ctx);
        if self.has_selection() {
            self.last_valid_area = self.area;
        }
        self.drag = DragState::Selecting { anchor: pos };
        self.area = PixelRect::from_edges(pos, pos);
    }

    pub fn drag(&mut self, ctx: &mut EditContext<'_>, pos: PixelPos) {
        let (w, h) = (ctx.canvas.width, ctx.canvas.height);
        match self.drag {
            DragState::Idle => {}
            DragState::Selecting { anchor } => {
                self.area = PixelRect::from_edges(anchor, pos).clamped(w, h);
            }
            DragState::Dragging { grab, start_area } => {
                let (dx, dy) = (pos.x.saturating_sub(grab.x), pos.y.saturating_sub(grab.y));
                let moved = start_area.translated(dx, dy).bounded(w, h);
                if moved != self.area {
                    self.area = moved;
                    self.render(ctx);
                }
            }
        }
    }

    pub fn release(&mut self, ctx: &mut EditContext<'_>, pos: PixelPos) {
        self.drag(ctx, pos);
        match std::mem::take(&mut self.drag) {
            DragState::Idle => {}
            DragState::Selecting { .. } => {
                if self.area.is_empty() {
                    self.area = self.last_valid_area;
                } else {
                    self.last_valid_area = self.area;
                }
            }
            DragState::Dragging { .. } => {
                if self.modification_kind() == ModificationKind::Move {
                    self.confirm(ctx);
                }
            }
        }
    }

    /// Which way the view should scroll while a drag point is within the pan
    /// margin of the visible `viewport` (both in image pixels).
    pub fn should_pan(&self, pos: PixelPos, viewport: PixelRect) -> Option<(i32, i32)> {
        if self.drag == DragState::Idle || viewport.is_empty() {
            return None;
        }
        let margin = self.pan_margin as i32;
        let dx = if pos.x < viewport.x.saturating_add(margin) {
            -1
        } else if pos.x >= viewport.right().saturating_sub(margin) {
            1
        } else {
            0
        };
        let dy = if pos.y < viewport.y.saturating_add(margin) {
            -1
        } else if pos.y >= viewport.bottom().saturating_sub(margin) {
            1
        } else {
            0
        };
        (dx != 0 || dy != 0).then_some((dx, dy))
    }

    // ------------------------------------------------------------------
    //  Area
    // ------------------------------------------------------------------

    pub fn set_area(&mut self, ctx: &mut EditContext<'_>, rect: PixelRect) {
        self.confirm_pending(ctx);
        self.drag = DragState::Idle;
        self.area = rect.clamped(ctx.canvas.width, ctx.canvas.height);
        self.last_valid_area = self.area;
    }

    pub fn select_all(&mut self, ctx: &mut EditContext<'_>) {
        let all = ctx.canvas.bounds();
        self.set_area(ctx, all);
    }

    pub fn clear(&mut self, ctx: &mut EditContext<'_>) {
        self.set_area(ctx, PixelRect::EMPTY);
    }

    // ------------------------------------------------------------------
    //  Modifications
    // ------------------------------------------------------------------

    /// Lift the selected pixels off the active layer.
    fn begin_modification(&mut self, ctx: &mut EditContext<'_>, kind: ModificationKind) -> bool {
        if self.modification.is_some() {
            ctx.report(CoreError::ModificationInProgress);
            return false;
        }
        if !self.has_selection() {
            ctx.report(CoreError::NoSelection);
            return false;
        }
        let layer_index = ctx.canvas.active_layer_index;
        let Some(layer) = ctx.canvas.layers.get(layer_index) else {
            ctx.report(CoreError::LayerOutOfRange { index: layer_index, count: ctx.canvas.layers.len() });
            return false;
        };
        debug!(?kind, area = ?self.area, "begin selection modification");
        self.modification = Some(Modification {
            kind,
            layer_index,
            layer_snapshot: layer.pixels.clone(),
            source_area: self.area,
            area_before: self.area,
            contents: layer.pixels.copy_region(self.area),
            hsl_base: None,
            touched: PixelRect::EMPTY,
        });
        true
    }

    /// Redraw the floating contents at the current area on top of the
    /// pre-modification layer.
    fn render(&mut self, ctx: &mut EditContext<'_>) {
        let area = self.area;
        let Some(m) = self.modification.as_mut() else { return };
        let Some(layer) = ctx.canvas.layers.get_mut(m.layer_index) else {
            warn!(layer_index = m.layer_index, "modified layer vanished; dropping modification");
            self.modification = None;
            return;
        };
        let pixels = &mut layer.pixels;

        if !m.touched.is_empty() {
            pixels.blit(m.touched.top_left(), &m.layer_snapshot.copy_region(m.touched));
        }
        let erased = erase_region(pixels, m.source_area);
        let painted = paint_region(pixels, area, &m.contents);

        let dirty = m.touched.union(&erased).union(&painted);
        m.touched = dirty;
        ctx.canvas.mark_dirty(Some(dirty));
    }

    /// Commit the pending modification as one undo step.
    pub fn confirm(&mut self, ctx: &mut EditContext<'_>) -> bool {
        let Some(m) = self.modification.take() else {
            ctx.report(CoreError::NoModificationInProgress);
            return false;
        };
        self.drag = DragState::Idle;
        let li = m.layer_index;

        let source = PatchEdit {
            before: PixelPatch::from_buffer(&m.layer_snapshot, li, m.source_area),
            after: PixelPatch::capture(ctx.canvas, li, m.source_area),
        };
        let target = PatchEdit {
            before: PixelPatch::from_buffer(&m.layer_snapshot, li, self.area),
            after: PixelPatch::capture(ctx.canvas, li, self.area),
        };
        if source.is_noop() && target.is_noop() && self.area == m.area_before {
            debug!(kind = ?m.kind, "modification changed nothing; not recorded");
            return true;
        }

        let area_after = self.area;
        let command = match m.kind {
            ModificationKind::Paste => Command::Paste { used: false, target, area_before: m.area_before, area_after },
            ModificationKind::Move => Command::SelectionMove(SelectionEdit {
                kind: m.kind,
                source,
                target,
                area_before: m.area_before,
                area_after,
            }),
            kind => Command::SelectionTransform(SelectionEdit {
                kind,
                source,
                target,
                area_before: m.area_before,
                area_after,
            }),
        };
        ctx.commit(command);
        if !self.area.is_empty() {
            self.last_valid_area = self.area;
        }
        true
    }

    /// Confirm if something is pending; silent otherwise.
    pub fn confirm_pending(&mut self, ctx: &mut EditContext<'_>) {
        if self.modification.is_some() {
            self.confirm(ctx);
        }
    }

    /// Throw away the pending modification, restoring the layer and area.
    pub fn cancel(&mut self, ctx: &mut EditContext<'_>) -> bool {
        let Some(m) = self.modification.take() else {
            ctx.report(CoreError::NoModificationInProgress);
            return false;
        };
        self.drag = DragState::Idle;
        if let Some(layer) = ctx.canvas.layers.get_mut(m.layer_index)
            && !m.touched.is_empty()
        {
            layer.pixels.blit(m.touched.top_left(), &m.layer_snapshot.copy_region(m.touched));
            ctx.canvas.mark_dirty(Some(m.touched));
        }
        debug!(kind = ?m.kind, "selection modification cancelled");
        self.area = m.area_before;
        true
    }

    /// Run `f` on the floating contents, starting a modification of `kind`
    /// first if none is pending, and confirming it straight away in that case.
    fn transform(
        &mut self,
        ctx: &mut EditContext<'_>,
        kind: ModificationKind,
        f: impl FnOnce(&mut Self, u32, u32),
    ) {
        let pending = self.modification.is_some();
        if !pending && !self.begin_modification(ctx, kind) {
            return;
        }
        f(self, ctx.canvas.width, ctx.canvas.height);
        self.render(ctx);
        if !pending {
            self.confirm(ctx);
        }
    }

    pub fn flip(&mut self, ctx: &mut EditContext<'_>, orientation: FlipOrientation) {
        self.transform(ctx, ModificationKind::Flip, |sel, _, _| {
            if let Some(m) = sel.modification.as_mut() {
                m.contents = flip_image(&m.contents, orientation);
            }
        });
    }

    /// Rotations whose result would not fit on the canvas are refused, since
    /// the area cannot hold the rotated contents.
    pub fn rotate(&mut self, ctx: &mut EditContext<'_>, angle: RotationAngle) {
        let (cw, ch) = match &self.modification {
            Some(m) => m.contents.dimensions(),
            None => (self.area.width, self.area.height),
        };
        if angle.swaps_dimensions() && (ch > ctx.canvas.width || cw > ctx.canvas.height) {
            warn!(?angle, width = cw, height = ch, "rotated selection would not fit the canvas; ignored");
            return;
        }
        self.transform(ctx, ModificationKind::Rotate, |sel, w, h| {
            if let Some(m) = sel.modification.as_mut() {
                m.contents = rotate_image(&m.contents, angle);
                sel.area = rotated_bounds(sel.area, angle, w, h);
            }
        });
    }

    /// Shift the floating contents by one nudge, leaving the move pending.
    pub fn nudge(&mut self, ctx: &mut EditContext<'_>, dx: i32, dy: i32) {
        if self.modification.is_none() && !self.begin_modification(ctx, ModificationKind::Move) {
            return;
        }
        let moved = self.area.translated(dx, dy).bounded(ctx.canvas.width, ctx.canvas.height);
        if moved != self.area {
            self.area = moved;
            self.render(ctx);
        }
    }

    pub fn begin_hsl(&mut self, ctx: &mut EditContext<'_>) {
        self.confirm_pending(ctx);
        if !self.begin_modification(ctx, ModificationKind::Hsl) {
            return;
        }
        if let Some(m) = self.modification.as_mut() {
            m.hsl_base = Some(m.contents.clone());
        }
    }

    pub fn modify_hsl(&mut self, ctx: &mut EditContext<'_>, adjustment: HslAdjustment) {
        let Some(m) = self.modification.as_mut().filter(|m| m.kind == ModificationKind::Hsl) else {
            ctx.report(CoreError::NoModificationInProgress);
            return;
        };
        if let Some(base) = &m.hsl_base {
            m.contents = adjust_hsl(base, adjustment);
        }
        self.render(ctx);
    }

    pub fn end_hsl(&mut self, ctx: &mut EditContext<'_>, commit: bool) {
        if self.modification_kind() != ModificationKind::Hsl {
            ctx.report(CoreError::NoModificationInProgress);
            return;
        }
        if commit {
            self.confirm(ctx);
        } else {
            self.cancel(ctx);
        }
    }

    /// Float `image` at `pos` as a pending paste.
    pub fn paste(&mut self, ctx: &mut EditContext<'_>, image: RgbaImage, pos: PixelPos) {
        self.confirm_pending(ctx);
        if image.width() == 0 || image.height() == 0 {
            warn!("paste of an empty image ignored");
            return;
        }
        let layer_index = ctx.canvas.active_layer_index;
        let Some(layer) = ctx.canvas.layers.get(layer_index) else {
            ctx.report(CoreError::LayerOutOfRange { index: layer_index, count: ctx.canvas.layers.len() });
            return;
        };
        let area_before = self.area;
        self.area = PixelRect::new(pos.x, pos.y, image.width(), image.height())
            .bounded(ctx.canvas.width, ctx.canvas.height);
        self.drag = DragState::Idle;
        self.modification = Some(Modification {
            kind: ModificationKind::Paste,
            layer_index,
            layer_snapshot: layer.pixels.clone(),
            source_area: PixelRect::EMPTY,
            area_before,
            contents: image,
            hsl_base: None,
            touched: PixelRect::EMPTY,
        });
        self.render(ctx);
    }

    /// The selected pixels of the active layer, or the floating contents
    /// while a modification is pending.
    pub fn copy(&self, ctx: &EditContext<'_>) -> Option<RgbaImage> {
        if let Some(m) = &self.modification {
            return Some(m.contents.clone());
        }
        if !self.has_selection() {
            return None;
        }
        ctx.canvas.active_layer().map(|l| l.pixels.copy_region(self.area))
    }

    /// Erase the selection (and drop it), or the whole active layer when
    /// nothing is selected.
    pub fn delete(&mut self, ctx: &mut EditContext<'_>) {
        self.confirm_pending(ctx);
        let layer_index = ctx.canvas.active_layer_index;
        let selection = self.area;
        let rect = if selection.is_empty() { ctx.canvas.bounds() } else { selection };

        let before = PixelPatch::capture(ctx.canvas, layer_index, rect);
        let Some(layer) = ctx.canvas.layers.get_mut(layer_index) else {
            ctx.report(CoreError::LayerOutOfRange { index: layer_index, count: ctx.canvas.layers.len() });
            return;
        };
        let erased = erase_region(&mut layer.pixels, rect);
        ctx.canvas.mark_dirty(Some(erased));
        let edit = PatchEdit::capture_after(before, ctx.canvas);

        self.drag = DragState::Idle;
        self.area = PixelRect::EMPTY;
        self.last_valid_area = PixelRect::EMPTY;
        if edit.is_noop() && selection.is_empty() {
            return;
        }
        ctx.commit(Command::Delete { edit, selection });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasState, TRANSPARENT};
    use crate::components::colors::{ColourState, Swatch};
    use crate::components::history::CommandLog;
    use crate::config::EngineConfig;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    struct Fixture {
        canvas: CanvasState,
        log: CommandLog,
        colours: ColourState,
        swatch: Swatch,
        config: EngineConfig,
        notifications: Vec<crate::project::Notification>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut canvas = CanvasState::new(10, 10).unwrap();
            // Red 2×2 block at (1,1)
            for y in 1..3 {
                for x in 1..3 {
                    canvas.layers[0].pixels.put_pixel(x, y, RED);
                }
            }
            Self {
                canvas,
                log: CommandLog::new(10),
                colours: ColourState::default(),
                swatch: Swatch::default(),
                config: EngineConfig::default(),
                notifications: Vec::new(),
            }
        }

        fn ctx(&mut self) -> EditContext<'_> {
            EditContext {
                canvas: &mut self.canvas,
                log: &mut self.log,
                colours: &mut self.colours,
                swatch: &self.swatch,
                config: &self.config,
                notifications: &mut self.notifications,
            }
        }

        fn px(&self, x: i32, y: i32) -> Rgba<u8> {
            self.canvas.layers[0].pixels.pixel(x, y)
        }
    }

    #[test]
    fn test_drag_select_clamps_to_canvas() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.press(&mut f.ctx(), PixelPos::new(-5, 4));
        sel.drag(&mut f.ctx(), PixelPos::new(30, 6));
        sel.release(&mut f.ctx(), PixelPos::new(30, 20));
        assert_eq!(sel.area(), PixelRect::new(0, 4, 10, 6));
    }

    #[test]
    fn test_zero_size_release_keeps_last_selection() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.press(&mut f.ctx(), PixelPos::new(7, 7));
        sel.release(&mut f.ctx(), PixelPos::new(7, 7));
        assert_eq!(sel.area(), PixelRect::new(1, 1, 2, 2));
    }

    #[test]
    fn test_move_commits_one_step_and_undoes() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.press(&mut f.ctx(), PixelPos::new(1, 1));
        sel.drag(&mut f.ctx(), PixelPos::new(3, 1));
        // Live preview already shows the move.
        assert_eq!(f.px(4, 1), RED);
        sel.drag(&mut f.ctx(), PixelPos::new(5, 5));
        sel.release(&mut f.ctx(), PixelPos::new(5, 5));

        assert_eq!(sel.area(), PixelRect::new(5, 5, 2, 2));
        assert!(!sel.has_modified_selection());
        assert_eq!(f.log.undo_count(), 1);
        assert_eq!(f.px(1, 1), TRANSPARENT);
        assert_eq!(f.px(4, 1), TRANSPARENT);
        assert_eq!(f.px(6, 6), RED);

        let outcome = f.log.undo(&mut f.canvas).unwrap();
        assert_eq!(outcome.selection, Some(PixelRect::new(1, 1, 2, 2)));
        assert_eq!(f.px(1, 1), RED);
        assert_eq!(f.px(6, 6), TRANSPARENT);
    }

    #[test]
    fn test_click_inside_without_moving_records_nothing() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.press(&mut f.ctx(), PixelPos::new(2, 2));
        sel.release(&mut f.ctx(), PixelPos::new(2, 2));
        assert_eq!(f.log.undo_count(), 0);
        assert_eq!(f.px(1, 1), RED);
    }

    #[test]
    fn test_cancel_restores_pre_modification_state() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.nudge(&mut f.ctx(), 3, 0);
        sel.nudge(&mut f.ctx(), 0, 3);
        assert!(sel.has_modified_selection());
        assert_eq!(f.px(4, 4), RED);

        assert!(sel.cancel(&mut f.ctx()));
        assert_eq!(sel.area(), PixelRect::new(1, 1, 2, 2));
        assert_eq!(f.px(1, 1), RED);
        assert_eq!(f.px(4, 4), TRANSPARENT);
        assert_eq!(f.log.undo_count(), 0);
    }

    #[test]
    fn test_rotate_grows_bounds_and_undo_restores() {
        let mut f = Fixture::new();
        f.canvas.layers[0].pixels.fill(TRANSPARENT);
        for x in 2..6 {
            f.canvas.layers[0].pixels.put_pixel(x, 4, RED);
        }
        let pristine = f.canvas.layers[0].pixels.clone();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(2, 4, 4, 1));
        sel.rotate(&mut f.ctx(), RotationAngle::Clockwise90);

        assert_eq!(sel.area(), PixelRect::new(3, 2, 1, 4));
        assert_eq!(f.px(3, 2), RED);
        assert_eq!(f.px(3, 5), RED);
        assert_eq!(f.px(2, 4), TRANSPARENT);
        assert_eq!(f.px(5, 4), TRANSPARENT);

        f.log.undo(&mut f.canvas);
        assert_eq!(f.canvas.layers[0].pixels, pristine);
    }

    #[test]
    fn test_rotate_that_would_not_fit_is_refused() {
        let mut f = Fixture::new();
        f.canvas = CanvasState::new(10, 4).unwrap();
        for x in 1..7 {
            f.canvas.layers[0].pixels.put_pixel(x, 1, RED);
        }
        let pristine = f.canvas.layers[0].pixels.clone();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 6, 2));
        sel.rotate(&mut f.ctx(), RotationAngle::Clockwise90);

        assert_eq!(sel.area(), PixelRect::new(1, 1, 6, 2));
        assert!(!sel.has_modified_selection());
        assert_eq!(f.canvas.layers[0].pixels, pristine);
        assert_eq!(f.log.undo_count(), 0);

        sel.rotate(&mut f.ctx(), RotationAngle::Half);
        assert_eq!(f.px(1, 2), RED);
        assert_eq!(f.px(1, 1), TRANSPARENT);
    }

    #[test]
    fn test_flip_mirrors_contents_in_one_step() {
        let mut f = Fixture::new();
        let green = Rgba([0, 255, 0, 255]);
        f.canvas.layers[0].pixels.put_pixel(1, 1, green);
        let pristine = f.canvas.layers[0].pixels.clone();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.flip(&mut f.ctx(), FlipOrientation::Horizontal);

        assert_eq!(f.px(2, 1), green);
        assert_eq!(f.px(1, 1), RED);
        assert_eq!(sel.area(), PixelRect::new(1, 1, 2, 2));
        assert!(!sel.has_modified_selection());
        assert_eq!(f.log.undo_count(), 1);
        assert_eq!(f.log.undo_description().as_deref(), Some("Flip Selection"));

        f.log.undo(&mut f.canvas);
        assert_eq!(f.canvas.layers[0].pixels, pristine);
    }

    #[test]
    fn test_hsl_session_commits_one_step() {
        let mut f = Fixture::new();
        let pristine = f.canvas.layers[0].pixels.clone();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.begin_hsl(&mut f.ctx());
        sel.modify_hsl(&mut f.ctx(), HslAdjustment { hue_shift: 60.0, ..Default::default() });
        sel.modify_hsl(&mut f.ctx(), HslAdjustment { hue_shift: 120.0, ..Default::default() });
        sel.end_hsl(&mut f.ctx(), true);

        assert_eq!(f.px(2, 2), Rgba([0, 255, 0, 255]));
        assert!(!sel.has_modified_selection());
        assert_eq!(f.log.undo_count(), 1);
        assert_eq!(f.log.undo_description().as_deref(), Some("Adjust Hue/Saturation"));
        let adjusted = f.canvas.layers[0].pixels.clone();

        f.log.undo(&mut f.canvas);
        assert_eq!(f.canvas.layers[0].pixels, pristine);
        f.log.redo(&mut f.canvas);
        assert_eq!(f.canvas.layers[0].pixels, adjusted);
    }

    #[test]
    fn test_hsl_session_rollback() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 2, 2));
        sel.begin_hsl(&mut f.ctx());
        sel.modify_hsl(&mut f.ctx(), HslAdjustment { hue_shift: 120.0, ..Default::default() });
        assert_eq!(f.px(1, 1), Rgba([0, 255, 0, 255]));
        sel.end_hsl(&mut f.ctx(), false);
        assert_eq!(f.px(1, 1), RED);
        assert_eq!(f.log.undo_count(), 0);
    }

    #[test]
    fn test_hsl_without_session_is_ignored() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.modify_hsl(&mut f.ctx(), HslAdjustment { hue_shift: 90.0, ..Default::default() });
        assert_eq!(f.px(1, 1), RED);
        assert!(f.notifications.is_empty());
    }

    #[test]
    fn test_paste_floats_then_commits() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        let blue = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));
        sel.paste(&mut f.ctx(), blue, PixelPos::new(8, 8));
        assert_eq!(sel.area(), PixelRect::new(7, 7, 3, 3));
        assert_eq!(sel.modification_kind(), ModificationKind::Paste);
        assert_eq!(f.px(9, 9), Rgba([0, 0, 255, 255]));
        assert_eq!(f.log.undo_count(), 0);

        sel.confirm(&mut f.ctx());
        assert_eq!(f.log.undo_count(), 1);
        assert_eq!(f.px(9, 9), Rgba([0, 0, 255, 255]));
        f.log.undo(&mut f.canvas);
        assert_eq!(f.px(9, 9), TRANSPARENT);
    }

    #[test]
    fn test_delete_erases_and_clears() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::default();
        sel.set_area(&mut f.ctx(), PixelRect::new(1, 1, 1, 2));
        sel.delete(&mut f.ctx());
        assert!(!sel.has_selection());
        assert_eq!(f.px(1, 1), TRANSPARENT);
        assert_eq!(f.px(2, 1), RED);
        let outcome = f.log.undo(&mut f.canvas).unwrap();
        assert_eq!(outcome.selection, Some(PixelRect::new(1, 1, 1, 2)));
        assert_eq!(f.px(1, 1), RED);
    }

    #[test]
    fn test_should_pan_only_while_dragging() {
        let mut f = Fixture::new();
        let mut sel = SelectionModel::new(2);
        let viewport = PixelRect::new(0, 0, 10, 10);
        assert_eq!(sel.should_pan(PixelPos::new(9, 5), viewport), None);
        sel.press(&mut f.ctx(), PixelPos::new(5, 5));
        assert_eq!(sel.should_pan(PixelPos::new(9, 5), viewport), Some((1, 0)));
        assert_eq!(sel.should_pan(PixelPos::new(0, 0), viewport), Some((-1, -1)));
        assert_eq!(sel.should_pan(PixelPos::new(5, 5), viewport), None);
    }
}
