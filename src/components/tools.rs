use std::collections::HashSet;

use image::Rgba;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::components::history::{Command, PatchEdit, PixelPatch};
use crate::components::notes::note_at;
use crate::components::selection::SelectionModel;
use crate::config::EngineConfig;
use crate::edit::EditContext;
use crate::geometry::PixelPos;
use crate::ops::brush::{draw_stroke_segment, stroke_bounds};
use crate::ops::fill::{
    FillExtent, FillPlan, apply_fill, flood_fill_contiguous, flood_fill_greedy, flood_fill_textured,
};
use crate::ops::primitives::CompositionMode;
use crate::project::Notification;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pen,
    EyeDropper,
    Eraser,
    Fill,
    TexturedFill,
    Selection,
    Note,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pen => "Pen",
            Tool::EyeDropper => "Eye Dropper",
            Tool::Eraser => "Eraser",
            Tool::Fill => "Fill",
            Tool::TexturedFill => "Textured Fill",
            Tool::Selection => "Selection",
            Tool::Note => "Note",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolShape {
    #[default]
    Square,
    Circle,
}

/// What the right mouse button does while the Pen is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenRightClickBehaviour {
    #[default]
    AppliesEraser,
    AppliesEyeDropper,
    AppliesBackgroundColour,
}

// ============================================================================
// INPUT EVENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Alt,
    Escape,
    Enter,
    Delete,
    Backspace,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolEvent {
    PointerPress { pos: PixelPos, button: PointerButton, modifiers: Modifiers },
    PointerMove { pos: PixelPos, modifiers: Modifiers },
    PointerRelease { pos: PixelPos, button: PointerButton, modifiers: Modifiers },
    KeyPress { key: Key, modifiers: Modifiers },
    KeyRelease { key: Key, modifiers: Modifiers },
}

/// The tool an event actually applies, after the Alt and right-click overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectiveTool {
    pub tool: Tool,
    /// Paint/fill with the background colour, or pick into it.
    pub secondary: bool,
}

/// Tracks the pointer gesture currently held down.
#[derive(Clone, Debug)]
struct StrokeTracker {
    id: u64,
    effective: EffectiveTool,
    layer_index: usize,
    last: PixelPos,
    /// Pixels this stroke has already blended.
    painted: HashSet<PixelPos>,
}

impl StrokeTracker {
    fn new(id: u64, effective: EffectiveTool, layer_index: usize, pos: PixelPos) -> Self {
        Self { id, effective, layer_index, last: pos, painted: HashSet::new() }
    }
}

// ============================================================================
// TOOL STATE
// ============================================================================

#[derive(Clone, Debug)]
pub struct ToolState {
    tool: Tool,
    shape: ToolShape,
    size: u32,
    right_click: PenRightClickBehaviour,
    max_tool_size: u32,
    alt_held: bool,
    stroke: Option<StrokeTracker>,
    next_stroke_id: u64,
    texture_seed: u64,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ToolState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tool: Tool::default(),
            shape: ToolShape::default(),
            size: 1,
            right_click: config.pen_right_click_behaviour,
            max_tool_size: config.max_tool_size.max(1),
            alt_held: false,
            stroke: None,
            next_stroke_id: 1,
            texture_seed: 0,
        }
    }

    /// Pick up changed settings.
    pub fn apply_config(&mut self, config: &EngineConfig) {
        self.right_click = config.pen_right_click_behaviour;
        self.max_tool_size = config.max_tool_size.max(1);
        self.size = self.size.min(self.max_tool_size);
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn shape(&self) -> ToolShape {
        self.shape
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pen_right_click_behaviour(&self) -> PenRightClickBehaviour {
        self.right_click
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Returns whether the stored tool changed.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        self.stroke = None;
        if self.tool == tool {
            return false;
        }
        debug!(?tool, "tool changed");
        self.tool = tool;
        true
    }

    pub fn set_shape(&mut self, shape: ToolShape) {
        self.shape = shape;
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(1, self.max_tool_size);
    }

    pub fn set_pen_right_click_behaviour(&mut self, behaviour: PenRightClickBehaviour) {
        self.right_click = behaviour;
    }

    pub fn set_texture_seed(&mut self, seed: u64) {
        self.texture_seed = seed;
    }

    fn take_texture_seed(&mut self) -> u64 {
        let seed = self.texture_seed;
        self.texture_seed = self.texture_seed.wrapping_add(1);
        seed
    }

    /// The tool shown to the user right now (EyeDropper while Alt is held).
    pub fn displayed_tool(&self) -> Tool {
        if self.alt_held { Tool::EyeDropper } else { self.tool }
    }

    /// Resolve the tool a press with `button` applies.
    pub fn effective_tool(&self, button: PointerButton) -> EffectiveTool {
        if self.alt_held {
            return EffectiveTool { tool: Tool::EyeDropper, secondary: button == PointerButton::Right };
        }
        match (self.tool, button) {
            (Tool::Pen, PointerButton::Right) => match self.right_click {
                PenRightClickBehaviour::AppliesEraser => EffectiveTool { tool: Tool::Eraser, secondary: false },
                PenRightClickBehaviour::AppliesEyeDropper => {
                    EffectiveTool { tool: Tool::EyeDropper, secondary: true }
                }
                PenRightClickBehaviour::AppliesBackgroundColour => {
                    EffectiveTool { tool: Tool::Pen, secondary: true }
                }
            },
            (tool, button) => EffectiveTool { tool, secondary: button == PointerButton::Right },
        }
    }

    // ------------------------------------------------------------------
    //  Dispatch
    // ------------------------------------------------------------------

    pub fn handle(&mut self, event: ToolEvent, ctx: &mut EditContext<'_>, selection: &mut SelectionModel) {
        match event {
            ToolEvent::PointerPress { pos, button, modifiers } => self.press(pos, button, modifiers, ctx, selection),
            ToolEvent::PointerMove { pos, .. } => self.pointer_move(pos, ctx, selection),
            ToolEvent::PointerRelease { pos, .. } => self.release(pos, ctx, selection),
            ToolEvent::KeyPress { key, .. } => self.key_press(key, ctx, selection),
            ToolEvent::KeyRelease { key, .. } => self.key_release(key, ctx),
        }
    }

    fn press(
        &mut self,
        pos: PixelPos,
        button: PointerButton,
        modifiers: Modifiers,
        ctx: &mut EditContext<'_>,
        selection: &mut SelectionModel,
    ) {
        if self.stroke.is_some() {
            warn!("pointer press while a stroke is held; ignored");
            return;
        }
        let effective = self.effective_tool(button);
        match effective.tool {
            Tool::Pen | Tool::Eraser => {
                selection.confirm_pending(ctx);
                let mut stroke =
                    StrokeTracker::new(self.next_stroke_id, effective, ctx.canvas.active_layer_index, pos);
                self.next_stroke_id += 1;
                self.paint_segment(&mut stroke, pos, pos, ctx);
                self.stroke = Some(stroke);
            }
            Tool::Fill | Tool::TexturedFill => {
                selection.confirm_pending(ctx);
                self.fill(effective, pos, modifiers.shift, ctx);
            }
            Tool::EyeDropper => {
                self.pick_colour(effective, pos, ctx);
                self.stroke = Some(StrokeTracker::new(0, effective, ctx.canvas.active_layer_index, pos));
            }
            Tool::Selection => {
                selection.press(ctx, pos);
                self.stroke = Some(StrokeTracker::new(0, effective, ctx.canvas.active_layer_index, pos));
            }
            Tool::Note => {
                let existing = note_at(&ctx.canvas.notes, pos);
                ctx.emit(Notification::NoteRequested { position: pos, existing });
            }
        }
    }

    fn pointer_move(&mut self, pos: PixelPos, ctx: &mut EditContext<'_>, selection: &mut SelectionModel) {
        let Some(mut stroke) = self.stroke.take() else { return };
        if stroke.last == pos {
            self.stroke = Some(stroke);
            return;
        }
        match stroke.effective.tool {
            Tool::Pen | Tool::Eraser => {
                let from = stroke.last;
                self.paint_segment(&mut stroke, from, pos, ctx);
            }
            Tool::EyeDropper => self.pick_colour(stroke.effective, pos, ctx),
            Tool::Selection => selection.drag(ctx, pos),
            _ => {}
        }
        stroke.last = pos;
        self.stroke = Some(stroke);
    }

    fn release(&mut self, pos: PixelPos, ctx: &mut EditContext<'_>, selection: &mut SelectionModel) {
        let Some(mut stroke) = self.stroke.take() else { return };
        match stroke.effective.tool {
            Tool::Pen | Tool::Eraser if stroke.last != pos => {
                let from = stroke.last;
                self.paint_segment(&mut stroke, from, pos, ctx);
            }
            Tool::Selection => selection.release(ctx, pos),
            _ => {}
        }
    }

    fn key_press(&mut self, key: Key, ctx: &mut EditContext<'_>, selection: &mut SelectionModel) {
        match key {
            Key::Alt => {
                if !self.alt_held {
                    self.alt_held = true;
                    ctx.emit(Notification::ToolChanged(Tool::EyeDropper));
                }
            }
            Key::Escape => {
                if selection.has_modified_selection() {
                    selection.cancel(ctx);
                } else if selection.has_selection() {
                    selection.clear(ctx);
                }
            }
            Key::Enter => {
                if selection.has_modified_selection() {
                    selection.confirm(ctx);
                }
            }
            Key::Delete | Key::Backspace => selection.delete(ctx),
            Key::Left | Key::Right | Key::Up | Key::Down => {
                if !selection.has_selection() || self.stroke.is_some() {
                    return;
                }
                let (dx, dy) = match key {
                    Key::Left => (-1, 0),
                    Key::Right => (1, 0),
                    Key::Up => (0, -1),
                    _ => (0, 1),
                };
                selection.nudge(ctx, dx, dy);
            }
        }
    }

    fn key_release(&mut self, key: Key, ctx: &mut EditContext<'_>) {
        if key == Key::Alt && self.alt_held {
            self.alt_held = false;
            ctx.emit(Notification::ToolChanged(self.tool));
        }
    }

    // ------------------------------------------------------------------
    //  Per-tool actions
    // ------------------------------------------------------------------

    /// Stamp one segment of a stroke and log it under the stroke's id.
    /// Pixels an earlier segment of the same stroke covered are left alone.
    fn paint_segment(&self, stroke: &mut StrokeTracker, from: PixelPos, to: PixelPos, ctx: &mut EditContext<'_>) {
        let layer_index = stroke.layer_index;
        let rect = stroke_bounds(from, to, self.size).clamped(ctx.canvas.width, ctx.canvas.height);
        if rect.is_empty() {
            return;
        }
        let before = PixelPatch::capture(ctx.canvas, layer_index, rect);

        let (description, colour, mode) = match stroke.effective {
            EffectiveTool { tool: Tool::Eraser, .. } => ("Eraser", ctx.colours.background, CompositionMode::Clear),
            EffectiveTool { secondary: true, .. } => ("Pen", ctx.colours.background, CompositionMode::SourceOver),
            _ => ("Pen", ctx.colours.foreground, CompositionMode::SourceOver),
        };
        let Some(layer) = ctx.canvas.layers.get_mut(layer_index) else {
            warn!(layer_index, "paint on missing layer ignored");
            return;
        };
        let changed = draw_stroke_segment(
            &mut layer.pixels,
            from,
            to,
            self.shape,
            self.size,
            colour,
            mode,
            &mut stroke.painted,
        );
        if changed.is_empty() {
            return;
        }
        ctx.canvas.mark_dirty(Some(changed));

        let edit = PatchEdit::capture_after(before.cropped(changed), ctx.canvas);
        ctx.commit(Command::Paint { description, stroke_id: stroke.id, edit });
    }

    fn fill(&mut self, effective: EffectiveTool, seed: PixelPos, greedy: bool, ctx: &mut EditContext<'_>) {
        let layer_index = ctx.canvas.active_layer_index;
        let Some(layer) = ctx.canvas.layers.get(layer_index) else { return };
        let extent = if greedy {
            FillExtent::Greedy { reach: ctx.config.greedy_fill_reach }
        } else {
            FillExtent::Contiguous
        };
        let tolerance = ctx.config.fill_tolerance;

        let (description, plan): (&'static str, FillPlan) = if effective.tool == Tool::TexturedFill {
            let rng_seed = self.take_texture_seed();
            match flood_fill_textured(&layer.pixels, seed, ctx.swatch, tolerance, extent, rng_seed) {
                Ok(plan) => ("Textured Fill", plan),
                Err(err) => {
                    ctx.report(err);
                    return;
                }
            }
        } else {
            let colour = if effective.secondary { ctx.colours.background } else { ctx.colours.foreground };
            let plan = match extent {
                FillExtent::Contiguous => flood_fill_contiguous(&layer.pixels, seed, colour, tolerance),
                FillExtent::Greedy { reach } => flood_fill_greedy(&layer.pixels, seed, colour, tolerance, reach),
            };
            ("Fill", plan)
        };
        if plan.is_empty() {
            return;
        }

        let before = PixelPatch::capture(ctx.canvas, layer_index, plan.bounds);
        let Some(layer) = ctx.canvas.layers.get_mut(layer_index) else { return };
        let changed = apply_fill(&mut layer.pixels, &plan);
        if changed.is_empty() {
            return;
        }
        ctx.canvas.mark_dirty(Some(changed));
        let edit = PatchEdit::capture_after(before.cropped(changed), ctx.canvas);
        ctx.commit(Command::Fill { description, edit });
    }

    fn pick_colour(&self, effective: EffectiveTool, pos: PixelPos, ctx: &mut EditContext<'_>) {
        let Some(layer) = ctx.canvas.active_layer() else { return };
        if !layer.pixels.in_bounds(pos.x, pos.y) {
            return;
        }
        let colour: Rgba<u8> = layer.pixels.pixel_at(pos);
        if effective.secondary {
            if ctx.colours.background != colour {
                ctx.colours.background = colour;
                ctx.emit(Notification::BackgroundColourChanged(colour));
            }
        } else if ctx.colours.foreground != colour {
            ctx.colours.foreground = colour;
            ctx.emit(Notification::ForegroundColourChanged(colour));
        }
    }
}
