use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::canvas::{CanvasState, Layer};
use crate::components::colors::{ColourState, Swatch};
use crate::components::history::{CanvasSnapshot, Command, CommandLog, LayerOperation, StepOutcome};
use crate::components::notes::{Note, NoteEdit};
use crate::components::selection::SelectionModel;
use crate::components::tools::{PenRightClickBehaviour, Tool, ToolEvent, ToolShape, ToolState};
use crate::config::EngineConfig;
use crate::edit::{EditContext, route_error};
use crate::error::CoreError;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::palette::{ColourScanOutcome, ColourScanner};
use crate::ops::transform::{FlipOrientation, HslAdjustment, RotationAngle, resize_canvas, resize_image};

/// Events queued for the collaborator, drained with [`Project::take_notifications`].
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    ContentsModified,
    SelectionAreaChanged(PixelRect),
    HasSelectionChanged(bool),
    HasModifiedSelectionChanged(bool),
    ToolChanged(Tool),
    ErrorOccurred(String),
    UnsavedChangesChanged(bool),
    ForegroundColourChanged(Rgba<u8>),
    BackgroundColourChanged(Rgba<u8>),
    /// The Note tool was pressed; `existing` is the note under the pointer.
    NoteRequested { position: PixelPos, existing: Option<usize> },
    UniqueColoursScanned(ColourScanOutcome),
}

/// Last values announced to the collaborator, diffed after every call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Published {
    area: PixelRect,
    has_selection: bool,
    has_modified_selection: bool,
    unsaved: bool,
}

/// Single open document.
pub struct Project {
    pub id: Uuid,
    /// Display name ("Untitled-X" until the collaborator renames it).
    pub name: String,
    /// `None` until an image is loaded.
    canvas: Option<CanvasState>,
    log: CommandLog,
    selection: SelectionModel,
    tools: ToolState,
    colours: ColourState,
    swatch: Swatch,
    config: EngineConfig,
    scanner: ColourScanner,
    clipboard: Option<RgbaImage>,
    notifications: Vec<Notification>,
    published: Published,
}

impl Project {
    /// A project with no image loaded.
    pub fn empty(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            canvas: None,
            log: CommandLog::new(config.max_undo_steps),
            selection: SelectionModel::new(config.pan_margin),
            tools: ToolState::new(&config),
            colours: ColourState::default(),
            swatch: Swatch::default(),
            scanner: ColourScanner::new(config.max_palette_colours, config.max_palette_scan_pixels),
            config,
            clipboard: None,
            notifications: Vec::new(),
            published: Published::default(),
        }
    }

    pub fn new_untitled(untitled_counter: usize, width: u32, height: u32) -> Result<Self, CoreError> {
        let mut project = Self::empty(format!("Untitled-{}", untitled_counter), EngineConfig::default());
        project.canvas = Some(CanvasState::new(width, height)?);
        Ok(project)
    }

    pub fn from_image(name: impl Into<String>, image: RgbaImage) -> Result<Self, CoreError> {
        let mut project = Self::empty(name, EngineConfig::default());
        project.canvas = Some(CanvasState::from_image(image)?);
        Ok(project)
    }

    /// Replace the configuration (builder form).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.set_config(config);
        self
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.tools.apply_config(&config);
        self.log.set_max_entries(config.max_undo_steps);
        if !self.selection.has_modified_selection() && !self.selection.is_dragging() {
            let area = self.selection.area();
            self.selection = SelectionModel::new(config.pan_margin);
            if let Some(canvas) = &self.canvas {
                self.selection.restore_area(area, canvas.width, canvas.height);
            }
        }
        self.scanner = ColourScanner::new(config.max_palette_colours, config.max_palette_scan_pixels);
        self.config = config;
        self.publish();
    }

    /// Swap in a new image. History and selection start over; the new image
    /// counts as saved.
    pub fn load_image(&mut self, image: RgbaImage) {
        match CanvasState::from_image(image) {
            Ok(canvas) => {
                info!(width = canvas.width, height = canvas.height, project = %self.name, "image loaded");
                self.canvas = Some(canvas);
                self.log = CommandLog::new(self.config.max_undo_steps);
                self.selection.reset();
                self.tools.set_tool(self.tools.tool());
                self.notifications.push(Notification::ContentsModified);
            }
            Err(err) => route_error(&mut self.notifications, err),
        }
        self.publish();
    }

    // ------------------------------------------------------------------
    //  Plumbing
    // ------------------------------------------------------------------

    /// Run `f` against the loaded canvas, then announce whatever state it changed.
    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut EditContext<'_>, &mut SelectionModel, &mut ToolState) -> R,
    ) -> Option<R> {
        let Some(canvas) = self.canvas.as_mut() else {
            route_error(&mut self.notifications, CoreError::NoImageLoaded);
            return None;
        };
        let mut ctx = EditContext {
            canvas,
            log: &mut self.log,
            colours: &mut self.colours,
            swatch: &self.swatch,
            config: &self.config,
            notifications: &mut self.notifications,
        };
        let result = f(&mut ctx, &mut self.selection, &mut self.tools);
        self.publish();
        Some(result)
    }

    fn publish(&mut self) {
        let now = Published {
            area: self.selection.area(),
            has_selection: self.selection.has_selection(),
            has_modified_selection: self.selection.has_modified_selection(),
            unsaved: self.log.has_unsaved_changes(),
        };
        let before = std::mem::replace(&mut self.published, now);
        if now.area != before.area {
            self.notifications.push(Notification::SelectionAreaChanged(now.area));
        }
        if now.has_selection != before.has_selection {
            self.notifications.push(Notification::HasSelectionChanged(now.has_selection));
        }
        if now.has_modified_selection != before.has_modified_selection {
            self.notifications.push(Notification::HasModifiedSelectionChanged(now.has_modified_selection));
        }
        if now.unsaved != before.unsaved {
            self.notifications.push(Notification::UnsavedChangesChanged(now.unsaved));
        }
    }

    fn finish_step(ctx: &mut EditContext<'_>, selection: &mut SelectionModel, outcome: StepOutcome) {
        if let Some(rect) = outcome.selection {
            selection.restore_area(rect, ctx.canvas.width, ctx.canvas.height);
        }
        if outcome.modifies_contents {
            ctx.emit(Notification::ContentsModified);
        }
    }

    // ------------------------------------------------------------------
    //  Tools
    // ------------------------------------------------------------------

    pub fn apply_tool(&mut self, event: ToolEvent) {
        self.with_context(|ctx, selection, tools| tools.handle(event, ctx, selection));
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.canvas.is_some() {
            self.with_context(|ctx, selection, _| selection.confirm_pending(ctx));
        }
        if self.tools.set_tool(tool) {
            self.notifications.push(Notification::ToolChanged(tool));
        }
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tools
    }

    pub fn set_tool_shape(&mut self, shape: ToolShape) {
        self.tools.set_shape(shape);
    }

    pub fn set_tool_size(&mut self, size: u32) {
        self.tools.set_size(size);
    }

    pub fn set_pen_right_click_behaviour(&mut self, behaviour: PenRightClickBehaviour) {
        self.tools.set_pen_right_click_behaviour(behaviour);
        self.config.pen_right_click_behaviour = behaviour;
    }

    /// Restart the textured-fill seed sequence.
    pub fn set_texture_seed(&mut self, seed: u64) {
        self.tools.set_texture_seed(seed);
    }

    // ------------------------------------------------------------------
    //  Colours
    // ------------------------------------------------------------------

    pub fn colours(&self) -> &ColourState {
        &self.colours
    }

    pub fn set_foreground_colour(&mut self, colour: Rgba<u8>) {
        if self.colours.foreground != colour {
            self.colours.foreground = colour;
            self.notifications.push(Notification::ForegroundColourChanged(colour));
        }
    }

    pub fn set_background_colour(&mut self, colour: Rgba<u8>) {
        if self.colours.background != colour {
            self.colours.background = colour;
            self.notifications.push(Notification::BackgroundColourChanged(colour));
        }
    }

    pub fn swap_colours(&mut self) {
        self.colours.swap_colours();
        self.notifications.push(Notification::ForegroundColourChanged(self.colours.foreground));
        self.notifications.push(Notification::BackgroundColourChanged(self.colours.background));
    }

    pub fn swatch(&self) -> &Swatch {
        &self.swatch
    }

    pub fn set_swatch(&mut self, swatch: Swatch) {
        self.swatch = swatch;
    }

    // ------------------------------------------------------------------
    //  Selection
    // ------------------------------------------------------------------

    pub fn set_selection_area(&mut self, rect: PixelRect) {
        self.with_context(|ctx, selection, _| selection.set_area(ctx, rect));
    }

    pub fn select_all(&mut self) {
        self.with_context(|ctx, selection, _| selection.select_all(ctx));
    }

    pub fn clear_selection(&mut self) {
        self.with_context(|ctx, selection, _| selection.clear(ctx));
    }

    /// The selected pixels of the active layer, also kept as the internal
    /// clipboard.
    pub fn copy_selection(&mut self) -> Option<RgbaImage> {
        let copied = self.with_context(|ctx, selection, _| selection.copy(ctx)).flatten();
        if let Some(image) = &copied {
            debug!(width = image.width(), height = image.height(), "selection copied");
            self.clipboard = Some(image.clone());
        }
        copied
    }

    pub fn cut_selection(&mut self) -> Option<RgbaImage> {
        let copied = self.copy_selection()?;
        self.begin_macro("Cut");
        self.delete_selection_or_contents();
        self.end_macro();
        Some(copied)
    }

    pub fn clipboard(&self) -> Option<&RgbaImage> {
        self.clipboard.as_ref()
    }

    /// Float `image` (or the internal clipboard when `None`) at `pos`.
    pub fn paste(&mut self, image: Option<RgbaImage>, pos: PixelPos) {
        let Some(image) = image.or_else(|| self.clipboard.clone()) else {
            warn!("paste with an empty clipboard ignored");
            return;
        };
        self.with_context(|ctx, selection, _| selection.paste(ctx, image, pos));
    }

    pub fn flip_selection(&mut self, orientation: FlipOrientation) {
        self.with_context(|ctx, selection, _| selection.flip(ctx, orientation));
    }

    pub fn rotate_selection(&mut self, angle: RotationAngle) {
        self.with_context(|ctx, selection, _| selection.rotate(ctx, angle));
    }

    pub fn begin_modifying_selection_hsl(&mut self) {
        self.with_context(|ctx, selection, _| selection.begin_hsl(ctx));
    }

    pub fn modify_selection_hsl(&mut self, adjustment: HslAdjustment) {
        self.with_context(|ctx, selection, _| selection.modify_hsl(ctx, adjustment));
    }

    /// Finish the HSL session, keeping the result when `commit` is set.
    pub fn end_modifying_selection_hsl(&mut self, commit: bool) {
        self.with_context(|ctx, selection, _| selection.end_hsl(ctx, commit));
    }

    pub fn delete_selection_or_contents(&mut self) {
        self.with_context(|ctx, selection, _| selection.delete(ctx));
    }

    pub fn confirm_selection_modification(&mut self) {
        self.with_context(|ctx, selection, _| {
            selection.confirm(ctx);
        });
    }

    pub fn cancel_selection_modification(&mut self) {
        self.with_context(|ctx, selection, _| {
            selection.cancel(ctx);
        });
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    pub fn has_modified_selection(&self) -> bool {
        self.selection.has_modified_selection()
    }

    pub fn selection_area(&self) -> PixelRect {
        self.selection.area()
    }

    /// Scroll direction for a selection drag near the edge of `viewport`.
    pub fn should_pan(&self, pos: PixelPos, viewport: PixelRect) -> Option<(i32, i32)> {
        self.selection.should_pan(pos, viewport)
    }

    // ------------------------------------------------------------------
    //  History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) {
        self.with_context(|ctx, selection, tools| {
            if tools.is_stroking() {
                warn!("undo during a held stroke ignored");
                return;
            }
            if selection.has_modified_selection() {
                selection.cancel(ctx);
                return;
            }
            if let Some(outcome) = ctx.log.undo(ctx.canvas) {
                debug!(step = %outcome.description, "undo");
                Self::finish_step(ctx, selection, outcome);
            }
        });
    }

    pub fn redo(&mut self) {
        self.with_context(|ctx, selection, tools| {
            if tools.is_stroking() {
                warn!("redo during a held stroke ignored");
                return;
            }
            if selection.has_modified_selection() {
                warn!("redo while a selection modification is pending ignored");
                return;
            }
            if let Some(outcome) = ctx.log.redo(ctx.canvas) {
                debug!(step = %outcome.description, "redo");
                Self::finish_step(ctx, selection, outcome);
            }
        });
    }

    /// Group everything pushed until [`Project::end_macro`] into one undo step.
    pub fn begin_macro(&mut self, name: &str) {
        match &self.canvas {
            Some(canvas) => self.log.begin_macro(name, canvas),
            None => route_error(&mut self.notifications, CoreError::NoImageLoaded),
        }
    }

    pub fn end_macro(&mut self) {
        let Some(canvas) = &self.canvas else {
            route_error(&mut self.notifications, CoreError::NoImageLoaded);
            return;
        };
        if self.log.end_macro(canvas) == Some(true) {
            self.notifications.push(Notification::ContentsModified);
        }
        self.publish();
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn undo_text(&self) -> Option<String> {
        self.log.undo_description()
    }

    pub fn redo_text(&self) -> Option<String> {
        self.log.redo_description()
    }

    pub fn undo_count(&self) -> usize {
        self.log.undo_count()
    }

    pub fn history_descriptions(&self) -> Vec<String> {
        self.log.descriptions()
    }

    pub fn history_memory_usage(&self) -> usize {
        self.log.memory_usage()
    }

    pub fn clear_history(&mut self) {
        self.log.clear();
        self.publish();
    }

    // ------------------------------------------------------------------
    //  Save state
    // ------------------------------------------------------------------

    pub fn mark_saved(&mut self) {
        self.log.mark_clean();
        self.publish();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.log.has_unsaved_changes()
    }

    /// Get the display title (name with unsaved indicator)
    pub fn display_title(&self) -> String {
        if self.has_unsaved_changes() {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    // ------------------------------------------------------------------
    //  Layers
    // ------------------------------------------------------------------

    /// Add a transparent layer above the active one and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.with_context(|ctx, selection, _| {
            selection.confirm_pending(ctx);
            let op = LayerOperation::Add {
                index: ctx.canvas.active_layer_index + 1,
                name,
                width: ctx.canvas.width,
                height: ctx.canvas.height,
            };
            ctx.commit(Command::Layer(op));
        });
    }

    /// Delete a layer. The last remaining layer is never removed.
    pub fn delete_layer(&mut self, index: usize) {
        self.with_context(|ctx, selection, _| {
            selection.confirm_pending(ctx);
            let layer: Layer = match ctx.canvas.layer(index) {
                Ok(layer) => layer.clone(),
                Err(err) => return ctx.report(err),
            };
            if ctx.canvas.layers.len() == 1 {
                warn!("cannot delete the only layer");
                return;
            }
            ctx.commit(Command::Layer(LayerOperation::Delete { index, layer }));
        });
    }

    pub fn move_layer(&mut self, from_index: usize, to_index: usize) {
        self.with_context(|ctx, selection, _| {
            selection.confirm_pending(ctx);
            let count = ctx.canvas.layers.len();
            if from_index >= count || to_index >= count {
                return ctx.report(CoreError::LayerOutOfRange { index: from_index.max(to_index), count });
            }
            if from_index == to_index {
                return;
            }
            ctx.commit(Command::Layer(LayerOperation::Move { from_index, to_index }));
        });
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) {
        self.with_context(|ctx, _, _| {
            let was_visible = match ctx.canvas.layer(index) {
                Ok(layer) => layer.visible,
                Err(err) => return ctx.report(err),
            };
            if was_visible != visible {
                ctx.commit(Command::Layer(LayerOperation::Visibility { index, was_visible }));
            }
        });
    }

    /// Change which layer tools paint on. Not recorded in the history.
    pub fn set_active_layer(&mut self, index: usize) {
        self.with_context(|ctx, selection, _| {
            if let Err(err) = ctx.canvas.layer(index) {
                return ctx.report(err);
            }
            selection.confirm_pending(ctx);
            ctx.canvas.active_layer_index = index;
        });
    }

    // ------------------------------------------------------------------
    //  Resize
    // ------------------------------------------------------------------

    /// Scale every layer to `width`×`height` (nearest neighbour).
    pub fn resize_image(&mut self, width: u32, height: u32) {
        self.resize_with("Resize Image", width, height, resize_image);
    }

    /// Crop or extend the canvas to `width`×`height`, anchored top-left.
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.resize_with("Resize Canvas", width, height, resize_canvas);
    }

    fn resize_with(
        &mut self,
        description: &'static str,
        width: u32,
        height: u32,
        resize: fn(&mut CanvasState, u32, u32) -> Result<(), CoreError>,
    ) {
        self.with_context(|ctx, selection, _| {
            selection.confirm_pending(ctx);
            let before = CanvasSnapshot::capture(ctx.canvas);
            if let Err(err) = resize(ctx.canvas, width, height) {
                return ctx.report(err);
            }
            let after = CanvasSnapshot::capture(ctx.canvas);
            info!(description, width, height, "canvas resized");
            ctx.commit(Command::Resize { description, before, after });
            selection.reset();
        });
    }

    // ------------------------------------------------------------------
    //  Notes
    // ------------------------------------------------------------------

    pub fn notes(&self) -> &[Note] {
        self.canvas.as_ref().map(|c| c.notes.as_slice()).unwrap_or(&[])
    }

    pub fn add_note(&mut self, position: PixelPos, text: impl Into<String>) {
        let note = Note::new(position, text);
        self.with_context(|ctx, _, _| {
            let index = ctx.canvas.notes.len();
            ctx.commit(Command::Note(NoteEdit::Add { index, note }));
        });
    }

    pub fn modify_note(&mut self, index: usize, text: impl Into<String>) {
        let text = text.into();
        self.with_context(|ctx, _, _| {
            let Some(before) = ctx.canvas.notes.get(index).cloned() else {
                warn!(index, "modify of a missing note ignored");
                return;
            };
            if before.text == text {
                return;
            }
            let after = Note { text, ..before.clone() };
            ctx.commit(Command::Note(NoteEdit::Modify { index, before, after }));
        });
    }

    pub fn remove_note(&mut self, index: usize) {
        self.with_context(|ctx, _, _| {
            let Some(note) = ctx.canvas.notes.get(index).cloned() else {
                warn!(index, "remove of a missing note ignored");
                return;
            };
            ctx.commit(Command::Note(NoteEdit::Remove { index, note }));
        });
    }

    // ------------------------------------------------------------------
    //  Background colour scan
    // ------------------------------------------------------------------

    /// Start scanning the composited image for its unique colours. The
    /// result arrives through [`Project::poll_background_tasks`].
    pub fn request_unique_colours(&mut self) {
        let Some(canvas) = &self.canvas else {
            route_error(&mut self.notifications, CoreError::NoImageLoaded);
            return;
        };
        if let Err(err) = self.scanner.request(canvas.composite()) {
            route_error(&mut self.notifications, err);
        }
    }

    pub fn is_scanning_colours(&self) -> bool {
        self.scanner.is_running()
    }

    /// Deliver finished background work as notifications.
    pub fn poll_background_tasks(&mut self) {
        if let Some(outcome) = self.scanner.poll() {
            self.notifications.push(Notification::UniqueColoursScanned(outcome));
        }
    }

    /// Block until the running colour scan finishes, then deliver it.
    pub fn wait_for_background_tasks(&mut self) {
        if let Some(outcome) = self.scanner.wait() {
            self.notifications.push(Notification::UniqueColoursScanned(outcome));
        }
    }

    // ------------------------------------------------------------------
    //  Queries
    // ------------------------------------------------------------------

    pub fn canvas(&self) -> Option<&CanvasState> {
        self.canvas.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Flattened view of all visible layers.
    pub fn current_composited_image(&self) -> Option<RgbaImage> {
        self.canvas.as_ref().map(CanvasState::composite)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Region modified since the last call, for incremental redraws.
    pub fn take_dirty_rect(&mut self) -> Option<PixelRect> {
        self.canvas.as_mut().and_then(CanvasState::take_dirty_rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::TRANSPARENT;
    use crate::components::tools::{Modifiers, PointerButton};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn project() -> Project {
        let mut p = Project::new_untitled(1, 10, 10).unwrap();
        p.set_foreground_colour(RED);
        p.take_notifications();
        p
    }

    fn click(p: &mut Project, x: i32, y: i32) {
        let pos = PixelPos::new(x, y);
        let modifiers = Modifiers::default();
        p.apply_tool(ToolEvent::PointerPress { pos, button: PointerButton::Left, modifiers });
        p.apply_tool(ToolEvent::PointerRelease { pos, button: PointerButton::Left, modifiers });
    }

    fn pixel(p: &Project, x: i32, y: i32) -> Rgba<u8> {
        p.canvas().unwrap().layers[0].pixels.pixel(x, y)
    }

    #[test]
    fn test_new_untitled_name() {
        let p = Project::new_untitled(3, 4, 4).unwrap();
        assert_eq!(p.name, "Untitled-3");
        assert_eq!(p.display_title(), "Untitled-3");
        assert!(!p.has_unsaved_changes());
    }

    #[test]
    fn test_calls_without_image_are_ignored() {
        let mut p = Project::empty("blank", EngineConfig::default());
        p.undo();
        p.select_all();
        click(&mut p, 0, 0);
        assert!(p.current_composited_image().is_none());
        assert!(p.take_notifications().is_empty());
    }

    #[test]
    fn test_paint_emits_contents_and_unsaved() {
        let mut p = project();
        click(&mut p, 2, 2);
        let n = p.take_notifications();
        assert!(n.contains(&Notification::ContentsModified));
        assert!(n.contains(&Notification::UnsavedChangesChanged(true)));
        assert_eq!(p.display_title(), "Untitled-1*");

        p.mark_saved();
        assert_eq!(p.take_notifications(), vec![Notification::UnsavedChangesChanged(false)]);
        p.undo();
        assert_eq!(pixel(&p, 2, 2), TRANSPARENT);
        assert!(p.has_unsaved_changes());
    }

    #[test]
    fn test_selection_notifications_only_on_change() {
        let mut p = project();
        let rect = PixelRect::new(1, 1, 3, 3);
        p.set_selection_area(rect);
        assert_eq!(
            p.take_notifications(),
            vec![Notification::SelectionAreaChanged(rect), Notification::HasSelectionChanged(true)]
        );
        p.set_selection_area(rect);
        assert!(p.take_notifications().is_empty());
    }

    #[test]
    fn test_cut_is_one_step() {
        let mut p = project();
        click(&mut p, 2, 2);
        p.set_selection_area(PixelRect::new(0, 0, 5, 5));
        let cut = p.cut_selection().unwrap();
        assert_eq!(*cut.get_pixel(2, 2), RED);
        assert_eq!(pixel(&p, 2, 2), TRANSPARENT);
        assert_eq!(p.undo_text().as_deref(), Some("Cut"));

        p.undo();
        assert_eq!(pixel(&p, 2, 2), RED);
        assert_eq!(p.selection_area(), PixelRect::new(0, 0, 5, 5));
    }

    #[test]
    fn test_undo_cancels_pending_paste() {
        let mut p = project();
        let mut image = RgbaImage::new(2, 2);
        image.fill(255);
        p.paste(Some(image), PixelPos::new(3, 3));
        assert!(p.has_modified_selection());
        assert_eq!(pixel(&p, 3, 3), Rgba([255, 255, 255, 255]));

        p.undo();
        assert!(!p.has_modified_selection());
        assert_eq!(pixel(&p, 3, 3), TRANSPARENT);
        assert!(!p.can_undo());
    }

    #[test]
    fn test_resize_is_undoable() {
        let mut p = project();
        click(&mut p, 1, 1);
        p.select_all();
        p.resize_canvas(4, 6);
        let canvas = p.canvas().unwrap();
        assert_eq!((canvas.width, canvas.height), (4, 6));
        assert!(!p.has_selection());

        p.undo();
        let canvas = p.canvas().unwrap();
        assert_eq!((canvas.width, canvas.height), (10, 10));
        assert_eq!(pixel(&p, 1, 1), RED);
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut p = project();
        p.resize_image(0, 5);
        assert!(!p.can_undo());
        assert!(!p.take_notifications().iter().any(|n| matches!(n, Notification::ErrorOccurred(_))));
    }

    #[test]
    fn test_layers_undo() {
        let mut p = project();
        p.add_layer("Ink");
        assert_eq!(p.canvas().unwrap().layers.len(), 2);
        assert_eq!(p.canvas().unwrap().active_layer_index, 1);
        p.set_layer_visible(1, false);
        p.delete_layer(0);
        assert_eq!(p.canvas().unwrap().layers.len(), 1);
        p.delete_layer(0);
        assert_eq!(p.canvas().unwrap().layers.len(), 1);

        p.undo();
        p.undo();
        p.undo();
        assert_eq!(p.canvas().unwrap().layers.len(), 1);
    }

    #[test]
    fn test_notes_are_unsaved_but_not_contents() {
        let mut p = project();
        p.add_note(PixelPos::new(2, 2), "fix this");
        let n = p.take_notifications();
        assert!(!n.contains(&Notification::ContentsModified));
        assert!(n.contains(&Notification::UnsavedChangesChanged(true)));

        p.modify_note(0, "fixed");
        assert_eq!(p.notes()[0].text, "fixed");
        p.remove_note(0);
        assert!(p.notes().is_empty());
        p.undo();
        p.undo();
        assert_eq!(p.notes()[0].text, "fix this");
    }

    #[test]
    fn test_tool_change_confirms_pending_move() {
        let mut p = project();
        click(&mut p, 2, 2);
        p.set_tool(Tool::Selection);
        p.set_selection_area(PixelRect::new(2, 2, 1, 1));
        p.apply_tool(ToolEvent::KeyPress { key: crate::components::tools::Key::Right, modifiers: Modifiers::default() });
        assert!(p.has_modified_selection());

        p.set_tool(Tool::Pen);
        assert!(!p.has_modified_selection());
        assert_eq!(pixel(&p, 3, 2), RED);
        assert_eq!(p.undo_text().as_deref(), Some("Move Selection"));
        assert!(p.take_notifications().contains(&Notification::ToolChanged(Tool::Pen)));
    }

    #[test]
    fn test_colour_scan_reports() {
        let mut p = project();
        click(&mut p, 0, 0);
        p.request_unique_colours();
        p.wait_for_background_tasks();
        let n = p.take_notifications();
        assert!(n.contains(&Notification::UniqueColoursScanned(ColourScanOutcome::Completed(vec![
            RED,
            TRANSPARENT
        ]))));
    }

    #[test]
    fn test_colour_scan_too_large_is_user_facing() {
        let config = EngineConfig { max_palette_scan_pixels: 10, ..EngineConfig::default() };
        let mut p = project().with_config(config);
        p.take_notifications();
        p.request_unique_colours();
        let n = p.take_notifications();
        assert!(matches!(n.as_slice(), [Notification::ErrorOccurred(_)]));
        assert!(!p.is_scanning_colours());
    }
}
