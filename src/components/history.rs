use std::collections::VecDeque;

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::canvas::{CanvasState, Layer, PixelBuffer, TRANSPARENT};
use crate::components::notes::{Note, NoteEdit};
use crate::components::selection::ModificationKind;
use crate::geometry::{PixelPos, PixelRect};
use crate::ops::primitives::replace_region;

// ============================================================================
// PIXEL PATCH - rectangular pixel snapshot for minimal-diff undo
// ============================================================================

/// A rectangular patch of one layer's pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelPatch {
    pub layer_index: usize,
    /// Always inside the canvas the patch was captured from.
    pub rect: PixelRect,
    pub pixels: RgbaImage,
}

impl PixelPatch {
    /// Capture `rect` (clamped to the canvas) from a layer.
    pub fn capture(canvas: &CanvasState, layer_index: usize, rect: PixelRect) -> Self {
        match canvas.layers.get(layer_index) {
            Some(layer) => Self::from_buffer(&layer.pixels, layer_index, rect),
            None => {
                warn!(layer_index, count = canvas.layers.len(), "PixelPatch::capture: layer out of range");
                Self { layer_index, rect: PixelRect::EMPTY, pixels: RgbaImage::new(0, 0) }
            }
        }
    }

    /// Capture from a detached buffer, e.g. a snapshot taken when a
    /// modification began.
    pub fn from_buffer(buffer: &PixelBuffer, layer_index: usize, rect: PixelRect) -> Self {
        let rect = rect.clamped(buffer.width(), buffer.height());
        Self { layer_index, rect, pixels: buffer.copy_region(rect) }
    }

    /// The stored colour at `pos`, if the patch covers it.
    pub fn pixel(&self, pos: PixelPos) -> Option<Rgba<u8>> {
        if !self.rect.contains(pos) {
            return None;
        }
        Some(*self.pixels.get_pixel((pos.x - self.rect.x) as u32, (pos.y - self.rect.y) as u32))
    }

    /// The part of the patch inside `rect`.
    pub fn cropped(&self, rect: PixelRect) -> Self {
        let r = self.rect.intersect(&rect);
        let pixels = if r.is_empty() {
            RgbaImage::new(0, 0)
        } else {
            image::imageops::crop_imm(
                &self.pixels,
                (r.x - self.rect.x) as u32,
                (r.y - self.rect.y) as u32,
                r.width,
                r.height,
            )
            .to_image()
        };
        Self { layer_index: self.layer_index, rect: r, pixels }
    }

    pub fn apply(&self, canvas: &mut CanvasState) {
        if self.rect.is_empty() {
            return;
        }
        let Some(layer) = canvas.layers.get_mut(self.layer_index) else {
            warn!(layer_index = self.layer_index, "PixelPatch::apply: layer out of range");
            return;
        };
        let touched = replace_region(&mut layer.pixels, self.rect, &self.pixels);
        canvas.mark_dirty(Some(touched));
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

// ============================================================================
// PATCH EDIT - before/after pair over one rectangle
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct PatchEdit {
    pub before: PixelPatch,
    pub after: PixelPatch,
}

impl PatchEdit {
    /// Pair a before-patch with the canvas' current pixels over the same rect.
    pub fn capture_after(before: PixelPatch, canvas: &CanvasState) -> Self {
        let after = PixelPatch::capture(canvas, before.layer_index, before.rect);
        Self { before, after }
    }

    pub fn layer_index(&self) -> usize {
        self.before.layer_index
    }

    pub fn rect(&self) -> PixelRect {
        self.before.rect
    }

    pub fn undo(&self, canvas: &mut CanvasState) {
        self.before.apply(canvas);
    }

    pub fn redo(&self, canvas: &mut CanvasState) {
        self.after.apply(canvas);
    }

    pub fn is_noop(&self) -> bool {
        self.before.pixels == self.after.pixels
    }

    /// Fold a later edit on the same layer into this one. `canvas` must
    /// already show the result of `newer`.
    ///
    /// The merged before-state takes each pixel from the oldest patch that
    /// covers it; pixels covered by neither were never touched and are read
    /// from the canvas. The merged after-state is the canvas itself.
    pub fn absorb(&mut self, newer: PatchEdit, canvas: &CanvasState) {
        let union = self.rect().union(&newer.rect());
        let layer_index = self.layer_index();
        let current = canvas.layers.get(layer_index).map(|l| &l.pixels);

        let mut before = RgbaImage::new(union.width, union.height);
        for pos in union.positions() {
            let px = self
                .before
                .pixel(pos)
                .or_else(|| newer.before.pixel(pos))
                .unwrap_or_else(|| current.map_or(TRANSPARENT, |b| b.pixel_at(pos)));
            before.put_pixel((pos.x - union.x) as u32, (pos.y - union.y) as u32, px);
        }

        self.before = PixelPatch { layer_index, rect: union, pixels: before };
        self.after = PixelPatch::capture(canvas, layer_index, union);
    }

    pub fn memory_size(&self) -> usize {
        self.before.memory_size() + self.after.memory_size()
    }
}

// ============================================================================
// LAYER OPERATIONS
// ============================================================================

/// Types of layer operations that can be undone/redone
#[derive(Clone, Debug, PartialEq)]
pub enum LayerOperation {
    /// A layer was added at the given index
    Add { index: usize, name: String, width: u32, height: u32 },
    /// A layer was deleted (stores the full layer for restore)
    Delete { index: usize, layer: Layer },
    /// Layer was moved from one index to another
    Move { from_index: usize, to_index: usize },
    /// Layer visibility was toggled
    Visibility { index: usize, was_visible: bool },
}

impl LayerOperation {
    fn remove_layer(canvas: &mut CanvasState, index: usize) {
        if index < canvas.layers.len() && canvas.layers.len() > 1 {
            canvas.layers.remove(index);
            if canvas.active_layer_index >= canvas.layers.len() {
                canvas.active_layer_index = canvas.layers.len() - 1;
            }
        }
    }

    fn move_layer(canvas: &mut CanvasState, from: usize, to: usize) {
        if from < canvas.layers.len() {
            let layer = canvas.layers.remove(from);
            let insert_idx = to.min(canvas.layers.len());
            canvas.layers.insert(insert_idx, layer);
            canvas.active_layer_index = insert_idx;
        }
    }

    fn undo(&self, canvas: &mut CanvasState) {
        match self {
            LayerOperation::Add { index, .. } => Self::remove_layer(canvas, *index),
            LayerOperation::Delete { index, layer } => {
                let insert_idx = (*index).min(canvas.layers.len());
                canvas.layers.insert(insert_idx, layer.clone());
                canvas.active_layer_index = insert_idx;
            }
            LayerOperation::Move { from_index, to_index } => Self::move_layer(canvas, *to_index, *from_index),
            LayerOperation::Visibility { index, was_visible } => {
                if let Some(layer) = canvas.layers.get_mut(*index) {
                    layer.visible = *was_visible;
                }
            }
        }
        canvas.mark_dirty(None);
    }

    fn redo(&self, canvas: &mut CanvasState) {
        match self {
            LayerOperation::Add { index, name, width, height } => {
                let layer = Layer::new(name.clone(), *width, *height, TRANSPARENT);
                let insert_idx = (*index).min(canvas.layers.len());
                canvas.layers.insert(insert_idx, layer);
                canvas.active_layer_index = insert_idx;
            }
            LayerOperation::Delete { index, .. } => Self::remove_layer(canvas, *index),
            LayerOperation::Move { from_index, to_index } => Self::move_layer(canvas, *from_index, *to_index),
            LayerOperation::Visibility { index, was_visible } => {
                if let Some(layer) = canvas.layers.get_mut(*index) {
                    layer.visible = !was_visible;
                }
            }
        }
        canvas.mark_dirty(None);
    }

    fn description(&self) -> String {
        match self {
            LayerOperation::Add { name, .. } => format!("Add Layer: {}", name),
            LayerOperation::Delete { layer, .. } => format!("Delete Layer: {}", layer.name),
            LayerOperation::Move { from_index, to_index } => {
                format!("Move Layer {} → {}", from_index, to_index)
            }
            LayerOperation::Visibility { index, was_visible } => {
                if *was_visible {
                    format!("Hide Layer {}", index)
                } else {
                    format!("Show Layer {}", index)
                }
            }
        }
    }

    fn memory_size(&self) -> usize {
        match self {
            LayerOperation::Delete { layer, .. } => layer.pixels.memory_bytes() + layer.name.len(),
            LayerOperation::Add { name, .. } => name.len(),
            _ => std::mem::size_of::<LayerOperation>(),
        }
    }
}

// ============================================================================
// CANVAS SNAPSHOT — full-canvas undo for resize
// ============================================================================

/// Everything a resize can change.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Layer>,
    pub active_layer_index: usize,
    pub notes: Vec<Note>,
}

impl CanvasSnapshot {
    pub fn capture(state: &CanvasState) -> Self {
        Self {
            width: state.width,
            height: state.height,
            layers: state.layers.clone(),
            active_layer_index: state.active_layer_index,
            notes: state.notes.clone(),
        }
    }

    pub fn restore_into(&self, state: &mut CanvasState) {
        state.width = self.width;
        state.height = self.height;
        state.layers = self.layers.clone();
        state.active_layer_index = self.active_layer_index;
        state.notes = self.notes.clone();
        state.mark_dirty(None);
    }

    fn memory_bytes(&self) -> usize {
        self.layers.iter().map(|l| l.pixels.memory_bytes() + l.name.len()).sum()
    }
}

// ============================================================================
// COMMAND
// ============================================================================

/// Before/after state of a confirmed selection modification.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionEdit {
    pub kind: ModificationKind,
    /// Where the contents were lifted from.
    pub source: PatchEdit,
    /// Where the contents were dropped.
    pub target: PatchEdit,
    pub area_before: PixelRect,
    pub area_after: PixelRect,
}

/// One reversible edit.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A pen or eraser segment; segments with the same stroke id coalesce.
    Paint { description: &'static str, stroke_id: u64, edit: PatchEdit },
    Fill { description: &'static str, edit: PatchEdit },
    /// Erased selection (or layer). Undo brings the selection back.
    Delete { edit: PatchEdit, selection: PixelRect },
    SelectionMove(SelectionEdit),
    SelectionTransform(SelectionEdit),
    /// The first redo is skipped: the contents are already on the canvas
    /// when the command is pushed.
    Paste { used: bool, target: PatchEdit, area_before: PixelRect, area_after: PixelRect },
    Resize { description: &'static str, before: CanvasSnapshot, after: CanvasSnapshot },
    Layer(LayerOperation),
    Note(NoteEdit),
}

impl Command {
    /// Revert the edit. Returns the selection area to restore, if the
    /// command owns one.
    pub fn undo(&mut self, canvas: &mut CanvasState) -> Option<PixelRect> {
        match self {
            Command::Paint { edit, .. } | Command::Fill { edit, .. } => {
                edit.undo(canvas);
                None
            }
            Command::Delete { edit, selection } => {
                edit.undo(canvas);
                Some(*selection)
            }
            Command::SelectionMove(sel) | Command::SelectionTransform(sel) => {
                sel.target.undo(canvas);
                sel.source.undo(canvas);
                Some(sel.area_before)
            }
            Command::Paste { target, area_before, .. } => {
                target.undo(canvas);
                Some(*area_before)
            }
            Command::Resize { before, .. } => {
                before.restore_into(canvas);
                Some(PixelRect::EMPTY)
            }
            Command::Layer(op) => {
                op.undo(canvas);
                None
            }
            Command::Note(edit) => {
                edit.revert(&mut canvas.notes);
                None
            }
        }
    }

    /// Apply the edit. Idempotent, apart from the first call on a paste.
    pub fn redo(&mut self, canvas: &mut CanvasState) -> Option<PixelRect> {
        match self {
            Command::Paint { edit, .. } | Command::Fill { edit, .. } => {
                edit.redo(canvas);
                None
            }
            Command::Delete { edit, .. } => {
                edit.redo(canvas);
                Some(PixelRect::EMPTY)
            }
            Command::SelectionMove(sel) | Command::SelectionTransform(sel) => {
                sel.source.redo(canvas);
                sel.target.redo(canvas);
                Some(sel.area_after)
            }
            Command::Paste { used, target, area_after, .. } => {
                if !*used {
                    *used = true;
                    return None;
                }
                target.redo(canvas);
                Some(*area_after)
            }
            Command::Resize { after, .. } => {
                after.restore_into(canvas);
                Some(PixelRect::EMPTY)
            }
            Command::Layer(op) => {
                op.redo(canvas);
                None
            }
            Command::Note(edit) => {
                edit.apply(&mut canvas.notes);
                None
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            Command::Paint { description, .. }
            | Command::Fill { description, .. }
            | Command::Resize { description, .. } => description.to_string(),
            Command::Delete { .. } => "Delete".to_string(),
            Command::SelectionMove(sel) | Command::SelectionTransform(sel) => sel.kind.description().to_string(),
            Command::Paste { .. } => "Paste".to_string(),
            Command::Layer(op) => op.description(),
            Command::Note(edit) => edit.description().to_string(),
        }
    }

    /// Whether the edit changes pixels or layers (notes do not).
    pub fn modifies_contents(&self) -> bool {
        !matches!(self, Command::Note(_))
    }

    /// Whether applying the edit leaves the document exactly as it was.
    pub fn is_noop(&self) -> bool {
        match self {
            Command::Paint { edit, .. } | Command::Fill { edit, .. } | Command::Delete { edit, .. } => {
                edit.is_noop()
            }
            Command::SelectionMove(sel) | Command::SelectionTransform(sel) => {
                sel.source.is_noop() && sel.target.is_noop()
            }
            Command::Paste { target, .. } => target.is_noop(),
            Command::Resize { before, after, .. } => {
                before.width == after.width && before.height == after.height && before.layers == after.layers
            }
            Command::Layer(LayerOperation::Move { from_index, to_index }) => from_index == to_index,
            Command::Layer(_) => false,
            Command::Note(NoteEdit::Modify { before, after, .. }) => before == after,
            Command::Note(_) => false,
        }
    }

    /// Identity used to merge paint segments of one stroke.
    fn coalesce_key(&self) -> Option<(usize, u64)> {
        match self {
            Command::Paint { stroke_id, edit, .. } => Some((edit.layer_index(), *stroke_id)),
            _ => None,
        }
    }

    /// Try to fold `newer` into `self`; gives it back when the two don't coalesce.
    fn try_absorb(&mut self, newer: Command, canvas: &CanvasState) -> Result<(), Command> {
        match (self.coalesce_key(), newer.coalesce_key()) {
            (Some(a), Some(b)) if a == b => {}
            _ => return Err(newer),
        }
        if let (Command::Paint { edit, .. }, Command::Paint { edit: newer_edit, .. }) = (self, newer) {
            edit.absorb(newer_edit, canvas);
        }
        Ok(())
    }

    pub fn memory_size(&self) -> usize {
        match self {
            Command::Paint { edit, .. } | Command::Fill { edit, .. } | Command::Delete { edit, .. } => {
                edit.memory_size()
            }
            Command::SelectionMove(sel) | Command::SelectionTransform(sel) => {
                sel.source.memory_size() + sel.target.memory_size()
            }
            Command::Paste { target, .. } => target.memory_size(),
            Command::Resize { before, after, .. } => before.memory_bytes() + after.memory_bytes(),
            Command::Layer(op) => op.memory_size(),
            Command::Note(_) => std::mem::size_of::<NoteEdit>(),
        }
    }
}

// ============================================================================
// COMMAND LOG - linear undo stack with macros, coalescing and clean tracking
// ============================================================================

/// What an undo or redo step did.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub description: String,
    pub modifies_contents: bool,
    /// Selection area the step wants restored (last one wins inside a macro).
    pub selection: Option<PixelRect>,
}

/// One undo step: a single command or a whole macro.
#[derive(Debug)]
struct LogEntry {
    description: String,
    commands: Vec<Command>,
    /// The step leaves the document unchanged; it never makes it dirty.
    net_noop: bool,
}

impl LogEntry {
    fn modifies_contents(&self) -> bool {
        self.commands.iter().any(Command::modifies_contents)
    }

    fn memory_size(&self) -> usize {
        self.commands.iter().map(Command::memory_size).sum()
    }
}

#[derive(Debug)]
struct OpenMacro {
    description: String,
    commands: Vec<Command>,
    fingerprint_before: u64,
}

/// Undo/redo log. Entries left of the cursor are undoable, the rest redoable.
#[derive(Debug)]
pub struct CommandLog {
    entries: VecDeque<LogEntry>,
    cursor: usize,
    /// 0 = unlimited.
    max_entries: usize,
    max_memory_bytes: Option<usize>,
    total_memory: usize,
    open_macro: Option<OpenMacro>,
    /// Cursor position of the last save. `None` once that state is unreachable.
    clean: Option<usize>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CommandLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            max_entries,
            max_memory_bytes: Some(512 * 1024 * 1024),
            total_memory: 0,
            open_macro: None,
            clean: Some(0),
        }
    }

    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.prune();
    }

    pub fn is_composing(&self) -> bool {
        self.open_macro.is_some()
    }

    /// Execute `command` (its `redo`) and record it. Returns the selection
    /// the command wants restored.
    pub fn push(&mut self, mut command: Command, canvas: &mut CanvasState) -> Option<PixelRect> {
        self.truncate_redo_tail();
        let selection = command.redo(canvas);

        if let Some(open) = &mut self.open_macro {
            match open.commands.last_mut() {
                Some(last) => {
                    if let Err(command) = last.try_absorb(command, canvas) {
                        open.commands.push(command);
                    }
                }
                None => open.commands.push(command),
            }
            return selection;
        }

        // Coalesce into the newest entry unless it is the saved state.
        let can_merge = self.cursor > 0 && self.clean != Some(self.cursor);
        let command = if can_merge {
            let top = &mut self.entries[self.cursor - 1];
            if top.commands.len() == 1 {
                let old_size = top.memory_size();
                match top.commands[0].try_absorb(command, canvas) {
                    Ok(()) => {
                        top.net_noop = top.commands[0].is_noop();
                        let new_size = top.memory_size();
                        self.total_memory = self.total_memory.saturating_sub(old_size) + new_size;
                        self.prune();
                        return selection;
                    }
                    Err(command) => command,
                }
            } else {
                command
            }
        } else {
            command
        };

        let entry = LogEntry {
            description: command.description(),
            net_noop: command.is_noop(),
            commands: vec![command],
        };
        self.append(entry);
        selection
    }

    /// Start grouping pushes into one undo step. Macros do not nest.
    pub fn begin_macro(&mut self, name: &str, canvas: &CanvasState) {
        if let Some(open) = &self.open_macro {
            warn!(outer = %open.description, nested = name, "begin_macro while composing; joining outer macro");
            return;
        }
        debug!(name, "begin macro");
        self.open_macro = Some(OpenMacro {
            description: name.to_string(),
            commands: Vec::new(),
            fingerprint_before: canvas.content_fingerprint(),
        });
    }

    /// Close the open macro. Returns whether it changed contents, or `None`
    /// if nothing was recorded.
    pub fn end_macro(&mut self, canvas: &CanvasState) -> Option<bool> {
        let Some(open) = self.open_macro.take() else {
            warn!("end_macro without begin_macro");
            return None;
        };
        if open.commands.is_empty() {
            debug!(name = %open.description, "empty macro discarded");
            return None;
        }
        let entry = LogEntry {
            description: open.description,
            net_noop: canvas.content_fingerprint() == open.fingerprint_before,
            commands: open.commands,
        };
        let modifies = entry.modifies_contents();
        self.append(entry);
        Some(modifies)
    }

    fn append(&mut self, entry: LogEntry) {
        self.total_memory += entry.memory_size();
        self.entries.push_back(entry);
        self.cursor = self.entries.len();
        self.prune();
    }

    fn truncate_redo_tail(&mut self) {
        if self.cursor == self.entries.len() {
            return;
        }
        for entry in self.entries.drain(self.cursor..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }
        if self.clean.is_some_and(|c| c > self.cursor) {
            self.clean = None;
        }
    }

    /// Prune old entries to stay within limits
    fn prune(&mut self) {
        let over_count = |log: &Self| log.max_entries > 0 && log.entries.len() > log.max_entries;
        let over_memory = |log: &Self| {
            log.max_memory_bytes.is_some_and(|max| log.total_memory > max) && log.entries.len() > 1
        };
        while self.cursor > 0 && (over_count(self) || over_memory(self)) {
            let Some(removed) = self.entries.pop_front() else { break };
            self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            self.cursor -= 1;
            self.clean = match self.clean {
                Some(0) | None => None,
                Some(c) => Some(c - 1),
            };
        }
    }

    pub fn undo(&mut self, canvas: &mut CanvasState) -> Option<StepOutcome> {
        if self.open_macro.is_some() {
            warn!("undo while a macro is open; ignored");
            return None;
        }
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let entry = &mut self.entries[self.cursor];
        let mut selection = None;
        for command in entry.commands.iter_mut().rev() {
            if let Some(s) = command.undo(canvas) {
                selection = Some(s);
            }
        }
        Some(StepOutcome {
            description: entry.description.clone(),
            modifies_contents: entry.modifies_contents(),
            selection,
        })
    }

    pub fn redo(&mut self, canvas: &mut CanvasState) -> Option<StepOutcome> {
        if self.open_macro.is_some() {
            warn!("redo while a macro is open; ignored");
            return None;
        }
        let entry = self.entries.get_mut(self.cursor)?;
        let mut selection = None;
        for command in entry.commands.iter_mut() {
            if let Some(s) = command.redo(canvas) {
                selection = Some(s);
            }
        }
        self.cursor += 1;
        Some(StepOutcome {
            description: entry.description.clone(),
            modifies_contents: entry.modifies_contents(),
            selection,
        })
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.cursor.checked_sub(1).map(|i| self.entries[i].description.clone())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.entries.get(self.cursor).map(|e| e.description.clone())
    }

    /// All entry descriptions, oldest first.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.description.clone()).collect()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the current memory usage of the history (O(1) via cached total)
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn mark_clean(&mut self) {
        self.clean = Some(self.cursor);
    }

    /// True when a step that changes the document lies between the saved
    /// state and the cursor.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.clean {
            None => true,
            Some(clean) => {
                let (lo, hi) = if clean <= self.cursor { (clean, self.cursor) } else { (self.cursor, clean) };
                self.entries.range(lo..hi).any(|e| !e.net_noop)
            }
        }
    }

    /// Drop all history. The current document state becomes the only
    /// reachable one, so it counts as saved only if it already was.
    pub fn clear(&mut self) {
        let unsaved = self.has_unsaved_changes();
        self.entries.clear();
        self.cursor = 0;
        self.total_memory = 0;
        self.open_macro = None;
        self.clean = if unsaved { None } else { Some(0) };
    }
}
