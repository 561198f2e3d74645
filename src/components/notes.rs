//! Text annotations pinned to image positions.

use serde::{Deserialize, Serialize};

use crate::geometry::{PixelPos, PixelRect};

/// Side of the square around a note's position that counts as hitting it.
pub const NOTE_HIT_SIZE: u32 = 16;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub position: PixelPos,
    pub text: String,
}

impl Note {
    pub fn new(position: PixelPos, text: impl Into<String>) -> Self {
        Self { position, text: text.into() }
    }

    pub fn hit_rect(&self) -> PixelRect {
        PixelRect::new(self.position.x, self.position.y, NOTE_HIT_SIZE, NOTE_HIT_SIZE)
    }
}

/// Index of the topmost note whose hit box contains `pos`.
pub fn note_at(notes: &[Note], pos: PixelPos) -> Option<usize> {
    notes.iter().rposition(|n| n.hit_rect().contains(pos))
}

/// An undoable change to the note list.
#[derive(Clone, Debug, PartialEq)]
pub enum NoteEdit {
    Add { index: usize, note: Note },
    Remove { index: usize, note: Note },
    Modify { index: usize, before: Note, after: Note },
}

impl NoteEdit {
    pub fn apply(&self, notes: &mut Vec<Note>) {
        match self {
            NoteEdit::Add { index, note } => notes.insert((*index).min(notes.len()), note.clone()),
            NoteEdit::Remove { index, .. } => {
                if *index < notes.len() {
                    notes.remove(*index);
                }
            }
            NoteEdit::Modify { index, after, .. } => {
                if let Some(n) = notes.get_mut(*index) {
                    *n = after.clone();
                }
            }
        }
    }

    pub fn revert(&self, notes: &mut Vec<Note>) {
        match self {
            NoteEdit::Add { index, .. } => {
                if *index < notes.len() {
                    notes.remove(*index);
                }
            }
            NoteEdit::Remove { index, note } => notes.insert((*index).min(notes.len()), note.clone()),
            NoteEdit::Modify { index, before, .. } => {
                if let Some(n) = notes.get_mut(*index) {
                    *n = before.clone();
                }
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NoteEdit::Add { .. } => "Add Note",
            NoteEdit::Remove { .. } => "Remove Note",
            NoteEdit::Modify { .. } => "Edit Note",
        }
    }
}
