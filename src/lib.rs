// ============================================================================
// PAINTFE CORE — layered pixel editing, tools, selection and undo history
// ============================================================================
//
// Architecture:
//   canvas.rs     — PixelBuffer, Layer, CanvasState, compositing
//   geometry.rs   — PixelPos / PixelRect and clamping
//   ops/          — pixel primitives, brush lines, fills, transforms, colour scan
//   components/   — history log, selection model, tool state, colours, notes
//   edit.rs       — EditContext handed to tools and the selection model
//   project.rs    — Project façade and the Notification queue
// ============================================================================

#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

pub mod canvas;
pub mod components;
pub mod config;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod logger;
pub mod ops;
pub mod project;

pub use canvas::{CanvasState, Layer, PixelBuffer, TRANSPARENT};
pub use components::colors::{ColourState, Swatch, SwatchColour};
pub use components::history::{Command, CommandLog};
pub use components::notes::Note;
pub use components::selection::{ModificationKind, SelectionModel};
pub use components::tools::{
    Key, Modifiers, PenRightClickBehaviour, PointerButton, Tool, ToolEvent, ToolShape, ToolState,
};
pub use config::EngineConfig;
pub use error::CoreError;
pub use geometry::{PixelPos, PixelRect};
pub use ops::palette::ColourScanOutcome;
pub use ops::transform::{FlipOrientation, HslAdjustment, RotationAngle};
pub use project::{Notification, Project};
