use thiserror::Error;

/// Failures inside the editing core.
///
/// None of these cross the `Project` boundary as errors: state problems are
/// logged and ignored, user-facing ones become `Notification::ErrorOccurred`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("No image is loaded")]
    NoImageLoaded,
    #[error("Invalid image size {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Image is too large ({width}×{height}); the limit is {max_pixels} pixels")]
    ImageTooLarge { width: u32, height: u32, max_pixels: u64 },
    #[error("Layer index {index} is out of range ({count} layers)")]
    LayerOutOfRange { index: usize, count: usize },
    #[error("There is no selection")]
    NoSelection,
    #[error("No selection modification is in progress")]
    NoModificationInProgress,
    #[error("A different selection modification is already in progress")]
    ModificationInProgress,
    #[error("The swatch has no colours")]
    EmptySwatch,
}

impl CoreError {
    /// Whether the error should be shown to the user rather than just logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CoreError::ImageTooLarge { .. } | CoreError::EmptySwatch)
    }
}
