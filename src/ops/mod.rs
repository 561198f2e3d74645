pub mod brush;
pub mod fill;
pub mod palette;
pub mod primitives;
pub mod transform;
