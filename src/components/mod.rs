pub mod colors;
pub mod history;
pub mod notes;
pub mod selection;
pub mod tools;
