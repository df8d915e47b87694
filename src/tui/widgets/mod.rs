//! Reusable widgets for the TUI

pub mod input;
pub mod picker;

pub use input::{render_field, TextInput};
pub use picker::{render_picker, CategoryPicker};
