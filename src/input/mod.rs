// Purpose: turn raw key codes and pointer events into key transitions

pub mod keys;
pub mod pointer;

pub use keys::{InputTranslator, Keymap, DEFAULT_RELEASE_AFTER};
pub use pointer::{DragState, PointerDragController};
