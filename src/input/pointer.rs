//! Pointer (mouse) input with drag-across-keys behavior
//!
//! Holding the button and dragging plays every key the pointer crosses, like
//! sliding a finger along a real keyboard. A drag that started on a black key
//! does not fall through onto the white keys beneath it: only other black
//! keys are picked up until the button is released.

use crate::grid::{KeyEvent, KeySink};
use crate::layout::Key;

/// Button state shared by every key on the keyboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    pub pointer_down: bool,
    /// The drag started on a sharp key
    pub active_is_sharp: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PointerDragController {
    state: DragState,
    /// Key currently held by the pointer
    active: Option<usize>,
}

impl PointerDragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Button pressed; `target` is the key under the pointer, if any
    pub fn pointer_down(&mut self, target: Option<&Key>, sink: &mut impl KeySink) {
        let Some(key) = target else {
            return;
        };

        // A missed button-up must not leave the old key stuck
        if let Some(previous) = self.active.take() {
            if previous != key.position {
                sink.key_event(KeyEvent::Up(previous));
            }
        }

        self.state = DragState {
            pointer_down: true,
            active_is_sharp: key.is_sharp,
        };
        self.active = Some(key.position);
        sink.key_event(KeyEvent::Down(key.position));
    }

    /// Pointer moved with the button held; `None` means it left the keyboard
    pub fn pointer_moved(&mut self, target: Option<&Key>, sink: &mut impl KeySink) {
        if !self.state.pointer_down {
            return;
        }
        let Some(key) = target else {
            self.pointer_left(sink);
            return;
        };
        if self.active == Some(key.position) {
            return;
        }

        let blocked = self.state.active_is_sharp && !key.is_sharp;
        if !blocked {
            sink.key_event(KeyEvent::Down(key.position));
        }
        // The pointer is now fully outside the previous key's hit area
        if let Some(previous) = self.active.take() {
            sink.key_event(KeyEvent::Up(previous));
        }
        self.active = (!blocked).then_some(key.position);
    }

    /// Button released anywhere
    pub fn pointer_up(&mut self, sink: &mut impl KeySink) {
        if let Some(previous) = self.active.take() {
            sink.key_event(KeyEvent::Up(previous));
        }
        self.state = DragState::default();
    }

    /// Pointer left the keyboard widget, or focus was lost
    pub fn pointer_left(&mut self, sink: &mut impl KeySink) {
        self.pointer_up(sink);
    }

    /// Forget the drag without emitting anything, for when the caller is
    /// clearing the grid itself
    pub fn reset(&mut self) {
        self.active = None;
        self.state = DragState::default();
    }
}
