pub mod config;
pub mod grid; // Key press/release state machine
pub mod input; // Key codes and pointer drags -> key transitions
pub mod io; // Playback boundary
pub mod layout;
pub mod note; // Note names, MIDI numbers, transposition
pub mod piano;
pub mod render; // Glyphs for a single key
pub mod view;
pub mod widget;

pub use config::{ConfigError, PianoConfig};
pub use grid::{KeyEvent, KeySink, KeyboardGrid};
pub use layout::{Key, KeyboardLayout};
pub use note::{note_to_midi, transpose, ParseError, PlaySettings};
pub use piano::Piano;
