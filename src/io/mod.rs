// Purpose - the playback boundary: MIDI messages and where they are sent

pub mod dispatch;
pub mod instruments;
pub mod midi;

pub use dispatch::{MidiReceiver, PlaybackDispatcher, DEFAULT_VELOCITY};
#[cfg(feature = "rtrb")]
pub use dispatch::QueueDispatcher;
pub use midi::MidiEvent;
