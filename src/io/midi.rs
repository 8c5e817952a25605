use std::fmt;

use crate::note::midi_to_note_name;

/// Controller numbers used by the playback setters
pub const CC_VOLUME: u8 = 7;
pub const CC_SUSTAIN: u8 = 64;
pub const CC_REVERB: u8 = 91;
pub const CC_CHORUS: u8 = 93;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }

    /// Raw MIDI 1.0 bytes for this event
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiEvent::NoteOn { channel, key, velocity } => {
                [0x90 | (channel & 0x0f), key & 0x7f, velocity & 0x7f]
            }
            MidiEvent::NoteOff { channel, key, velocity } => {
                [0x80 | (channel & 0x0f), key & 0x7f, velocity & 0x7f]
            }
            MidiEvent::ControlChange { channel, controller, value } => {
                [0xb0 | (channel & 0x0f), controller & 0x7f, value & 0x7f]
            }
            // Program change is a two-byte message, the last byte is padding
            MidiEvent::ProgramChange { channel, program } => {
                [0xc0 | (channel & 0x0f), program & 0x7f, 0]
            }
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiEvent::NoteOn { channel, key, velocity } => write!(
                f,
                "ch{} note on  {:<4} vel {}",
                channel + 1,
                midi_to_note_name(key),
                velocity
            ),
            MidiEvent::NoteOff { channel, key, .. } => {
                write!(f, "ch{} note off {}", channel + 1, midi_to_note_name(key))
            }
            MidiEvent::ControlChange { channel, controller, value } => {
                write!(f, "ch{} cc {} = {}", channel + 1, controller, value)
            }
            MidiEvent::ProgramChange { channel, program } => {
                write!(f, "ch{} program {}", channel + 1, program)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bytes() {
        let on = MidiEvent::NoteOn { channel: 1, key: 60, velocity: 100 };
        assert_eq!(on.to_bytes(), [0x91, 60, 100]);

        let cc = MidiEvent::ControlChange { channel: 0, controller: CC_SUSTAIN, value: 127 };
        assert_eq!(cc.to_bytes(), [0xb0, 64, 127]);

        let pc = MidiEvent::ProgramChange { channel: 0, program: 5 };
        assert_eq!(pc.to_bytes(), [0xc0, 5, 0]);
    }

    #[test]
    fn display_uses_note_names() {
        let on = MidiEvent::NoteOn { channel: 0, key: 61, velocity: 90 };
        assert_eq!(on.to_string(), "ch1 note on  C#4  vel 90");
        let off = MidiEvent::NoteOff { channel: 0, key: 60, velocity: 0 };
        assert_eq!(off.to_string(), "ch1 note off C4");
    }
}
