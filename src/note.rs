/*
Note Identity
=============

Conversion between note names and MIDI note numbers, plus the play-time
transposition applied on top of a key's base value.

The MIDI formula: note_number = 12 * (octave + 1) + pitch_class + sharp_bit
Where pitch_class: C=0, D=2, E=4, F=5, G=7, A=9, B=11

Names follow `<letter>[#]<digits>`:
  "C4"  -> 60 (middle C)
  "C#4" -> 61
  "B3"  -> 59

Transposition is never accumulated. Every dispatch recomputes
`base + transpose + 12 * octave` from the key's base value, so changing the
settings while keys are held does not drift anything.
*/

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

/// Chromatic scale in pitch-class order
pub const SCALE: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Allowed octave shift, in octaves
pub const OCTAVE_RANGE: RangeInclusive<i8> = -3..=3;

/// Allowed transposition, in semitones
pub const TRANSPOSE_RANGE: RangeInclusive<i8> = -11..=11;

/// Highest valid MIDI note number
pub const MIDI_MAX: u8 = 127;

/// Errors produced while parsing a note name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("note name is empty")]
    Empty,
    #[error("unknown note letter {letter:?} in {name:?}")]
    UnknownLetter { name: String, letter: char },
    #[error("note name {name:?} has no octave digits")]
    MissingOctave { name: String },
    #[error("note name {name:?} does not match <letter>[#]<octave>")]
    Malformed { name: String },
    #[error("note {name:?} is outside the MIDI range 0..=127")]
    OutOfRange { name: String },
}

/// A parsed note name such as `C#4`
///
/// Only built by parsing, which guarantees the note fits in MIDI 0..=127.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    /// Uppercase note letter, `A` through `G`
    letter: char,
    sharp: bool,
    octave: u8,
}

impl NoteName {
    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn is_sharp(&self) -> bool {
        self.sharp
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// Pitch class of the letter alone (sharp not applied)
    pub fn letter_class(&self) -> u8 {
        letter_class(self.letter).unwrap_or(0)
    }

    /// Pitch class including the sharp
    pub fn pitch_class(&self) -> u8 {
        (self.letter_class() + self.sharp as u8) % 12
    }

    /// MIDI note number of this name
    pub fn midi(&self) -> u8 {
        12 * (self.octave + 1) + self.letter_class() + self.sharp as u8
    }

    /// The name without its octave, e.g. `C#`
    pub fn class_name(&self) -> String {
        if self.sharp {
            format!("{}#", self.letter)
        } else {
            self.letter.to_string()
        }
    }
}

impl FromStr for NoteName {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        let first = chars.next().ok_or(ParseError::Empty)?;
        let letter = first.to_ascii_uppercase();
        if letter_class(letter).is_none() {
            return Err(ParseError::UnknownLetter {
                name: name.to_string(),
                letter: first,
            });
        }

        let rest = chars.as_str();
        let (sharp, digits) = match rest.strip_prefix('#') {
            Some(digits) => (true, digits),
            None => (false, rest),
        };

        if digits.is_empty() {
            return Err(ParseError::MissingOctave {
                name: name.to_string(),
            });
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::Malformed {
                name: name.to_string(),
            });
        }

        // Anything past octave 9 is above MIDI 127 anyway
        let octave: u32 = digits.parse().map_err(|_| ParseError::OutOfRange {
            name: name.to_string(),
        })?;
        let midi = 12 * (octave + 1) + letter_class(letter).unwrap_or(0) as u32 + sharp as u32;
        if midi > MIDI_MAX as u32 {
            return Err(ParseError::OutOfRange {
                name: name.to_string(),
            });
        }

        Ok(Self {
            letter,
            sharp,
            octave: octave as u8,
        })
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class_name(), self.octave)
    }
}

fn letter_class(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Convert a note name to its MIDI note number
pub fn note_to_midi(name: &str) -> Result<u8, ParseError> {
    name.parse::<NoteName>().map(|note| note.midi())
}

/// Name of a MIDI note number, e.g. `60 -> "C4"`, `0 -> "C-1"`
pub fn midi_to_note_name(midi: u8) -> String {
    let octave = midi as i32 / 12 - 1;
    format!("{}{}", SCALE[(midi % 12) as usize], octave)
}

/// Octave and transposition applied at dispatch time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawPlaySettings"))]
pub struct PlaySettings {
    octave: i8,
    transpose: i8,
}

/// Settings as written in a config file, before clamping
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPlaySettings {
    #[serde(default)]
    octave: i8,
    #[serde(default)]
    transpose: i8,
}

#[cfg(feature = "serde")]
impl From<RawPlaySettings> for PlaySettings {
    fn from(raw: RawPlaySettings) -> Self {
        Self::new(raw.octave, raw.transpose)
    }
}

impl PlaySettings {
    /// Create settings, clamping both values into range
    pub fn new(octave: i8, transpose: i8) -> Self {
        Self {
            octave: clamp_to(octave, &OCTAVE_RANGE),
            transpose: clamp_to(transpose, &TRANSPOSE_RANGE),
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn transpose(&self) -> i8 {
        self.transpose
    }

    pub fn set_octave(&mut self, octave: i8) {
        self.octave = clamp_to(octave, &OCTAVE_RANGE);
    }

    pub fn set_transpose(&mut self, transpose: i8) {
        self.transpose = clamp_to(transpose, &TRANSPOSE_RANGE);
    }

    /// Shift the octave by `delta`. Returns true if it changed.
    pub fn shift_octave(&mut self, delta: i8) -> bool {
        let before = self.octave;
        self.set_octave(before.saturating_add(delta));
        self.octave != before
    }

    /// Shift the transposition by `delta`. Returns true if it changed.
    pub fn shift_transpose(&mut self, delta: i8) -> bool {
        let before = self.transpose;
        self.set_transpose(before.saturating_add(delta));
        self.transpose != before
    }

    /// Total semitone offset
    pub fn offset(&self) -> i32 {
        self.transpose as i32 + self.octave as i32 * 12
    }
}

fn clamp_to(value: i8, range: &RangeInclusive<i8>) -> i8 {
    value.clamp(*range.start(), *range.end())
}

/// Apply the play settings to a key's base MIDI value.
///
/// The result may fall outside 0..=127; callers decide what to do with it.
pub fn transpose(midi_base: u8, settings: &PlaySettings) -> i32 {
    midi_base as i32 + settings.offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_names() {
        assert_eq!(note_to_midi("C4"), Ok(60));
        assert_eq!(note_to_midi("C#4"), Ok(61));
        assert_eq!(note_to_midi("B3"), Ok(59));
        assert_eq!(note_to_midi("A4"), Ok(69));
    }

    #[test]
    fn lowercase_letters_are_accepted() {
        assert_eq!(note_to_midi("c#4"), Ok(61));
    }

    #[test]
    fn whole_scale_is_chromatic() {
        for (i, class) in SCALE.iter().enumerate() {
            let name = format!("{}4", class);
            assert_eq!(note_to_midi(&name), Ok(60 + i as u8), "{}", name);
        }
    }

    #[test]
    fn multi_digit_octave() {
        assert_eq!(note_to_midi("C10"), Err(ParseError::OutOfRange { name: "C10".into() }));
        assert_eq!(note_to_midi("G9"), Ok(127));
        assert_eq!(note_to_midi("C0"), Ok(12));
    }

    #[test]
    fn malformed_names() {
        assert_eq!(note_to_midi(""), Err(ParseError::Empty));
        assert!(matches!(
            note_to_midi("H4"),
            Err(ParseError::UnknownLetter { letter: 'H', .. })
        ));
        assert!(matches!(note_to_midi("C#"), Err(ParseError::MissingOctave { .. })));
        assert!(matches!(note_to_midi("Cb4"), Err(ParseError::Malformed { .. })));
        assert!(matches!(note_to_midi("C4x"), Err(ParseError::Malformed { .. })));
        assert!(matches!(note_to_midi("C##4"), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn parsed_names_expose_their_parts() {
        let note: NoteName = "g#8".parse().unwrap();
        assert_eq!((note.letter(), note.is_sharp(), note.octave()), ('G', true, 8));
        assert_eq!(note.midi(), 116);
        assert_eq!(note.to_string(), "G#8");

        // The highest name that parses is the highest MIDI note
        let top: NoteName = "G9".parse().unwrap();
        assert_eq!(top.midi(), MIDI_MAX);
        assert!("G#9".parse::<NoteName>().is_err());
    }

    #[test]
    fn midi_names_round_trip_for_reference_octaves() {
        for midi in 48..108u8 {
            assert_eq!(note_to_midi(&midi_to_note_name(midi)), Ok(midi));
        }
        assert_eq!(midi_to_note_name(0), "C-1");
    }

    #[test]
    fn transpose_is_linear() {
        assert_eq!(transpose(60, &PlaySettings::new(1, 0)), 72);
        assert_eq!(transpose(60, &PlaySettings::new(0, -11)), 49);
        assert_eq!(transpose(60, &PlaySettings::new(-1, 2)), 50);
    }

    #[test]
    fn transpose_never_accumulates() {
        let mut settings = PlaySettings::default();
        settings.set_transpose(5);
        settings.set_transpose(3);
        assert_eq!(transpose(60, &settings), 63);
    }

    #[test]
    fn settings_are_clamped() {
        let mut settings = PlaySettings::new(9, -40);
        assert_eq!(settings.octave(), 3);
        assert_eq!(settings.transpose(), -11);

        assert!(!settings.shift_octave(1));
        assert!(settings.shift_octave(-1));
        assert_eq!(settings.octave(), 2);
        assert!(!settings.shift_transpose(-1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_settings_are_clamped() {
        use serde::de::value::{Error, MapDeserializer};
        use serde::Deserialize;

        let fields = vec![("octave", 9i8), ("transpose", -40i8)];
        let settings =
            PlaySettings::deserialize(MapDeserializer::<_, Error>::new(fields.into_iter())).unwrap();
        assert_eq!(settings, PlaySettings::new(3, -11));
        assert_eq!(transpose(60, &settings), 85);

        let partial = vec![("transpose", 4i8)];
        let settings =
            PlaySettings::deserialize(MapDeserializer::<_, Error>::new(partial.into_iter())).unwrap();
        assert_eq!(settings, PlaySettings::new(0, 4));
    }
}
