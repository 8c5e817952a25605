//! Keyboard layout - the fixed, ordered table of keys
//!
//! Built once at startup and never mutated. Positions are dense indices
//! `0..len` in left-to-right order, and consecutive keys are always one
//! semitone apart, which the renderer relies on to interlock the glyphs.

use thiserror::Error;

use crate::note::{NoteName, ParseError, SCALE};

/// Reference layout: five octaves starting at C3
pub const DEFAULT_FIRST_OCTAVE: u8 = 3;
pub const DEFAULT_OCTAVES: u8 = 5;

/// Errors raised while building a layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("a keyboard needs at least two keys, got {0}")]
    TooFewKeys(usize),
    #[error("invalid note in layout: {0}")]
    Note(#[from] ParseError),
    #[error("don't know how to draw note {0:?}")]
    UnknownShape(String),
    #[error("{next:?} does not follow {prev:?} chromatically")]
    NotContiguous { prev: String, next: String },
    #[error("keyboard must start on C or F and end on E, B, C or F, {note:?} leaves the border open")]
    OpenBorder { note: String },
}

/// Outline of a key, which decides its glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyShape {
    /// Black key
    Sharp,
    /// White key with a black key cut into its right side (C, F)
    NotchRight,
    /// White key with black keys on both sides (D, G, A)
    NotchBoth,
    /// White key with a black key cut into its left side (E, B)
    NotchLeft,
}

impl KeyShape {
    /// Classify a note name, ignoring its octave digits
    pub fn classify(note_name: &str) -> Result<Self, LayoutError> {
        let class: String = note_name
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .collect::<String>()
            .to_ascii_uppercase();

        match class.as_str() {
            "C#" | "D#" | "F#" | "G#" | "A#" => Ok(Self::Sharp),
            "C" | "F" => Ok(Self::NotchRight),
            "D" | "G" | "A" => Ok(Self::NotchBoth),
            "E" | "B" => Ok(Self::NotchLeft),
            _ => Err(LayoutError::UnknownShape(note_name.to_string())),
        }
    }

    pub fn is_sharp(self) -> bool {
        self == Self::Sharp
    }
}

/// Where a key sits relative to the outer border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerRole {
    First,
    Interior,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub note_name: String,
    /// MIDI value before any play settings are applied
    pub midi_base: u8,
    pub position: usize,
    pub is_sharp: bool,
    pub shape: KeyShape,
}

/// Ordered, immutable set of keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    keys: Vec<Key>,
}

impl KeyboardLayout {
    /// Whole octaves starting at `C{first_octave}`, optionally closed by one
    /// extra top C (the way a 61-key board ends).
    pub fn octaves(first_octave: u8, octaves: u8, closing_c: bool) -> Result<Self, LayoutError> {
        let mut names: Vec<String> = (0..octaves)
            .flat_map(|i| {
                let octave = first_octave as u32 + i as u32;
                SCALE.iter().map(move |class| format!("{}{}", class, octave))
            })
            .collect();

        if closing_c {
            names.push(format!("C{}", first_octave as u32 + octaves as u32));
        }

        Self::from_names(names.iter().map(String::as_str))
    }

    /// Build a layout from explicit note names in left-to-right order
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, LayoutError> {
        let mut keys: Vec<Key> = Vec::new();

        for (position, name) in names.into_iter().enumerate() {
            let note: NoteName = name.parse()?;
            let shape = KeyShape::classify(name)?;
            let midi_base = note.midi();

            if let Some(prev) = keys.last() {
                if midi_base != prev.midi_base + 1 {
                    return Err(LayoutError::NotContiguous {
                        prev: prev.note_name.clone(),
                        next: name.to_string(),
                    });
                }
            }

            keys.push(Key {
                note_name: note.to_string(),
                midi_base,
                position,
                is_sharp: shape.is_sharp(),
                shape,
            });
        }

        if keys.len() < 2 {
            return Err(LayoutError::TooFewKeys(keys.len()));
        }

        // Only these edges let the upper and lower rows close at the same column
        if let Some(first) = keys.first().filter(|k| k.shape != KeyShape::NotchRight) {
            return Err(LayoutError::OpenBorder {
                note: first.note_name.clone(),
            });
        }
        if let Some(last) = keys
            .last()
            .filter(|k| !matches!(k.shape, KeyShape::NotchLeft | KeyShape::NotchRight))
        {
            return Err(LayoutError::OpenBorder {
                note: last.note_name.clone(),
            });
        }

        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, position: usize) -> Option<&Key> {
        self.keys.get(position)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Border role of a position
    pub fn corner(&self, position: usize) -> CornerRole {
        if position == 0 {
            CornerRole::First
        } else if position + 1 == self.keys.len() {
            CornerRole::Last
        } else {
            CornerRole::Interior
        }
    }

    /// Position of the key whose base value is `midi_base`
    pub fn position_of(&self, midi_base: u8) -> Option<usize> {
        let first = self.keys.first()?.midi_base;
        let position = midi_base.checked_sub(first)? as usize;
        (position < self.keys.len()).then_some(position)
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        let keys = (0..DEFAULT_OCTAVES)
            .flat_map(|i| SCALE.iter().map(move |class| (class, DEFAULT_FIRST_OCTAVE + i)))
            .enumerate()
            .map(|(position, (class, octave))| {
                let shape = if class.ends_with('#') {
                    KeyShape::Sharp
                } else {
                    match *class {
                        "C" | "F" => KeyShape::NotchRight,
                        "E" | "B" => KeyShape::NotchLeft,
                        _ => KeyShape::NotchBoth,
                    }
                };
                Key {
                    note_name: format!("{}{}", class, octave),
                    midi_base: 12 * (DEFAULT_FIRST_OCTAVE + 1) + position as u8,
                    position,
                    is_sharp: shape.is_sharp(),
                    shape,
                }
            })
            .collect();
        Self { keys }
    }
}
