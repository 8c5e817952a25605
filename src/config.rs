//! Startup configuration for the piano

use std::time::Duration;

use thiserror::Error;

use crate::input::{Keymap, DEFAULT_RELEASE_AFTER};
use crate::io::DEFAULT_VELOCITY;
use crate::layout::{KeyboardLayout, LayoutError, DEFAULT_FIRST_OCTAVE, DEFAULT_OCTAVES};
use crate::note::PlaySettings;

/// Longest synthetic release delay accepted
pub const MAX_RELEASE_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("octave count must be between 1 and 10, got {0}")]
    Octaves(u8),
    #[error("keymap octave {keymap_octave} is outside the {octaves}-octave keyboard")]
    KeymapOctave { keymap_octave: u8, octaves: u8 },
    #[error("release delay must be between 1ms and 5000ms, got {0}ms")]
    ReleaseAfter(u64),
    #[error("velocity must be between 1 and 127, got {0}")]
    Velocity(u8),
    #[error("program must be between 0 and 127, got {0}")]
    Program(u8),
    #[error("playback queue capacity must be non-zero")]
    QueueCapacity,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PianoConfig {
    /// Octave number of the leftmost C
    pub first_octave: u8,
    /// Number of whole octaves drawn
    pub octaves: u8,
    /// Close the keyboard with one more C on the right
    pub closing_c: bool,
    pub keymap: Keymap,
    /// Which drawn octave (0-based) the keymap's first key lands on
    pub keymap_octave: u8,
    /// Delay before a key press without a release is let go, in milliseconds
    pub release_after_ms: u64,
    pub velocity: u8,
    /// General MIDI program selected at startup
    pub program: u8,
    pub settings: PlaySettings,
    pub queue_capacity: usize,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            first_octave: DEFAULT_FIRST_OCTAVE,
            octaves: DEFAULT_OCTAVES,
            closing_c: false,
            keymap: Keymap::Home,
            keymap_octave: 1,
            release_after_ms: DEFAULT_RELEASE_AFTER.as_millis() as u64,
            velocity: DEFAULT_VELOCITY,
            program: 0,
            settings: PlaySettings::default(),
            queue_capacity: 256,
        }
    }
}

impl PianoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 || self.octaves > 10 {
            return Err(ConfigError::Octaves(self.octaves));
        }
        if self.keymap_octave >= self.octaves {
            return Err(ConfigError::KeymapOctave {
                keymap_octave: self.keymap_octave,
                octaves: self.octaves,
            });
        }
        let release = Duration::from_millis(self.release_after_ms);
        if release.is_zero() || release > MAX_RELEASE_AFTER {
            return Err(ConfigError::ReleaseAfter(self.release_after_ms));
        }
        if self.velocity == 0 || self.velocity > 127 {
            return Err(ConfigError::Velocity(self.velocity));
        }
        if self.program > 127 {
            return Err(ConfigError::Program(self.program));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::QueueCapacity);
        }
        Ok(())
    }

    /// Validate, then build the key layout
    pub fn layout(&self) -> Result<KeyboardLayout, ConfigError> {
        self.validate()?;
        Ok(KeyboardLayout::octaves(
            self.first_octave,
            self.octaves,
            self.closing_c,
        )?)
    }

    pub fn release_after(&self) -> Duration {
        Duration::from_millis(self.release_after_ms)
    }

    /// Grid position of the keymap's first key
    pub fn keymap_base(&self) -> usize {
        self.keymap_octave as usize * 12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_reference_layout() {
        let config = PianoConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.layout().unwrap(), KeyboardLayout::default());
        assert_eq!(config.keymap_base(), 12);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = |f: fn(&mut PianoConfig)| {
            let mut config = PianoConfig::default();
            f(&mut config);
            config.validate().unwrap_err()
        };

        assert_eq!(bad(|c| c.octaves = 0), ConfigError::Octaves(0));
        assert_eq!(
            bad(|c| c.keymap_octave = 5),
            ConfigError::KeymapOctave { keymap_octave: 5, octaves: 5 }
        );
        assert_eq!(bad(|c| c.release_after_ms = 0), ConfigError::ReleaseAfter(0));
        assert_eq!(bad(|c| c.velocity = 128), ConfigError::Velocity(128));
        assert_eq!(bad(|c| c.program = 200), ConfigError::Program(200));
        assert_eq!(bad(|c| c.queue_capacity = 0), ConfigError::QueueCapacity);
    }

    #[test]
    fn layout_errors_surface() {
        let config = PianoConfig {
            first_octave: 8,
            octaves: 3,
            ..PianoConfig::default()
        };
        assert!(matches!(config.layout(), Err(ConfigError::Layout(_))));
    }
}
