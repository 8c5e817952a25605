//! Keyboard grid - the per-key press/release state machine
//!
//! Every key is either released or pressed. Input paths (computer keyboard,
//! pointer, synthetic release deadlines) may fire `press`/`release` any number
//! of times for the same key; the grid turns that into exactly one note-on
//! per press episode and exactly one matching note-off.

use std::collections::BTreeMap;

use crate::io::{PlaybackDispatcher, DEFAULT_VELOCITY};
use crate::layout::{Key, KeyboardLayout};
use crate::note::{transpose, PlaySettings, MIDI_MAX};
use crate::widget::KeyWidget;

/// Key transition requested by an input source. Carries the grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(usize),
    Up(usize),
}

impl KeyEvent {
    pub fn position(&self) -> usize {
        match *self {
            KeyEvent::Down(position) | KeyEvent::Up(position) => position,
        }
    }
}

/// Receiver of key transitions from the input translators
pub trait KeySink {
    fn key_event(&mut self, event: KeyEvent);
}

impl KeySink for Vec<KeyEvent> {
    fn key_event(&mut self, event: KeyEvent) {
        self.push(event);
    }
}

pub struct KeyboardGrid<D: PlaybackDispatcher> {
    layout: KeyboardLayout,
    widgets: Vec<KeyWidget>,
    /// MIDI value each pressed key sounded, by position
    sounding: Vec<Option<u8>>,
    /// MIDI value -> position currently sounding it
    tracker: BTreeMap<u8, usize>,
    dispatcher: D,
    velocity: u8,
}

impl<D: PlaybackDispatcher> KeyboardGrid<D> {
    pub fn new(layout: KeyboardLayout, dispatcher: D) -> Self {
        let widgets = layout
            .keys()
            .iter()
            .map(|key| KeyWidget::new(key.clone(), layout.corner(key.position)))
            .collect();
        let sounding = vec![None; layout.len()];

        Self {
            layout,
            widgets,
            sounding,
            tracker: BTreeMap::new(),
            dispatcher,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Velocity for every note-on (clamped to 1..=127)
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.clamp(1, MIDI_MAX);
        self
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn widgets(&self) -> &[KeyWidget] {
        &self.widgets
    }

    pub fn key(&self, position: usize) -> Option<&Key> {
        self.layout.key(position)
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// For the settings controls (program, volume, ...), which bypass the grid
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn is_pressed(&self, position: usize) -> bool {
        self.sounding.get(position).copied().flatten().is_some()
    }

    /// Is this (transposed) MIDI value currently sounding?
    pub fn is_sounding(&self, midi: u8) -> bool {
        self.tracker.contains_key(&midi)
    }

    /// Positions of all pressed keys, left to right
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        self.sounding
            .iter()
            .enumerate()
            .filter_map(|(position, midi)| midi.map(|_| position))
    }

    /// Start sounding a key. Returns true if a note-on was sent.
    pub fn press(&mut self, position: usize, settings: &PlaySettings) -> bool {
        let Some(key) = self.layout.key(position) else {
            return false;
        };
        if self.sounding[position].is_some() {
            return false;
        }

        let transposed = transpose(key.midi_base, settings);
        let midi = match u8::try_from(transposed) {
            Ok(midi) if midi <= MIDI_MAX => midi,
            _ => {
                tracing::debug!(note = %key.note_name, transposed, "transposed note outside MIDI range");
                return false;
            }
        };
        if let Some(&owner) = self.tracker.get(&midi) {
            // Another key sounds this pitch under earlier settings
            tracing::debug!(note = %key.note_name, midi, owner, "pitch already sounding");
            return false;
        }

        tracing::debug!(note = %key.note_name, midi, position, "key down");
        self.dispatcher.note_on(midi, self.velocity);
        self.sounding[position] = Some(midi);
        self.tracker.insert(midi, position);
        self.widgets[position].set_highlight(true);
        true
    }

    /// Stop sounding a key. Returns true if a note-off was sent.
    pub fn release(&mut self, position: usize) -> bool {
        let Some(midi) = self.sounding.get_mut(position).and_then(Option::take) else {
            return false;
        };

        tracing::debug!(position, midi, "key up");
        self.dispatcher.note_off(midi);
        self.tracker.remove(&midi);
        self.widgets[position].set_highlight(false);
        true
    }

    /// Release every pressed key. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let pressed: Vec<usize> = self.pressed().collect();
        pressed.into_iter().filter(|&p| self.release(p)).count()
    }

    pub fn apply(&mut self, event: KeyEvent, settings: &PlaySettings) -> bool {
        match event {
            KeyEvent::Down(position) => self.press(position, settings),
            KeyEvent::Up(position) => self.release(position),
        }
    }

    /// Borrow the grid as a [`KeySink`] that presses with `settings`
    pub fn sink<'a>(&'a mut self, settings: &'a PlaySettings) -> GridSink<'a, D> {
        GridSink {
            grid: self,
            settings,
        }
    }
}

pub struct GridSink<'a, D: PlaybackDispatcher> {
    grid: &'a mut KeyboardGrid<D>,
    settings: &'a PlaySettings,
}

impl<D: PlaybackDispatcher> KeySink for GridSink<'_, D> {
    fn key_event(&mut self, event: KeyEvent) {
        self.grid.apply(event, self.settings);
    }
}
