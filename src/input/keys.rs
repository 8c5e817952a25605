/*
Computer Keyboard Input
=======================

Terminals report key presses but (usually) not key releases. Each press
therefore arms a single-shot release deadline for its key; when the deadline
passes without another press of the same key, a synthetic release fires.

    press A ──► Down(C4), deadline t+600ms
    press A ──► (already down), deadline re-armed to t'+600ms
    ...                                   t'+600ms ──► Up(C4)

Holding a key makes the terminal auto-repeat the press, which keeps pushing
the deadline out, so the note sustains. Only the most recent deadline for a
key exists at any time, so a stale release can never cut a re-pressed note.

Deadlines are plain `Instant`s checked by `poll` from the event loop; they
never run on another thread.

When the terminal does report releases (kitty keyboard protocol), `key_up`
releases at once and drops the pending deadline.
*/

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::grid::{KeyEvent, KeySink};

/// Default delay before a synthetic release
pub const DEFAULT_RELEASE_AFTER: Duration = Duration::from_millis(600);

/// Physical key table: which character plays which offset from the base key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Keymap {
    /// Home row for naturals, the row above for sharps (one and a half octaves)
    #[default]
    Home,
    /// Tracker style: Z row plus the row above for one octave, Q row plus
    /// the digit row for the next
    Tracker,
}

// ┌──┬───┬┬───┬──┬──┬───┬┬───┬┬───┬──┬──┬───┬┬───┬──┐
// │  │ W ││ E │  │  │ T ││ Y ││ U │  │  │ O ││ P │  │
// │ A  │ S  │ D  │ F  │ G  │ H  │ J  │ K  │ L  │ ;  │ '
const HOME: &[(char, usize)] = &[
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
    ('o', 13),
    ('l', 14),
    ('p', 15),
    (';', 16),
    ('\'', 17),
];

const TRACKER: &[(char, usize)] = &[
    ('z', 0),
    ('s', 1),
    ('x', 2),
    ('d', 3),
    ('c', 4),
    ('v', 5),
    ('g', 6),
    ('b', 7),
    ('h', 8),
    ('n', 9),
    ('j', 10),
    ('m', 11),
    (',', 12),
    ('l', 13),
    ('.', 14),
    (';', 15),
    ('/', 16),
    ('q', 12),
    ('2', 13),
    ('w', 14),
    ('3', 15),
    ('e', 16),
    ('r', 17),
    ('5', 18),
    ('t', 19),
    ('6', 20),
    ('y', 21),
    ('7', 22),
    ('u', 23),
    ('i', 24),
    ('9', 25),
    ('o', 26),
    ('0', 27),
    ('p', 28),
    ('[', 29),
    ('=', 30),
    (']', 31),
];

impl Keymap {
    fn table(self) -> &'static [(char, usize)] {
        match self {
            Keymap::Home => HOME,
            Keymap::Tracker => TRACKER,
        }
    }

    /// Offset from the base key for a key code, case-insensitive
    pub fn offset(self, code: char) -> Option<usize> {
        let code = code.to_ascii_lowercase();
        self.table()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, offset)| offset)
    }

    /// Number of consecutive keys the table covers
    pub fn span(self) -> usize {
        self.table().iter().map(|&(_, o)| o + 1).max().unwrap_or(0)
    }

    /// Key code that plays `offset`, first match wins
    pub fn label(self, offset: usize) -> Option<char> {
        self.table()
            .iter()
            .find(|&&(_, o)| o == offset)
            .map(|&(c, _)| c.to_ascii_uppercase())
    }
}

/// Maps key codes to grid positions and emulates releases
#[derive(Debug, Clone)]
pub struct InputTranslator {
    keymap: Keymap,
    base_position: usize,
    grid_len: usize,
    release_after: Duration,
    /// The terminal reports real releases, so no deadlines are armed
    reports_releases: bool,
    /// Pending synthetic release per position
    pending: BTreeMap<usize, Instant>,
}

impl InputTranslator {
    pub fn new(keymap: Keymap, base_position: usize, grid_len: usize) -> Self {
        Self {
            keymap,
            base_position,
            grid_len,
            release_after: DEFAULT_RELEASE_AFTER,
            reports_releases: false,
            pending: BTreeMap::new(),
        }
    }

    pub fn with_release_after(mut self, release_after: Duration) -> Self {
        self.release_after = release_after;
        self
    }

    pub fn reports_releases(&self) -> bool {
        self.reports_releases
    }

    /// Switch to real key releases. Turning this on drops every pending
    /// deadline; held keys then wait for their `key_up`.
    pub fn set_reports_releases(&mut self, reports_releases: bool) {
        self.reports_releases = reports_releases;
        if reports_releases {
            self.pending.clear();
        }
    }

    pub fn keymap(&self) -> Keymap {
        self.keymap
    }

    pub fn base_position(&self) -> usize {
        self.base_position
    }

    pub fn release_after(&self) -> Duration {
        self.release_after
    }

    /// Grid position for a key code, `None` if unmapped or off the grid
    pub fn position_for(&self, code: char) -> Option<usize> {
        let position = self.base_position + self.keymap.offset(code)?;
        (position < self.grid_len).then_some(position)
    }

    /// A key press (or auto-repeat). Returns false for unmapped codes.
    pub fn key_down(&mut self, code: char, now: Instant, sink: &mut impl KeySink) -> bool {
        let Some(position) = self.position_for(code) else {
            return false;
        };

        sink.key_event(KeyEvent::Down(position));
        if !self.reports_releases {
            // Replaces any earlier deadline for this key
            self.pending.insert(position, now + self.release_after);
        }
        true
    }

    /// A real key release, when the terminal reports one
    pub fn key_up(&mut self, code: char, sink: &mut impl KeySink) -> bool {
        let Some(position) = self.position_for(code) else {
            return false;
        };

        self.pending.remove(&position);
        sink.key_event(KeyEvent::Up(position));
        true
    }

    /// Fire every synthetic release due at `now`, earliest first
    pub fn poll(&mut self, now: Instant, sink: &mut impl KeySink) -> usize {
        let mut due: Vec<(Instant, usize)> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&position, &deadline)| (deadline, position))
            .collect();
        due.sort_unstable();

        for &(_, position) in &due {
            self.pending.remove(&position);
            sink.key_event(KeyEvent::Up(position));
        }
        due.len()
    }

    /// Earliest pending deadline, for sizing the event loop's wait
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    pub fn is_pending(&self, position: usize) -> bool {
        self.pending.contains_key(&position)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop every pending release without firing it
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
