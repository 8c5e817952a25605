//! Piano - the keyboard grid wired to both input paths
//!
//! Owns the grid, the key-code translator, the pointer drag state and the
//! play settings, and routes every input through one place so that all of
//! it happens on the caller's event loop.

use std::time::Instant;

use crate::config::{ConfigError, PianoConfig};
use crate::grid::KeyboardGrid;
use crate::input::{InputTranslator, PointerDragController};
use crate::io::PlaybackDispatcher;
use crate::note::PlaySettings;
use crate::view::HitMap;

pub struct Piano<D: PlaybackDispatcher> {
    grid: KeyboardGrid<D>,
    keys: InputTranslator,
    pointer: PointerDragController,
    hit_map: HitMap,
    settings: PlaySettings,
}

impl<D: PlaybackDispatcher> Piano<D> {
    /// Build from a configuration and select its program on the dispatcher
    pub fn new(config: &PianoConfig, mut dispatcher: D) -> Result<Self, ConfigError> {
        let layout = config.layout()?;
        dispatcher.select_program(config.program);

        let keys = InputTranslator::new(config.keymap, config.keymap_base(), layout.len())
            .with_release_after(config.release_after());
        let hit_map = HitMap::new(&layout);
        let grid = KeyboardGrid::new(layout, dispatcher).with_velocity(config.velocity);

        tracing::debug!(
            keys = grid.layout().len(),
            keymap = ?config.keymap,
            release_after_ms = config.release_after_ms,
            "piano ready"
        );

        Ok(Self {
            grid,
            keys,
            pointer: PointerDragController::new(),
            hit_map,
            settings: config.settings,
        })
    }

    pub fn grid(&self) -> &KeyboardGrid<D> {
        &self.grid
    }

    pub fn translator(&self) -> &InputTranslator {
        &self.keys
    }

    pub fn pointer(&self) -> &PointerDragController {
        &self.pointer
    }

    pub fn hit_map(&self) -> &HitMap {
        &self.hit_map
    }

    pub fn settings(&self) -> &PlaySettings {
        &self.settings
    }

    pub fn dispatcher(&self) -> &D {
        self.grid.dispatcher()
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        self.grid.dispatcher_mut()
    }

    /// Shift the octave setting. Held notes keep sounding at their old pitch.
    pub fn shift_octave(&mut self, delta: i8) -> bool {
        self.settings.shift_octave(delta)
    }

    pub fn shift_transpose(&mut self, delta: i8) -> bool {
        self.settings.shift_transpose(delta)
    }

    /// The terminal reports real key releases from now on
    pub fn set_reports_releases(&mut self, reports_releases: bool) {
        self.keys.set_reports_releases(reports_releases);
    }

    /// Key press or auto-repeat from the terminal
    pub fn key_down(&mut self, code: char, now: Instant) -> bool {
        self.keys
            .key_down(code, now, &mut self.grid.sink(&self.settings))
    }

    /// Key release, on terminals that report them
    pub fn key_up(&mut self, code: char) -> bool {
        self.keys.key_up(code, &mut self.grid.sink(&self.settings))
    }

    /// Fire synthetic releases that are due
    pub fn tick(&mut self, now: Instant) -> usize {
        self.keys.poll(now, &mut self.grid.sink(&self.settings))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.keys.next_deadline()
    }

    /// Button pressed over grid position `hit` (`None` if not over a key)
    pub fn pointer_down(&mut self, hit: Option<usize>) {
        let key = hit.and_then(|p| self.grid.key(p)).cloned();
        self.pointer
            .pointer_down(key.as_ref(), &mut self.grid.sink(&self.settings));
    }

    /// Pointer dragged to `hit`; `None` means it left the keyboard
    pub fn pointer_drag(&mut self, hit: Option<usize>) {
        let key = hit.and_then(|p| self.grid.key(p)).cloned();
        self.pointer
            .pointer_moved(key.as_ref(), &mut self.grid.sink(&self.settings));
    }

    pub fn pointer_up(&mut self) {
        self.pointer.pointer_up(&mut self.grid.sink(&self.settings));
    }

    /// Focus lost or shutting down: nothing may stay sounding.
    /// Returns how many keys were released.
    pub fn release_everything(&mut self) -> usize {
        self.keys.cancel_all();
        self.pointer.reset();
        let released = self.grid.release_all();
        if released > 0 {
            tracing::debug!(released, "released all keys");
        }
        released
    }
}
