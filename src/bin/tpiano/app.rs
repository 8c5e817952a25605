//! tpiano - event loop and input routing

use std::io;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;
use tui_piano::io::{PlaybackDispatcher, QueueDispatcher};
use tui_piano::{ConfigError, Piano, PianoConfig};

use super::ui::{self, step, Controls, Monitor, Placement};

/// Longest wait between frames (~60fps)
const FRAME: Duration = Duration::from_millis(16);

/// Controller change per key press
const CONTROL_STEP: i8 = 8;

pub struct App {
    piano: Piano<QueueDispatcher>,
    controls: Controls,
    monitor: Monitor,
    placement: Placement,
    should_quit: bool,
}

impl App {
    pub fn new(config: &PianoConfig) -> Result<Self, ConfigError> {
        let (dispatcher, receiver) = QueueDispatcher::new(config.queue_capacity);
        let mut piano = Piano::new(config, dispatcher)?;
        let controls = Controls::new(config.program);
        controls.send_all(piano.dispatcher_mut());

        Ok(Self {
            piano,
            controls,
            monitor: Monitor::new(receiver),
            placement: Placement::default(),
            should_quit: false,
        })
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let modes = TerminalModes::enable()?;
        self.piano.set_reports_releases(modes.reports_releases);
        tracing::info!(reports_releases = modes.reports_releases, "terminal ready");

        let outcome = self.event_loop(terminal);
        self.shut_down(outcome)
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.piano.tick(Instant::now());
            self.monitor.drain();

            terminal.draw(|frame| {
                self.placement = ui::render(frame, &self.piano, &self.controls, &self.monitor);
            })?;

            let now = Instant::now();
            if event::poll(self.wait_time(now))? {
                let event = event::read()?;
                self.handle_event(event, Instant::now());
            }
        }
        Ok(())
    }

    /// Silence every key however the loop ended, then pass the outcome on
    fn shut_down(&mut self, outcome: EyreResult<()>) -> EyreResult<()> {
        let released = self.piano.release_everything();
        match &outcome {
            Ok(()) => tracing::info!(released, "quit"),
            Err(error) => tracing::error!(released, %error, "event loop failed"),
        }
        outcome
    }

    /// Wake for the next synthetic release or the next frame, whichever is first
    fn wait_time(&self, now: Instant) -> Duration {
        self.piano
            .next_deadline()
            .map_or(FRAME, |deadline| {
                deadline.saturating_duration_since(now).min(FRAME)
            })
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => {
                self.piano.release_everything();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.kind {
            KeyEventKind::Release => {
                if let KeyCode::Char(code) = key.code {
                    self.piano.key_up(code);
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let KeyCode::Char(code) = key.code {
                    if self.piano.key_down(code, now) {
                        return;
                    }
                }
                self.handle_control(key.code);
            }
        }
    }

    /// Keys the keymap does not claim
    fn handle_control(&mut self, code: KeyCode) {
        let controls = &mut self.controls;
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => {
                self.piano.shift_octave(1);
            }
            KeyCode::Down => {
                self.piano.shift_octave(-1);
            }
            KeyCode::Right => {
                self.piano.shift_transpose(1);
            }
            KeyCode::Left => {
                self.piano.shift_transpose(-1);
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                let program = controls.step_program(code == KeyCode::PageUp);
                self.piano.dispatcher_mut().select_program(program);
            }
            KeyCode::Insert => {
                controls.sustain = !controls.sustain;
                self.piano.dispatcher_mut().set_sustain(controls.sustain_value());
            }
            KeyCode::F(n @ 1..=6) => {
                let delta = if n % 2 == 0 { CONTROL_STEP } else { -CONTROL_STEP };
                let dispatcher = self.piano.dispatcher_mut();
                match n {
                    1 | 2 => {
                        controls.volume = step(controls.volume, delta);
                        dispatcher.set_volume(controls.volume);
                    }
                    3 | 4 => {
                        controls.reverb = step(controls.reverb, delta);
                        dispatcher.set_reverb(controls.reverb);
                    }
                    _ => {
                        controls.chorus = step(controls.chorus, delta);
                        dispatcher.set_chorus(controls.chorus);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self
            .placement
            .hit(self.piano.hit_map(), mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.piano.pointer_down(hit),
            MouseEventKind::Drag(MouseButton::Left) => self.piano.pointer_drag(hit),
            MouseEventKind::Up(MouseButton::Left) => self.piano.pointer_up(),
            _ => {}
        }
    }
}

/// Mouse capture, focus reporting and (where supported) key release
/// reporting, undone on drop
struct TerminalModes {
    reports_releases: bool,
}

impl TerminalModes {
    fn enable() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnableMouseCapture, EnableFocusChange)?;

        let reports_releases = supports_keyboard_enhancement().unwrap_or(false);
        if reports_releases {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        Ok(Self { reports_releases })
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.reports_releases {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout, DisableFocusChange, DisableMouseCapture);
    }
}
