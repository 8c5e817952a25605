//! TUI module for tpiano
//!
//! Status bar, the keyboard itself, and a monitor of outgoing MIDI.

mod monitor;
pub mod state;
mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_piano::io::QueueDispatcher;
use tui_piano::view::{HitMap, KeyboardView, KEYBOARD_HEIGHT};
use tui_piano::Piano;

pub use state::{step, Controls, Monitor};

use monitor::render_monitor;
use status::render_status;

const HELP: &str = " [Esc] Quit  [↑↓] Octave  [←→] Transpose  [PgUp/PgDn] Program  \
                    [Ins] Sustain  [F1/F2] Volume  [F3/F4] Reverb  [F5/F6] Chorus";

/// Where the keyboard image landed on screen, for pointer hit tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub area: Rect,
    pub scroll: u16,
}

impl Placement {
    /// Fit a keyboard image into `inner`: centered when it fits, otherwise
    /// scrolled so the column `anchor` stays on screen
    pub fn fit(inner: Rect, image_width: u16, anchor: u16) -> Self {
        let height = KEYBOARD_HEIGHT.min(inner.height);
        if image_width <= inner.width {
            let x = inner.x + (inner.width - image_width) / 2;
            return Self {
                area: Rect::new(x, inner.y, image_width, height),
                scroll: 0,
            };
        }
        Self {
            area: Rect::new(inner.x, inner.y, inner.width, height),
            scroll: anchor.min(image_width - inner.width),
        }
    }

    pub fn hit(&self, map: &HitMap, column: u16, row: u16) -> Option<usize> {
        map.hit_in(self.area, self.scroll, column, row)
    }
}

/// Draw a frame, returning where the keyboard went
pub fn render(
    frame: &mut Frame,
    piano: &Piano<QueueDispatcher>,
    controls: &Controls,
    monitor: &Monitor,
) -> Placement {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                  // Status bar
            Constraint::Length(KEYBOARD_HEIGHT + 2), // Keyboard
            Constraint::Min(3),                     // MIDI monitor
            Constraint::Length(1),                  // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], piano, controls);

    let keyboard_block = Block::default().borders(Borders::ALL);
    let inner = keyboard_block.inner(chunks[1]);
    frame.render_widget(keyboard_block, chunks[1]);

    let map = piano.hit_map();
    let anchor = map
        .column_of(piano.translator().base_position())
        .unwrap_or(0);
    let placement = Placement::fit(inner, map.width(), anchor);
    frame.render_widget(
        KeyboardView::new(piano.grid()).scroll(placement.scroll),
        placement.area,
    );

    render_monitor(frame, chunks[2], monitor, piano.dispatcher().dropped());

    let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);

    placement
}
