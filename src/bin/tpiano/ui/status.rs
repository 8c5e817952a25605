//! Status bar widget - play settings and synth controls

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_piano::input::Keymap;
use tui_piano::io::instruments::instrument_name;
use tui_piano::io::QueueDispatcher;
use tui_piano::Piano;

use super::state::Controls;

pub fn render_status(frame: &mut Frame, area: Rect, piano: &Piano<QueueDispatcher>, controls: &Controls) {
    let block = Block::default().title(" tpiano ").borders(Borders::ALL);

    let settings = piano.settings();
    let keys = piano.translator();
    let keymap = match keys.keymap() {
        Keymap::Home => "home",
        Keymap::Tracker => "tracker",
    };
    let release = if keys.reports_releases() {
        "key-up".to_string()
    } else {
        format!("{}ms", keys.release_after().as_millis())
    };
    let (sustain, sustain_color) = if controls.sustain {
        ("on ", Color::Green)
    } else {
        ("off", Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Octave {:+}  Transpose {:+}  ", settings.octave(), settings.transpose()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "{:03} {}  ",
                controls.program,
                instrument_name(controls.program).unwrap_or("?")
            ),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("Sustain "),
        Span::styled(sustain, Style::default().fg(sustain_color)),
        Span::styled(
            format!(
                "  Vol {:3}  Rev {:3}  Cho {:3}  ",
                controls.volume, controls.reverb, controls.chorus
            ),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("{keymap} keys, release {release}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
