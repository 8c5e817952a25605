//! MIDI monitor panel - the messages the playback queue has carried

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_piano::io::MidiEvent;

use super::state::Monitor;

fn event_color(event: &MidiEvent) -> Color {
    match event {
        MidiEvent::NoteOn { .. } => Color::Green,
        MidiEvent::NoteOff { .. } => Color::DarkGray,
        MidiEvent::ControlChange { .. } => Color::Cyan,
        MidiEvent::ProgramChange { .. } => Color::Yellow,
    }
}

pub fn render_monitor(frame: &mut Frame, area: Rect, monitor: &Monitor, dropped: u64) {
    let title = if dropped > 0 {
        format!(" midi out ({} sent, {} dropped) ", monitor.received(), dropped)
    } else {
        format!(" midi out ({} sent) ", monitor.received())
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let rows = block.inner(area).height as usize;

    let lines: Vec<Line> = monitor
        .recent(rows)
        .map(|event| {
            let [status, data1, data2] = event.to_bytes();
            Line::from(vec![
                Span::styled(
                    format!(" {status:02X} {data1:02X} {data2:02X}  "),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(event.to_string(), Style::default().fg(event_color(event))),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
