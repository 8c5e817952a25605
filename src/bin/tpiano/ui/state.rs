//! UI-side state: sound controls and the outgoing MIDI log

use std::collections::VecDeque;

use rtrb::Consumer;
use tui_piano::io::{MidiEvent, MidiReceiver, PlaybackDispatcher};

/// Events kept for the monitor panel
const MONITOR_HISTORY: usize = 256;

/// Controller value sent for sustain on
const SUSTAIN_ON: u8 = 127;

/// Synth controls adjusted from the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub program: u8,
    pub sustain: bool,
    pub volume: u8,
    pub reverb: u8,
    pub chorus: u8,
}

impl Controls {
    pub fn new(program: u8) -> Self {
        Self {
            program: program.min(127),
            sustain: false,
            volume: 100,
            reverb: 0,
            chorus: 0,
        }
    }

    /// Bring the synth in line with what is displayed
    pub fn send_all(&self, dispatcher: &mut impl PlaybackDispatcher) {
        dispatcher.set_volume(self.volume);
        dispatcher.set_reverb(self.reverb);
        dispatcher.set_chorus(self.chorus);
        dispatcher.set_sustain(self.sustain_value());
    }

    pub fn sustain_value(&self) -> u8 {
        if self.sustain {
            SUSTAIN_ON
        } else {
            0
        }
    }

    /// Next or previous program, wrapping around the 128 GM programs
    pub fn step_program(&mut self, forward: bool) -> u8 {
        self.program = if forward {
            (self.program + 1) % 128
        } else {
            (self.program + 127) % 128
        };
        self.program
    }
}

/// Add `delta` to a 7-bit controller value, saturating
pub fn step(value: u8, delta: i8) -> u8 {
    (value as i16 + delta as i16).clamp(0, 127) as u8
}

/// Drains the playback queue and keeps the most recent events for display.
///
/// Nothing synthesizes sound here; the panel shows exactly what a backend
/// would receive.
pub struct Monitor {
    receiver: Consumer<MidiEvent>,
    history: VecDeque<MidiEvent>,
    received: u64,
}

impl Monitor {
    pub fn new(receiver: Consumer<MidiEvent>) -> Self {
        Self {
            receiver,
            history: VecDeque::with_capacity(MONITOR_HISTORY),
            received: 0,
        }
    }

    /// Pull everything queued since the last frame
    pub fn drain(&mut self) {
        while let Some(event) = MidiReceiver::pop(&mut self.receiver) {
            if self.history.len() == MONITOR_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(event);
            self.received += 1;
        }
    }

    /// Most recent events, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MidiEvent> {
        self.history.iter().skip(self.history.len().saturating_sub(count))
    }

    pub fn received(&self) -> u64 {
        self.received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_piano::io::QueueDispatcher;

    #[test]
    fn program_wraps() {
        let mut controls = Controls::new(127);
        assert_eq!(controls.step_program(true), 0);
        assert_eq!(controls.step_program(false), 127);
    }

    #[test]
    fn step_saturates() {
        assert_eq!(step(120, 8), 127);
        assert_eq!(step(4, -8), 0);
        assert_eq!(step(64, 8), 72);
    }

    #[test]
    fn monitor_keeps_the_tail() {
        let (mut dispatcher, consumer) = QueueDispatcher::new(8);
        let mut monitor = Monitor::new(consumer);
        for key in 60..65 {
            dispatcher.note_on(key, 100);
        }
        monitor.drain();
        let keys: Vec<u8> = monitor
            .recent(2)
            .map(|e| match e {
                MidiEvent::NoteOn { key, .. } => *key,
                _ => 0,
            })
            .collect();
        assert_eq!(keys, [63, 64]);
        assert_eq!(monitor.received(), 5);
    }
}
