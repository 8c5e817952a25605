//! Playback dispatch - the narrow interface to whatever makes the sound
//!
//! Every call is fire-and-forget. Nothing here returns an error or waits on
//! the backend, so a slow or missing sound engine can never stall input
//! handling.

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use super::midi::{MidiEvent, CC_CHORUS, CC_REVERB, CC_SUSTAIN, CC_VOLUME};

/// Default velocity for keyboard and pointer presses
pub const DEFAULT_VELOCITY: u8 = 100;

pub trait PlaybackDispatcher {
    fn note_on(&mut self, note: u8, velocity: u8);
    fn note_off(&mut self, note: u8);
    fn select_program(&mut self, program: u8);
    fn control_change(&mut self, controller: u8, value: u8);

    fn set_sustain(&mut self, value: u8) {
        self.control_change(CC_SUSTAIN, value);
    }

    fn set_volume(&mut self, value: u8) {
        self.control_change(CC_VOLUME, value);
    }

    fn set_reverb(&mut self, value: u8) {
        self.control_change(CC_REVERB, value);
    }

    fn set_chorus(&mut self, value: u8) {
        self.control_change(CC_CHORUS, value);
    }
}

impl<D: PlaybackDispatcher + ?Sized> PlaybackDispatcher for &mut D {
    fn note_on(&mut self, note: u8, velocity: u8) {
        (**self).note_on(note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        (**self).note_off(note);
    }

    fn select_program(&mut self, program: u8) {
        (**self).select_program(program);
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        (**self).control_change(controller, value);
    }
}

/// Records every call on channel 0. Handy for tests and offline capture.
impl PlaybackDispatcher for Vec<MidiEvent> {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.push(MidiEvent::NoteOn { channel: 0, key: note, velocity });
    }

    fn note_off(&mut self, note: u8) {
        self.push(MidiEvent::NoteOff { channel: 0, key: note, velocity: 0 });
    }

    fn select_program(&mut self, program: u8) {
        self.push(MidiEvent::ProgramChange { channel: 0, program });
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        self.push(MidiEvent::ControlChange { channel: 0, controller, value });
    }
}

/// Something the backend drains MIDI events from
pub trait MidiReceiver {
    fn pop(&mut self) -> Option<MidiEvent>;
}

#[cfg(feature = "rtrb")]
impl MidiReceiver for Consumer<MidiEvent> {
    fn pop(&mut self) -> Option<MidiEvent> {
        Consumer::pop(self).ok()
    }
}

/// Lock-free dispatcher over a single-producer ring buffer.
///
/// When the backend falls behind and the ring is full, new messages are
/// dropped (and counted) instead of blocking the caller. Every note the
/// backend has been told to start keeps one slot reserved for its note-off,
/// so a full ring can cost a note its attack but never leaves it hanging.
#[cfg(feature = "rtrb")]
pub struct QueueDispatcher {
    producer: Producer<MidiEvent>,
    channel: u8,
    dropped: u64,
    /// Bit per key whose note-on went out without a note-off yet
    sounding: u128,
}

#[cfg(feature = "rtrb")]
impl QueueDispatcher {
    /// Create a dispatcher and the consumer end for the backend
    pub fn new(capacity: usize) -> (Self, Consumer<MidiEvent>) {
        let (producer, consumer) = RingBuffer::new(capacity);
        let dispatcher = Self {
            producer,
            channel: 0,
            dropped: 0,
            sounding: 0,
        };
        (dispatcher, consumer)
    }

    /// Send on another MIDI channel (0-15)
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0f;
        self
    }

    /// Messages lost to a full queue so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Slots held back for note-offs of sounding notes
    pub fn reserved(&self) -> usize {
        self.sounding.count_ones() as usize
    }

    /// Push if the ring keeps `extra` slots free beyond the reserve
    fn send(&mut self, event: MidiEvent, extra: usize) -> bool {
        let event = if self.producer.slots() > self.reserved() + extra {
            match self.producer.push(event) {
                Ok(()) => return true,
                Err(PushError::Full(event)) => event,
            }
        } else {
            event
        };
        self.dropped += 1;
        tracing::warn!(%event, dropped = self.dropped, "playback queue full, dropping message");
        false
    }
}

#[cfg(feature = "rtrb")]
impl PlaybackDispatcher for QueueDispatcher {
    fn note_on(&mut self, note: u8, velocity: u8) {
        let channel = self.channel;
        let bit = 1u128 << (note & 0x7f);
        // A fresh note needs room for itself and for its own note-off
        let extra = (self.sounding & bit == 0) as usize;
        if self.send(MidiEvent::NoteOn { channel, key: note, velocity }, extra) {
            self.sounding |= bit;
        }
    }

    fn note_off(&mut self, note: u8) {
        let channel = self.channel;
        let bit = 1u128 << (note & 0x7f);
        let event = MidiEvent::NoteOff { channel, key: note, velocity: 0 };
        if self.sounding & bit != 0 {
            // Give the reserved slot back, then use it
            self.sounding &= !bit;
            if !self.send(event, 0) {
                self.sounding |= bit;
            }
        } else {
            self.send(event, 0);
        }
    }

    fn select_program(&mut self, program: u8) {
        let channel = self.channel;
        self.send(MidiEvent::ProgramChange { channel, program }, 0);
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        let channel = self.channel;
        self.send(MidiEvent::ControlChange { channel, controller, value }, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_map_to_controllers() {
        let mut log: Vec<MidiEvent> = Vec::new();
        log.set_sustain(127);
        log.set_volume(100);
        log.set_reverb(20);
        log.set_chorus(0);

        let controllers: Vec<u8> = log
            .iter()
            .map(|e| match e {
                MidiEvent::ControlChange { controller, .. } => *controller,
                _ => panic!("unexpected {:?}", e),
            })
            .collect();
        assert_eq!(controllers, [64, 7, 91, 93]);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn queue_delivers_in_order() {
        let (mut dispatcher, mut consumer) = QueueDispatcher::new(8);
        dispatcher.note_on(60, 100);
        dispatcher.note_off(60);

        assert_eq!(
            MidiReceiver::pop(&mut consumer),
            Some(MidiEvent::NoteOn { channel: 0, key: 60, velocity: 100 })
        );
        assert_eq!(
            MidiReceiver::pop(&mut consumer),
            Some(MidiEvent::NoteOff { channel: 0, key: 60, velocity: 0 })
        );
        assert_eq!(MidiReceiver::pop(&mut consumer), None);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn full_queue_drops_without_blocking() {
        let (dispatcher, mut consumer) = QueueDispatcher::new(2);
        let mut dispatcher = dispatcher.with_channel(3);
        for note in 60..65 {
            dispatcher.note_on(note, 100);
        }
        // One note-on plus the slot held for its note-off
        assert_eq!(dispatcher.dropped(), 4);
        assert_eq!(dispatcher.reserved(), 1);

        let first = MidiReceiver::pop(&mut consumer);
        assert_eq!(first, Some(MidiEvent::NoteOn { channel: 3, key: 60, velocity: 100 }));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn note_offs_always_fit_a_stalled_queue() {
        let (mut dispatcher, mut consumer) = QueueDispatcher::new(6);
        for note in 60..66 {
            dispatcher.note_on(note, 100);
        }
        // Only three note-ons fit next to their reserved note-offs
        assert_eq!(dispatcher.reserved(), 3);
        dispatcher.set_volume(90);
        dispatcher.select_program(4);

        for note in 60..66 {
            dispatcher.note_off(note);
        }
        assert_eq!(dispatcher.reserved(), 0);

        let mut ons = Vec::new();
        let mut offs = Vec::new();
        while let Some(event) = MidiReceiver::pop(&mut consumer) {
            match event {
                MidiEvent::NoteOn { key, .. } => ons.push(key),
                MidiEvent::NoteOff { key, .. } => offs.push(key),
                _ => panic!("unexpected {:?}", event),
            }
        }
        assert_eq!(ons, [60, 61, 62]);
        assert_eq!(offs, [60, 61, 62]);
    }
}
