use std::time::{Duration, Instant};

use tui_piano::input::Keymap;
use tui_piano::io::MidiEvent;
#[cfg(feature = "rtrb")]
use tui_piano::io::{MidiReceiver, QueueDispatcher};
use tui_piano::render::UPPER_HEIGHT;
use tui_piano::{Piano, PianoConfig};

/// Note-ons as `(true, key)` and note-offs as `(false, key)`, other messages skipped
fn notes(events: &[MidiEvent]) -> Vec<(bool, u8)> {
    events
        .iter()
        .filter_map(|event| match *event {
            MidiEvent::NoteOn { key, .. } => Some((true, key)),
            MidiEvent::NoteOff { key, .. } => Some((false, key)),
            _ => None,
        })
        .collect()
}

fn piano() -> Piano<Vec<MidiEvent>> {
    Piano::new(&PianoConfig::default(), Vec::new()).unwrap()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn dragging_across_naturals_hands_off_between_keys() {
    let mut piano = piano();
    let row = UPPER_HEIGHT + 1;
    let c3 = piano.hit_map().hit(0, row);
    let d3 = piano.hit_map().hit(5, row);
    let e3 = piano.hit_map().hit(10, row);

    piano.pointer_down(c3);
    piano.pointer_drag(c3);
    piano.pointer_drag(d3);
    piano.pointer_drag(e3);
    piano.pointer_up();

    assert_eq!(
        notes(piano.dispatcher()),
        [(true, 48), (true, 50), (false, 48), (true, 52), (false, 50), (false, 52)]
    );
    assert_eq!(piano.grid().pressed().count(), 0);
}

#[test]
fn drag_from_a_sharp_only_picks_up_sharps() {
    let mut piano = piano();
    piano.pointer_down(Some(1)); // C#3
    piano.pointer_drag(Some(2)); // D3
    piano.pointer_drag(Some(4)); // E3
    piano.pointer_drag(Some(6)); // F#3
    piano.pointer_up();

    assert_eq!(notes(piano.dispatcher()), [(true, 49), (false, 49), (true, 54), (false, 54)]);
}

#[test]
fn auto_repeat_keeps_a_note_sounding() {
    let config = PianoConfig {
        release_after_ms: 300,
        ..PianoConfig::default()
    };
    let mut piano = Piano::new(&config, Vec::new()).unwrap();
    let t0 = Instant::now();

    // Terminal auto-repeat every 100ms for half a second
    for i in 0..=5 {
        piano.key_down('a', t0 + ms(i * 100));
        assert_eq!(piano.tick(t0 + ms(i * 100 + 50)), 0);
    }
    assert_eq!(notes(piano.dispatcher()), [(true, 60)]);

    assert_eq!(piano.tick(t0 + ms(799)), 0);
    assert_eq!(piano.tick(t0 + ms(800)), 1);
    assert_eq!(notes(piano.dispatcher()), [(true, 60), (false, 60)]);
}

#[test]
fn focus_loss_silences_everything() {
    let mut piano = piano();
    let t0 = Instant::now();
    for code in ['a', 'e', 'g'] {
        piano.key_down(code, t0);
    }
    piano.pointer_down(Some(40));

    assert_eq!(piano.release_everything(), 4);
    assert_eq!(piano.next_deadline(), None);
    assert_eq!(piano.tick(t0 + Duration::from_secs(5)), 0);

    let events = notes(piano.dispatcher());
    let ons = events.iter().filter(|(on, _)| *on).count();
    let offs = events.iter().filter(|(on, _)| !*on).count();
    assert_eq!((ons, offs), (4, 4));

    // A late drag without a new button press does nothing
    piano.pointer_drag(Some(41));
    assert_eq!(notes(piano.dispatcher()).len(), 8);
}

#[test]
fn settings_apply_at_dispatch_time() {
    let mut piano = piano();
    let t0 = Instant::now();

    piano.key_down('a', t0);
    piano.shift_octave(1);
    piano.shift_transpose(2);
    // The held note is closed at the pitch it started on
    piano.tick(t0 + Duration::from_secs(1));
    piano.key_down('a', t0 + Duration::from_secs(2));

    assert_eq!(notes(piano.dispatcher()), [(true, 60), (false, 60), (true, 74)]);
}

#[test]
fn one_pitch_sounds_once_across_positions() {
    let mut piano = piano();
    piano.pointer_down(Some(12)); // C4 = 60
    piano.shift_octave(-1);
    piano.key_down('k', Instant::now()); // C5 shifted down to 60
    piano.pointer_up();

    assert_eq!(notes(piano.dispatcher()), [(true, 60), (false, 60)]);
    assert!(!piano.grid().is_pressed(24));
}

#[test]
fn tracker_keymap_spans_two_octaves() {
    let config = PianoConfig {
        keymap: Keymap::Tracker,
        keymap_octave: 0,
        ..PianoConfig::default()
    };
    let mut piano = Piano::new(&config, Vec::new()).unwrap();
    let t0 = Instant::now();
    for code in ['z', 's', 'q', 'i'] {
        assert!(piano.key_down(code, t0));
    }
    assert!(!piano.key_down('a', t0));

    assert_eq!(notes(piano.dispatcher()), [(true, 48), (true, 49), (true, 60), (true, 72)]);
}

#[test]
fn reported_key_ups_release_immediately() {
    let mut piano = piano();
    piano.set_reports_releases(true);
    let t0 = Instant::now();

    piano.key_down('a', t0);
    assert_eq!(piano.next_deadline(), None);
    assert_eq!(piano.tick(t0 + Duration::from_secs(3)), 0);
    assert_eq!(notes(piano.dispatcher()), [(true, 60)]);

    piano.key_up('A');
    assert_eq!(notes(piano.dispatcher()), [(true, 60), (false, 60)]);
}

#[cfg(feature = "rtrb")]
#[test]
fn queue_carries_midi_bytes_to_the_backend() {
    let config = PianoConfig {
        program: 19,
        ..PianoConfig::default()
    };
    let (dispatcher, mut receiver) = QueueDispatcher::new(config.queue_capacity);
    let mut piano = Piano::new(&config, dispatcher).unwrap();

    piano.pointer_down(Some(12));
    piano.pointer_up();

    let mut bytes = Vec::new();
    while let Some(event) = MidiReceiver::pop(&mut receiver) {
        bytes.push(event.to_bytes());
    }
    assert_eq!(bytes, [[0xC0, 19, 0], [0x90, 60, 100], [0x80, 60, 0]]);
    assert_eq!(piano.dispatcher().dropped(), 0);
}

#[cfg(feature = "rtrb")]
#[test]
fn full_queue_drops_instead_of_blocking() {
    let (dispatcher, _receiver) = QueueDispatcher::new(2);
    let mut piano = Piano::new(&PianoConfig::default(), dispatcher).unwrap();

    // Program change plus two notes fill the queue
    piano.pointer_down(Some(0));
    piano.pointer_drag(Some(2));
    piano.pointer_drag(Some(4));
    piano.pointer_up();

    assert!(piano.dispatcher().dropped() > 0);
    assert_eq!(piano.grid().pressed().count(), 0);
}
