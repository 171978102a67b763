//! Macro queue and ASCII translation tests

use touch_hid_panel::ascii::{self, expand, to_ascii, translate, translatable_len};
use touch_hid_panel::hid::KeyboardUsage::*;
use touch_hid_panel::hid::{usage_id, Modifiers};
use touch_hid_panel::{KeyEvent, MacroQueue};

#[test]
fn test_printable_ascii_round_trips() {
    for b in 0x20u8..0x7F {
        let c = char::from(b);
        let (modifier, keycode) = translate(c).unwrap_or_else(|| panic!("{:?} has no key", c));
        assert_eq!(to_ascii(modifier, keycode), Some(c), "round trip of {:?}", c);
    }
}

#[test]
fn test_shifted_characters() {
    assert_eq!(translate('A'), Some((Modifiers::LEFT_SHIFT, usage_id(KeyboardAa))));
    assert_eq!(translate('a'), Some((Modifiers::empty(), usage_id(KeyboardAa))));
    assert_eq!(translate('!'), Some((Modifiers::LEFT_SHIFT, usage_id(Keyboard1Exclamation))));
    assert_eq!(translate('@'), Some((Modifiers::LEFT_SHIFT, usage_id(Keyboard2At))));
    assert_eq!(translate('?'), Some((Modifiers::LEFT_SHIFT, usage_id(KeyboardSlashQuestion))));
}

#[test]
fn test_control_and_non_ascii() {
    assert_eq!(translate('\n'), Some((Modifiers::empty(), usage_id(KeyboardEnter))));
    assert_eq!(translate('\t'), Some((Modifiers::empty(), usage_id(KeyboardTab))));
    assert_eq!(translate('\r'), None);
    assert_eq!(translate('é'), None);
    assert_eq!(translate('€'), None);
}

#[test]
fn test_expand_skips_unsupported() {
    let events: Vec<KeyEvent> = expand("a€b").collect();
    assert_eq!(events, vec![KeyEvent::key(KeyboardAa), KeyEvent::key(KeyboardBb)]);
    assert_eq!(translatable_len("a\rb"), 2);
}

#[test]
fn test_const_expansion_matches_runtime() {
    const EVENTS: [KeyEvent; 5] = ascii::text_events("Hi 5!");
    let runtime: Vec<KeyEvent> = expand("Hi 5!").collect();
    assert_eq!(EVENTS.as_slice(), runtime.as_slice());
}

#[test]
fn test_queue_keeps_one_slot_free() {
    let queue = MacroQueue::<8>::new();
    assert_eq!(queue.capacity(), 7);

    for _ in 0..7 {
        queue.enqueue(KeyEvent::key(KeyboardAa));
    }
    assert!(queue.is_full());
    assert_eq!(queue.dropped(), 0);

    queue.enqueue(KeyEvent::key(KeyboardBb));
    assert_eq!(queue.len(), 7);
    assert_eq!(queue.dropped(), 1);

    // The refused event never shows up
    while let Some(event) = queue.dequeue() {
        assert_eq!(event.keycode, usage_id(KeyboardAa));
    }
    assert!(queue.is_empty());
}

#[test]
fn test_queue_fifo_across_wraparound() {
    let queue = MacroQueue::<4>::new();
    let mut expected = Vec::new();
    let mut seen = Vec::new();

    for round in 0u8..10 {
        let event = KeyEvent::new(Modifiers::empty(), usage_id(KeyboardAa) + round, 0);
        queue.enqueue(event);
        expected.push(event);
        if round % 2 == 1 {
            while let Some(e) = queue.dequeue() {
                seen.push(e);
            }
        }
    }
    assert_eq!(seen, expected);
    assert_eq!(queue.head(), queue.tail());
}

#[test]
fn test_queue_threads() {
    use std::sync::Arc;

    let queue: Arc<MacroQueue<16>> = Arc::new(MacroQueue::new());
    let producer = {
        let queue = Arc::clone(&queue);
        std::thread::spawn(move || {
            for i in 0..1000u32 {
                let event = KeyEvent::delay(i + 1);
                while queue.is_full() {
                    std::thread::yield_now();
                }
                queue.enqueue(event);
            }
        })
    };

    let mut next = 1;
    while next <= 1000 {
        if let Some(event) = queue.dequeue() {
            assert_eq!(event.delay_ms, next);
            next += 1;
        } else {
            std::thread::yield_now();
        }
    }

    producer.join().expect("producer panicked");
    assert_eq!(queue.dropped(), 0);
}
