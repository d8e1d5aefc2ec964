use std::time::{Duration, Instant};

use term_sampler::raw::key;
use term_sampler::{Event, EventType, KeyCode, KeyPress, Modifier, RawEvent, Sampler, ESCAPE_WINDOW};

struct SampleTest {
    name: &'static str,
    input: Vec<RawEvent>,
    output: Vec<Event>,
}

fn sample_tests() -> Vec<SampleTest> {
    vec![
        SampleTest {
            name: "Resize event",
            input: vec![RawEvent::resize(80, 24)],
            output: vec![Event::Resize],
        },
        SampleTest {
            name: "Keypress event on 'a'",
            input: vec![RawEvent::rune('a')],
            output: vec![Event::Key(KeyPress::rune('a'))],
        },
        SampleTest {
            name: "Named key",
            input: vec![RawEvent::key(key::PGDN)],
            output: vec![Event::Key(KeyPress::code(KeyCode::PageDown))],
        },
        SampleTest {
            name: "Ctrl-A reports rune and code",
            input: vec![RawEvent::key(key::CTRL_A)],
            output: vec![Event::Key(KeyPress {
                modifier: Modifier::CTRL,
                rune: Some('a'),
                code: Some(KeyCode::Ctrl('a')),
            })],
        },
        SampleTest {
            name: "Unknown raw event",
            input: vec![RawEvent::Unknown],
            output: vec![Event::None],
        },
    ]
}

#[test]
fn sampler_table() {
    for (n, test) in sample_tests().into_iter().enumerate() {
        let mut sampler = Sampler::new();
        let output: Vec<Event> = test
            .input
            .into_iter()
            .flat_map(|raw| sampler.sample(raw))
            .collect();
        assert_eq!(output, test.output, "test {}: {}", n + 1, test.name);
    }
}

#[test]
fn resize_has_no_payload() {
    let mut sampler = Sampler::new();
    for (w, h) in [(1, 1), (80, 24), (300, 100)] {
        let out = sampler.sample(RawEvent::resize(w, h));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind(), EventType::Resize);
        assert_eq!(out[0].key(), None);
        assert_eq!(out[0].mouse(), None);
    }
}

#[test]
fn printable_runes_map_one_to_one() {
    let mut sampler = Sampler::new();
    for c in (' '..='~').chain(['é', 'ß', '字', '🎵']) {
        assert_eq!(
            sampler.sample(RawEvent::rune(c)),
            vec![Event::Key(KeyPress::rune(c))],
            "rune {c:?}"
        );
    }
}

#[test]
fn order_is_preserved() {
    let input: Vec<RawEvent> = (0..200u32)
        .map(|i| match i % 3 {
            0 => RawEvent::resize(10, 10),
            _ => RawEvent::rune(char::from_digit(i % 10, 10).unwrap_or('?')),
        })
        .collect();
    let expected: Vec<Event> = (0..200u32)
        .map(|i| match i % 3 {
            0 => Event::Resize,
            _ => Event::Key(KeyPress::rune(char::from_digit(i % 10, 10).unwrap_or('?'))),
        })
        .collect();

    let mut sampler = Sampler::new();
    let output: Vec<Event> = input.into_iter().flat_map(|raw| sampler.sample(raw)).collect();
    assert_eq!(output, expected);
}

#[test]
fn escape_then_rune_within_window_is_alt() {
    let start = Instant::now();
    let mut sampler = Sampler::new();
    let mut out = sampler.sample_at(RawEvent::esc(), start);
    out.extend(sampler.sample_at(RawEvent::rune('x'), start + Duration::from_millis(3)));
    assert_eq!(
        out,
        vec![Event::Key(KeyPress::rune('x').with_modifier(Modifier::ALT))]
    );
}

#[test]
fn escape_alone_is_escape_after_window() {
    let start = Instant::now();
    let mut sampler = Sampler::new();
    assert!(sampler.sample_at(RawEvent::esc(), start).is_empty());
    assert_eq!(
        sampler.expire(start + ESCAPE_WINDOW),
        vec![Event::Key(KeyPress::code(KeyCode::Escape))]
    );
}

#[test]
fn fresh_samplers_agree() {
    let start = Instant::now();
    let script = [
        (0, RawEvent::esc()),
        (2, RawEvent::rune('[')),
        (3, RawEvent::rune('B')),
        (10, RawEvent::rune('k')),
        (11, RawEvent::esc()),
        (60, RawEvent::rune('j')),
        (61, RawEvent::Paste("hi".into())),
        (62, RawEvent::resize(1, 2)),
    ];
    let run = || {
        let mut sampler = Sampler::new();
        script
            .iter()
            .flat_map(|(ms, raw)| {
                sampler.sample_at(raw.clone(), start + Duration::from_millis(*ms))
            })
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(
        first,
        vec![
            Event::Key(KeyPress::code(KeyCode::Down)),
            Event::Key(KeyPress::rune('k')),
            Event::Key(KeyPress::code(KeyCode::Escape)),
            Event::Key(KeyPress::rune('j')),
            Event::Key(KeyPress::rune('h')),
            Event::Key(KeyPress::rune('i')),
            Event::Resize,
        ]
    );
}
