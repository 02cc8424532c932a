use bitloom_bytecode::{ModKind, OffsetKind, Width};

use super::translate::{at_cursor, at_offset};
use super::{BitBuffer, Edge, ErrorKind, Transform, TranslationLog, endian_swap, pull};

fn log_of(transforms: &[Transform]) -> TranslationLog {
    let mut log = TranslationLog::new();
    for t in transforms {
        log.push(0, *t);
    }
    log
}

#[test]
fn reversal_maps_interior_boundaries() {
    let log = log_of(&[Transform::reverse(8, 16)]);
    assert_eq!(log.to_original(10, 32), 22);
    assert_eq!(log.from_original(22, 32), 10);
    // Region edges and outside positions are fixed.
    assert_eq!(log.to_original(8, 32), 8);
    assert_eq!(log.to_original(24, 32), 24);
    assert_eq!(log.to_original(30, 32), 30);
}

#[test]
fn inversion_is_transparent() {
    let log = log_of(&[Transform::invert(0, 32)]);
    assert_eq!(log.to_original(5, 32), 5);
    assert_eq!(log.from_original(5, 32), 5);
}

#[test]
fn replay_order() {
    let log = log_of(&[Transform::reverse(0, 16), Transform::reverse(0, 8)]);
    // Newest first: 3 -> 5 -> 11.
    assert_eq!(log.to_original(3, 16), 11);
    // Oldest first: 11 -> 5 -> 3.
    assert_eq!(log.from_original(11, 16), 3);
}

#[test]
fn translation_round_trips() {
    let log = log_of(&[
        Transform::reverse(0, 24),
        Transform::reverse(4, 12),
        Transform::reverse(16, 8),
    ]);
    for pos in 0..=24 {
        assert_eq!(log.from_original(log.to_original(pos, 24), 24), pos);
    }
}

#[test]
fn open_ended_regions_resolve_against_length() {
    let t = Transform::new(super::TransformKind::Reverse, 8, Width::Rest);
    assert_eq!(t.region(32), Some(8..32));
    assert_eq!(t.region(4), None);
    assert_eq!(t.to_string(), "reverse [8, $)");

    let log = log_of(&[t]);
    assert_eq!(log.to_original(10, 32), 30);
    assert_eq!(log.to_original(10, 16), 14);
}

#[test]
fn endian_swap_is_logged_as_reversals() {
    let ts = endian_swap(8, 16).unwrap();
    assert_eq!(
        ts,
        [
            Transform::reverse(8, 16),
            Transform::reverse(8, 8),
            Transform::reverse(16, 8),
        ]
    );
    let mut buf = BitBuffer::from_bytes(&[0xAA, 0x12, 0x34]);
    for t in &ts {
        buf.apply(t).unwrap();
    }
    assert_eq!(buf.into_bytes(), [0xAA, 0x34, 0x12]);

    assert!(matches!(endian_swap(0, 12), Err(ErrorKind::Alignment(_))));
}

#[test]
fn pull_moves_window_to_start() {
    let mut buf = BitBuffer::from_bytes(&[0x01, 0x02, 0x03]);
    for t in pull(0, 16, Width::Bits(8)) {
        buf.apply(&t).unwrap();
    }
    assert_eq!(buf.into_bytes(), [0x03, 0x01, 0x02]);

    let rest = pull(4, 8, Width::Rest);
    assert_eq!(rest[1].end, Edge::FromEnd(8));
    assert_eq!(rest[2].to_string(), "reverse [$-8, $)");
}

#[test]
fn modifier_helpers() {
    assert_eq!(
        at_cursor(ModKind::Invert, 4, Width::Bits(4)).unwrap(),
        [Transform::invert(4, 4)]
    );
    assert!(at_cursor(ModKind::EndianSwap, 0, Width::Rest).is_err());
    assert_eq!(
        at_offset(OffsetKind::Reverse, 8, 4, Width::Bits(8)),
        [Transform::reverse(12, 8)]
    );
    assert_eq!(at_offset(OffsetKind::Pull, 0, 8, Width::Bits(8)).len(), 3);
}
