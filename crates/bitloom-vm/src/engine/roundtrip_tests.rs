use bitloom_compiler::compile;
use bitloom_core::Value;
use indoc::indoc;
use proptest::prelude::*;

use super::{Decoder, Encoder};

fn decode(pattern: &str, bytes: &[u8]) -> Vec<Value> {
    let program = compile(pattern).unwrap();
    match Decoder::new(bytes).decode(&program) {
        Ok(values) => values,
        Err(e) => panic!("decoding `{pattern}` failed: {e}"),
    }
}

fn encode(pattern: &str, values: Vec<Value>) -> Vec<u8> {
    let program = compile(pattern).unwrap();
    match Encoder::new(values).encode(&program) {
        Ok(bytes) => bytes,
        Err(e) => panic!("encoding `{pattern}` failed: {e}"),
    }
}

fn assert_bytes_round_trip(pattern: &str, bytes: &[u8]) {
    let values = decode(pattern, bytes);
    assert_eq!(encode(pattern, values), bytes, "pattern `{pattern}`");
}

/// Patterns that consume exactly five bytes of any content.
const FIVE_BYTE_PATTERNS: &[&str] = &[
    "u8 s8 x8 X8 b8",
    "Ry u3 s5 Iy x12 Rn b4 Ey u16",
    "p8.8 r4.12 i16 u8 u8 [u8 e16 u16]",
    "u8 jf8 u8 je8 u8",
    "r$ u4 b$",
    "u4 C16 u4 B$",
    "Ey s16 Rt u8 Et Iy C8 It u8",
    "p4.$ i$ u12 [[s12] x$]",
];

#[test]
fn marker_records() {
    assert_bytes_round_trip(r#"u8 m^"FF" u8 jf8 u8"#, &[1, 2, 3, 0xFF, 4, 5, 6]);
    assert_bytes_round_trip(r#"Iy m$"0F" B$"#, &[0xF0, 0xAB, 0xF0, 0x12]);
    assert_eq!(
        decode(r#"Iy m$"0F" B$"#, &[0xF0, 0xAB, 0xF0, 0x12]),
        vec![Value::Bytes(vec![0xF0, 0xAB]), Value::Bytes(vec![0xED])]
    );
}

#[test]
fn record_with_header_and_trailer() {
    let pattern = indoc! {r#"
        ## magic, little-endian length, payload, checksum at the end
        C16 ="BM"; Ey u32 =#"len" En
        [u8 u8 =#"kind"] B16
        je8 u8 ?#"sum"
    "#};
    let program = compile(pattern).unwrap();
    let bytes = [b'B', b'M', 9, 0, 0, 0, 1, 2, 0xAA, 0xBB, 0xCC, 0x33];
    let values = Decoder::builder(&bytes)
        .label("sum", Value::UInt(0x33))
        .build()
        .decode(&program)
        .unwrap();
    assert_eq!(
        values,
        vec![
            Value::Text("BM".into()),
            Value::UInt(9),
            Value::List(vec![Value::UInt(1), Value::UInt(2)]),
            Value::Bytes(vec![0xAA, 0xBB]),
            Value::Bytes(vec![0xCC]),
            Value::UInt(0x33),
        ]
    );
    let encoded = Encoder::builder(values)
        .label("sum", Value::UInt(0x33))
        .build()
        .encode(&program)
        .unwrap();
    assert_eq!(encoded, bytes);
}

proptest! {
    #[test]
    fn bytes_survive_decode_then_encode(
        bytes in proptest::collection::vec(any::<u8>(), 5),
        which in 0..FIVE_BYTE_PATTERNS.len(),
    ) {
        let pattern = FIVE_BYTE_PATTERNS[which];
        let values = decode(pattern, &bytes);
        prop_assert_eq!(encode(pattern, values), bytes);
    }

    #[test]
    fn values_survive_encode_then_decode(
        a in 0u128..8,
        b in -16i128..16,
        c in any::<u16>(),
        bin in "[01]{4}",
        hex in "[0-9a-f]",
        tail in proptest::collection::vec(any::<u8>(), 0..4),
        rest in any::<i64>(),
    ) {
        let head = vec![
            Value::UInt(a),
            Value::SInt(b),
            Value::UInt(c as u128),
            Value::List(vec![Value::Bin(bin), Value::Hex(hex)]),
        ];
        // The second pattern leaves a rest-width field off the byte boundary.
        let cases = [
            ("u3 s5 Ey u16 En [b4 x4] Rt B$", vec![Value::Bytes(tail)]),
            (
                "u3 s5 Ey u16 En [b4 x4] u3 Rt s$",
                vec![Value::UInt(a), Value::SInt(rest as i128)],
            ),
        ];
        for (pattern, last) in cases {
            let values = [head.clone(), last].concat();
            let bytes = encode(pattern, values.clone());
            prop_assert_eq!(decode(pattern, &bytes), values);
        }
    }

    #[test]
    fn rest_width_uints_survive_encode_then_decode(
        lead in 0u128..128,
        lead_width in 1usize..8,
        n in any::<u64>(),
    ) {
        let pattern = format!("u{lead_width} u$");
        let values = vec![Value::UInt(lead & ((1 << lead_width) - 1)), Value::UInt(n as u128)];
        let bytes = encode(&pattern, values.clone());
        prop_assert_eq!(decode(&pattern, &bytes), values);
    }
}
