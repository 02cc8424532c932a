use crate::Value;
use crate::codec::{Bits, CodecError, Encoding, decode, encode, natural_width, store_uint};

fn bits(digits: &str) -> Bits {
    digits.chars().filter(|c| *c != '_').map(|c| c == '1').collect()
}

fn render(b: &Bits) -> String {
    b.iter().by_vals().map(|x| if x { '1' } else { '0' }).collect()
}

#[test]
fn decode_unsigned() {
    assert_eq!(decode(&bits("1010_0101"), Encoding::UInt), Ok(Value::UInt(165)));
    assert_eq!(decode(&bits(""), Encoding::UInt), Ok(Value::UInt(0)));
}

#[test]
fn decode_signed_twos_complement() {
    assert_eq!(decode(&bits("1111"), Encoding::SInt), Ok(Value::SInt(-1)));
    assert_eq!(decode(&bits("1000"), Encoding::SInt), Ok(Value::SInt(-8)));
    assert_eq!(decode(&bits("0111"), Encoding::SInt), Ok(Value::SInt(7)));
}

#[test]
fn decode_hex_pads_to_whole_nibbles() {
    assert_eq!(
        decode(&bits("10101"), Encoding::LowerHex),
        Ok(Value::Hex("15".into()))
    );
    assert_eq!(
        decode(&bits("1010_1011"), Encoding::UpperHex),
        Ok(Value::Hex("AB".into()))
    );
    assert_eq!(
        decode(&bits("0000_1010"), Encoding::LowerHex),
        Ok(Value::Hex("0a".into()))
    );
}

#[test]
fn decode_binary_keeps_width() {
    assert_eq!(decode(&bits("0101"), Encoding::Bin), Ok(Value::Bin("0101".into())));
}

#[test]
fn decode_bytes_and_text() {
    let pk = bits("0101_0000_0100_1011");
    assert_eq!(decode(&pk, Encoding::Bytes), Ok(Value::Bytes(vec![0x50, 0x4b])));
    assert_eq!(decode(&pk, Encoding::Char), Ok(Value::Text("PK".into())));
    assert_eq!(
        decode(&bits("1110_1001"), Encoding::Char),
        Ok(Value::Text("é".into()))
    );
}

#[test]
fn decode_float() {
    let one_and_half = store_uint(0x3fc0_0000, 32);
    assert_eq!(decode(&one_and_half, Encoding::Float), Ok(Value::Float(1.5)));
    let minus_two = store_uint((-2.0f64).to_bits() as u128, 64);
    assert_eq!(decode(&minus_two, Encoding::Float), Ok(Value::Float(-2.0)));
}

#[test]
fn decode_rejects_bad_widths() {
    assert_eq!(
        decode(&bits("1111_0000_1111"), Encoding::Bytes),
        Err(CodecError::NotByteMultiple {
            encoding: Encoding::Bytes,
            width: 12
        })
    );
    assert_eq!(
        decode(&Bits::repeat(false, 129), Encoding::UInt),
        Err(CodecError::TooWide {
            encoding: Encoding::UInt,
            width: 129
        })
    );
    assert_eq!(
        decode(&bits("0000_0000_0000_0000"), Encoding::Float),
        Err(CodecError::FloatWidth { width: 16 })
    );
}

#[test]
fn encode_unsigned_checks_range() {
    let out = encode(&Value::UInt(5), Encoding::UInt, Some(3)).unwrap();
    assert_eq!(render(&out), "101");

    let err = encode(&Value::UInt(5), Encoding::UInt, Some(2)).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { width: 2, .. }));

    let err = encode(&Value::SInt(-1), Encoding::UInt, Some(8)).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { .. }));
}

#[test]
fn encode_signed() {
    let out = encode(&Value::SInt(-1), Encoding::SInt, Some(4)).unwrap();
    assert_eq!(render(&out), "1111");
    let out = encode(&Value::SInt(-8), Encoding::SInt, Some(4)).unwrap();
    assert_eq!(render(&out), "1000");
    let out = encode(&Value::UInt(3), Encoding::SInt, Some(4)).unwrap();
    assert_eq!(render(&out), "0011");

    let err = encode(&Value::SInt(8), Encoding::SInt, Some(4)).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { width: 4, .. }));
}

#[test]
fn natural_widths() {
    assert_eq!(natural_width(&Value::UInt(5), Encoding::UInt), Ok(3));
    assert_eq!(natural_width(&Value::UInt(0), Encoding::UInt), Ok(1));
    assert_eq!(natural_width(&Value::SInt(-1), Encoding::SInt), Ok(1));
    assert_eq!(natural_width(&Value::SInt(1), Encoding::SInt), Ok(2));
    assert_eq!(natural_width(&Value::SInt(-2), Encoding::SInt), Ok(2));
    assert_eq!(natural_width(&Value::Hex("abc".into()), Encoding::LowerHex), Ok(12));
    assert_eq!(natural_width(&Value::Text("PK".into()), Encoding::Char), Ok(16));
    assert_eq!(natural_width(&Value::Float(0.5), Encoding::Float), Ok(64));
}

#[test]
fn encode_hex_trims_only_zero_bits() {
    let out = encode(&Value::Hex("0f".into()), Encoding::LowerHex, Some(5)).unwrap();
    assert_eq!(render(&out), "01111");

    let out = encode(&Value::Text("F".into()), Encoding::UpperHex, Some(8)).unwrap();
    assert_eq!(render(&out), "00001111");

    let err = encode(&Value::Hex("ff".into()), Encoding::LowerHex, Some(5)).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { .. }));

    let err = encode(&Value::Hex("fg".into()), Encoding::LowerHex, None).unwrap_err();
    assert!(matches!(err, CodecError::InvalidDigits { .. }));
}

#[test]
fn encode_bin() {
    let out = encode(&Value::Bin("101".into()), Encoding::Bin, Some(5)).unwrap();
    assert_eq!(render(&out), "00101");

    let err = encode(&Value::Bin("102".into()), Encoding::Bin, None).unwrap_err();
    assert!(matches!(err, CodecError::InvalidDigits { .. }));
}

#[test]
fn encode_bytes_accepts_hex_text_and_lists() {
    let expected = encode(&Value::Bytes(vec![0xab, 0xcd]), Encoding::Bytes, Some(16)).unwrap();
    assert_eq!(render(&expected), "1010101111001101");

    let from_text = encode(&Value::Text("abcd".into()), Encoding::Bytes, None).unwrap();
    assert_eq!(from_text, expected);

    let list = Value::List(vec![Value::UInt(0xab), Value::UInt(0xcd)]);
    assert_eq!(encode(&list, Encoding::Bytes, Some(16)).unwrap(), expected);

    let err = encode(&Value::Bytes(vec![1, 2, 3]), Encoding::Bytes, Some(16)).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { width: 16, .. }));
}

#[test]
fn encode_text_is_latin1() {
    let out = encode(&Value::Text("é".into()), Encoding::Char, Some(8)).unwrap();
    assert_eq!(render(&out), "11101001");

    assert_eq!(
        encode(&Value::Text("€".into()), Encoding::Char, None),
        Err(CodecError::NotLatin1 { ch: '€' })
    );
}

#[test]
fn encode_float() {
    let out = encode(&Value::Float(1.5), Encoding::Float, Some(32)).unwrap();
    assert_eq!(out, store_uint(0x3fc0_0000, 32));

    assert_eq!(
        encode(&Value::Float(1.5), Encoding::Float, Some(16)),
        Err(CodecError::FloatWidth { width: 16 })
    );
}

#[test]
fn incompatible_kinds() {
    assert_eq!(
        encode(&Value::Text("x".into()), Encoding::UInt, Some(8)),
        Err(CodecError::Incompatible {
            encoding: Encoding::UInt,
            kind: "text"
        })
    );
}
