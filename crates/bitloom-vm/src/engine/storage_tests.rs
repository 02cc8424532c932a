use std::io::SeekFrom;

use bitloom_core::Bits;

use super::{BitBuffer, ErrorKind};

fn bits(text: &str) -> Bits {
    text.chars().filter(|c| !c.is_whitespace()).map(|c| c == '1').collect()
}

#[test]
fn reads_are_msb_first() {
    let mut buf = BitBuffer::from_bytes(&[0b1010_0001, 0xFF]);
    assert_eq!(buf.len(), 16);
    assert_eq!(buf.read(3).unwrap(), bits("101"));
    assert_eq!(buf.tell(), 3);
    assert_eq!(buf.read(6).unwrap(), bits("000011"));
    assert_eq!(buf.remaining(), 7);
    assert_eq!(buf.read_all(), bits("1111111"));
    assert!(buf.at_eof());
}

#[test]
fn short_reads_fail() {
    let mut buf = BitBuffer::from_bytes(&[0]);
    buf.read(5).unwrap();
    let err = buf.read(4).unwrap_err();
    assert_eq!(
        err,
        ErrorKind::IncompleteData("needed 4 bits at bit 5, only 3 available".into())
    );
    assert_eq!(buf.tell(), 5);
}

#[test]
fn seek_stays_in_bounds() {
    let mut buf = BitBuffer::from_bytes(&[0, 0]);
    assert_eq!(buf.seek(SeekFrom::End(-4)).unwrap(), 12);
    assert_eq!(buf.seek(SeekFrom::Current(-10)).unwrap(), 2);
    assert_eq!(buf.seek(SeekFrom::Start(16)).unwrap(), 16);
    assert!(buf.seek(SeekFrom::Current(1)).is_err());
    assert!(buf.seek(SeekFrom::End(-17)).is_err());
    assert_eq!(buf.tell(), 16);
}

#[test]
fn writes_overwrite_then_extend() {
    let mut buf = BitBuffer::from_bytes(&[0xFF]);
    buf.seek(SeekFrom::Start(4)).unwrap();
    buf.write(&bits("0000 1010"));
    assert_eq!(buf.len(), 12);
    assert_eq!(buf.tell(), 12);
    assert_eq!(buf.into_bytes(), [0xF0, 0xA0]);
}

#[test]
fn reverse_and_invert_in_place() {
    let mut buf = BitBuffer::from_bytes(&[0b1100_0000]);
    buf.reverse(0, 4).unwrap();
    assert_eq!(buf.as_bits(), bits("0011 0000").as_bitslice());
    buf.invert(2, 4).unwrap();
    assert_eq!(buf.as_bits(), bits("0000 1100").as_bitslice());
    assert!(matches!(buf.reverse(4, 8), Err(ErrorKind::IncompleteData(_))));
    assert_eq!(buf.tell(), 0);
}

#[test]
fn find_scans_byte_offsets() {
    let buf = BitBuffer::from_bytes(&[0x0F, 0xF0, 0xAB, 0x01, 0xAB]);
    let needle = bits("1010 1011");
    assert_eq!(buf.find(&needle, 0, false), Some(16));
    assert_eq!(buf.find(&needle, 0, true), Some(32));
    assert_eq!(buf.find(&needle, 17, false), Some(32));
    // 0xFF straddles bytes 0 and 1 and is not byte-aligned.
    assert_eq!(buf.find(&bits("1111 1111"), 0, false), None);
    assert_eq!(buf.find(&bits("1111 1111 1111 1111 1111 1111"), 32, false), None);
}

#[test]
fn into_bytes_pads_with_zeros() {
    let mut buf = BitBuffer::new();
    buf.write(&bits("111"));
    assert_eq!(buf.into_bytes(), [0xE0]);
    assert!(BitBuffer::new().into_bytes().is_empty());
}
