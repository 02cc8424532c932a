use bitloom_core::{Colors, Encoding};

use crate::dump::{dump, width_for_count};
use crate::instruction::{
    Directive, Flag, Instruction, JumpKind, Literal, ModKind, OffsetKind, Program, Setting, Width,
};

fn program() -> Program {
    let instr = |token: &str, directive| Instruction::new(token, 0..token.len(), directive);
    Program::new(vec![
        instr(
            "u8",
            Directive::Value {
                encoding: Encoding::UInt,
                width: Width::Bits(8),
            },
        ),
        instr(
            "=#\"len\"",
            Directive::SetLabel {
                name: "len".into(),
            },
        ),
        instr("[", Directive::NestOpen),
        instr(
            "C$",
            Directive::TakeAll {
                encoding: Encoding::Char,
            },
        ),
        instr("]", Directive::NestClose),
        instr(
            "r$",
            Directive::Mod {
                kind: ModKind::Reverse,
                width: Width::Rest,
            },
        ),
        instr(
            "p4.8",
            Directive::ModOff {
                kind: OffsetKind::Pull,
                offset: 4,
                width: Width::Bits(8),
            },
        ),
        instr(
            "Et",
            Directive::ModSet {
                flag: Flag::EndianSwapAll,
                setting: Setting::Toggle,
            },
        ),
        instr(
            "=5;",
            Directive::Assertion {
                expected: Literal::Int(5),
            },
        ),
        instr(
            "m^\"abcd\"",
            Directive::MarkerStart {
                bytes: vec![0xab, 0xcd],
            },
        ),
        instr(
            "jb16",
            Directive::Jump {
                kind: JumpKind::Backward,
                bits: 16,
            },
        ),
    ])
}

#[test]
fn dump_plain() {
    insta::assert_snapshot!(dump(&program(), Colors::OFF), @r#"
     0  u8        VALUE uint 8
     1  =#"len"   SETLABEL "len"
     2  [         NESTOPEN
     3  C$        TAKEALL char
     4  ]         NESTCLOSE
     5  r$        MOD reverse $
     6  p4.8      MODOFF pull +4 8
     7  Et        MODSET endian-swap-all toggle
     8  =5;       ASSERTION 5
     9  m^"abcd"  MARKERSTART abcd
    10  jb16      JUMP backward 16
    "#);
}

#[test]
fn dump_colored_wraps_mnemonic() {
    let program = Program::new(vec![Instruction::new("]", 0..1, Directive::NestClose)]);
    assert_eq!(
        dump(&program, Colors::ON),
        "0  \x1b[2m]\x1b[0m  \x1b[34mNESTCLOSE\x1b[0m\n"
    );
}

#[test]
fn index_widths() {
    assert_eq!(width_for_count(0), 1);
    assert_eq!(width_for_count(10), 1);
    assert_eq!(width_for_count(11), 2);
}
