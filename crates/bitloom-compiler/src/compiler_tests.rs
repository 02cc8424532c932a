use bitloom_bytecode::{Directive, Literal, Width};
use bitloom_core::Encoding;
use indoc::indoc;

use crate::compile;
use crate::error::CompileError;
use crate::test_utils::{compile_err, dump_valid};

#[test]
fn repetition_expands_in_place() {
    insta::assert_snapshot!(dump_valid("Ey u16 {b1}3 =5;"), @r#"
    0  Ey   MODSET endian-swap-all set
    1  u16  VALUE uint 16
    2  b1   VALUE bin 1
    3  b1   VALUE bin 1
    4  b1   VALUE bin 1
    5  =5;  ASSERTION 5
    "#);
}

#[test]
fn nested_repetition() {
    insta::assert_snapshot!(dump_valid("{ u4 { x4 }2 }2"), @r#"
    0  u4  VALUE uint 4
    1  x4  VALUE hex 4
    2  x4  VALUE hex 4
    3  u4  VALUE uint 4
    4  x4  VALUE hex 4
    5  x4  VALUE hex 4
    "#);
}

#[test]
fn labels_markers_and_jumps() {
    let pattern = indoc! {r#"
        #"tag" = "BM";
        C16 ?#"tag"
        m$"FF00" jf8 B$
    "#};
    insta::assert_snapshot!(dump_valid(pattern), @r#"
    0  #"tag" = "BM";  DEFLABEL "tag" = "BM"
    1  C16             VALUE char 16
    2  ?#"tag"         MATCHLABEL "tag"
    3  m$"FF00"        MARKEREND ff00
    4  jf8             JUMP forward 8
    5  B$              TAKEALL bytes
    "#);
}

#[test]
fn modifiers_fills_and_nesting() {
    let pattern = "r4.$ i8 e16 p0.4 Rt In ## settings\n n4 o2 _2 [u$]";
    insta::assert_snapshot!(dump_valid(pattern), @r#"
     0  r4.$  MODOFF reverse +4 $
     1  i8    MOD invert 8
     2  e16   MOD endian-swap 16
     3  p0.4  MODOFF pull +0 4
     4  Rt    MODSET reverse-all toggle
     5  In    MODSET invert-all clear
     6  n4    ZEROS 4
     7  o2    ONES 2
     8  _2    NEXT 2
     9  [     NESTOPEN
    10  u$    VALUE uint $
    11  ]     NESTCLOSE
    "#);
}

#[test]
fn empty_pattern_compiles_to_empty_program() {
    assert!(compile("").unwrap().is_empty());
    assert!(compile("  ## nothing here").unwrap().is_empty());
    assert!(compile("{u8}0").unwrap().is_empty());
}

#[test]
fn rest_width_fields() {
    let program = compile("C$ B$ x$ f$").unwrap();
    let directives: Vec<_> = program.into_iter().map(|i| i.directive.clone()).collect();
    assert_eq!(
        directives,
        vec![
            Directive::TakeAll {
                encoding: Encoding::Char
            },
            Directive::TakeAll {
                encoding: Encoding::Bytes
            },
            Directive::Value {
                encoding: Encoding::LowerHex,
                width: Width::Rest
            },
            Directive::Value {
                encoding: Encoding::Float,
                width: Width::Rest
            },
        ]
    );
}

#[test]
fn number_literals() {
    let literal = |pattern: &str| match compile(pattern).unwrap().get(0).map(|i| &i.directive) {
        Some(Directive::Assertion { expected }) => expected.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(literal("= -0x1F;"), Literal::Int(-31));
    assert_eq!(literal("=0XfF;"), Literal::Int(255));
    assert_eq!(literal("= -2.5;"), Literal::Float(-2.5));
    assert_eq!(literal(r#"= "abc";"#), Literal::Str("abc".into()));
}

#[test]
fn instructions_keep_source_spans() {
    let pattern = "u8  #\"n\" = 3;";
    let program = compile(pattern).unwrap();
    assert_eq!(program.get(1).unwrap().span, 4..13);
    assert_eq!(program.get(1).unwrap().token, "#\"n\" = 3;");
}

#[test]
fn invalid_widths() {
    let message = |pattern: &str| match compile_err(pattern) {
        CompileError::Parse { message, .. } => message,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(message("C12"), "char width must be a multiple of 8, got 12");
    assert_eq!(message("B3"), "bytes width must be a multiple of 8, got 3");
    assert_eq!(message("f16"), "float width must be 32 or 64, got 16");
    assert_eq!(message("u129"), "uint width must be at most 128, got 129");
    assert_eq!(message("e12"), "endian swap width must be a multiple of 8, got 12");
    assert_eq!(message("u0"), "width must be greater than zero");
    assert_eq!(message("p4.0"), "width must be greater than zero");
    assert_eq!(message("u99999999999999999999999"), "number out of range");
}

#[test]
fn invalid_qualifiers() {
    let err = compile_err("u8 Rx");
    assert_eq!(
        err.to_string(),
        "parse error: unknown setting qualifier `x`, expected y, n or t at `Rx`"
    );
    assert_eq!(err.span(), 3..5);

    let err = compile_err("jq4");
    assert_eq!(
        err.to_string(),
        "parse error: unknown jump qualifier `q`, expected s, f, b or e at `jq4`"
    );
    assert_eq!(
        compile_err("jf").to_string(),
        "parse error: jump needs a bit count at `jf`"
    );
}

#[test]
fn invalid_markers_and_labels() {
    for pattern in [r#"m^"""#, r#"m^"abc""#, r#"m$"zz""#] {
        assert!(matches!(compile_err(pattern), CompileError::Parse { .. }), "{pattern}");
    }
    assert_eq!(
        compile_err(r#"=#"""#).to_string(),
        r#"parse error: label name cannot be empty at `=#""`"#
    );
}

#[test]
fn assertion_syntax() {
    assert_eq!(
        compile_err("u8 =").to_string(),
        "parse error: expected a literal after `=` at ``"
    );
    assert_eq!(
        compile_err("u8 = 5 u8").to_string(),
        "parse error: expected `;` after literal at `u8`"
    );
    assert_eq!(
        compile_err("u8 = u8;").to_string(),
        "parse error: expected a literal after `=` at `u8`"
    );
    assert_eq!(compile_err("u8 ;").to_string(), "parse error: unexpected `;` at `;`");
    assert!(matches!(compile_err("5"), CompileError::Parse { .. }));
}

#[test]
fn unrecognized_input() {
    assert_eq!(
        compile_err("u8 @@ u8").to_string(),
        "parse error: unrecognized input at `@@`"
    );
}

#[test]
fn block_structure() {
    assert_eq!(
        compile_err("u8 }2").to_string(),
        "parse error: `}` without a matching `{` at `}2`"
    );
    assert_eq!(
        compile_err("{ u8 { u4 }"),
        CompileError::Structural {
            message: "repetition block is never closed".into(),
            span: 0..1,
        }
    );
    assert_eq!(
        compile_err("u8 { u4 }$"),
        CompileError::Unsupported {
            feature: "unbounded repetition",
            span: 3..10,
        }
    );
}

#[test]
fn expansion_is_bounded() {
    let err = compile_err("{{ u1 }2048}1024");
    assert!(err.to_string().contains("instructions"), "{err}");
}
