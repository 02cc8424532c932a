use crate::lexer::{TokenKind, lex, token_text};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn fields_and_modifiers() {
    assert_eq!(
        kinds("u8 s$ r4.8 p2.$ e16 i$ Ey"),
        vec![
            TokenKind::Field,
            TokenKind::Field,
            TokenKind::ModOff,
            TokenKind::ModOff,
            TokenKind::Mod,
            TokenKind::Mod,
            TokenKind::ModSet,
        ]
    );
}

#[test]
fn labels_take_longest_match() {
    assert_eq!(
        kinds(r#"=#"a" #"b" ?#"c" = 5;"#),
        vec![
            TokenKind::SetLabel,
            TokenKind::DefLabel,
            TokenKind::MatchLabel,
            TokenKind::Equals,
            TokenKind::Number,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn repetition_and_brackets() {
    assert_eq!(
        kinds("{ [u4] }3 {_1}$ }"),
        vec![
            TokenKind::BraceOpen,
            TokenKind::BracketOpen,
            TokenKind::Field,
            TokenKind::BracketClose,
            TokenKind::BraceClose,
            TokenKind::BraceOpen,
            TokenKind::Fill,
            TokenKind::BraceClose,
            TokenKind::BraceClose,
        ]
    );
}

#[test]
fn markers_jumps_and_numbers() {
    let source = r#"m^"ff00" m$"0a" js16 jb4 = -0x1F; = 2.5; = "hi";"#;
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::MarkerStart,
            TokenKind::MarkerEnd,
            TokenKind::Jump,
            TokenKind::Jump,
            TokenKind::Equals,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Equals,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Equals,
            TokenKind::Str,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn comment_runs_to_end_of_line() {
    let tokens = lex("u8 ## trailing u16\nb1");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Field, TokenKind::Comment, TokenKind::Field]
    );
    assert_eq!(token_text("u8 ## trailing u16\nb1", &tokens[1]), "## trailing u16");
}

#[test]
fn garbage_is_coalesced() {
    let source = "u8 @@@ u4";
    let tokens = lex(source);
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Garbage);
    assert_eq!(token_text(source, &tokens[1]), "@@@");
}

#[test]
fn trailing_garbage_is_flushed() {
    let tokens = lex("u8 @@");
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Garbage));
    assert_eq!(tokens.last().map(|t| t.span.clone()), Some(3..5));
}
