//! Lexer for pattern text.
//!
//! Produces span-based tokens without storing text; text is sliced from the
//! pattern only when needed. Tokens carry their operands inline (`u8`,
//! `p4.$`, `=#"len"`), and the compiler splits them.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage`
//! tokens rather than producing one error per character.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// Value field: `u8`, `s$`, `x12`, `C16`, `f32`.
    #[regex(r"[usxXbBCf](?:[0-9]+|\$)")]
    Field,

    /// Fixed fill: `n4`/`z4` zeros, `N4`/`o4` ones, `_4` don't-care.
    #[regex(r"[nNzo_][0-9]+")]
    Fill,

    /// One-shot transform at the cursor: `r8`, `i$`, `e16`.
    #[regex(r"[ri](?:[0-9]+|\$)")]
    #[regex(r"e[0-9]+")]
    Mod,

    /// Transform over an offset window: `r4.8`, `p8.$`.
    #[regex(r"[rip][0-9]+\.(?:[0-9]+|\$)")]
    ModOff,

    /// Persistent setting: `Ry`, `In`, `Et`. Qualifier validated by the compiler.
    #[regex(r"[RIE][a-zA-Z]")]
    ModSet,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    /// `}`, `}3`, `}$`.
    #[regex(r"\}(?:[0-9]+|\$)?")]
    BraceClose,

    #[regex(r#"=#"[^"]*""#)]
    SetLabel,

    #[regex(r#"#"[^"]*""#)]
    DefLabel,

    #[regex(r#"\?#"[^"]*""#)]
    MatchLabel,

    #[regex(r#"m\^"[^"]*""#)]
    MarkerStart,

    #[regex(r#"m\$"[^"]*""#)]
    MarkerEnd,

    /// `js16`, `jf8`, ... Qualifier validated by the compiler.
    #[regex(r"j[a-zA-Z][0-9]*")]
    Jump,

    #[token("=")]
    Equals,

    #[token(";")]
    Semicolon,

    #[regex(r#""[^"]*""#)]
    Str,

    #[regex(r"-?(?:0[xX][0-9a-fA-F]+|[0-9]+(?:\.[0-9]+)?)")]
    Number,

    #[regex(r"##[^\n]*", allow_greedy = true)]
    Comment,

    /// Consecutive unrecognized characters.
    Garbage,
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Tokenizes a pattern into span-based tokens.
///
/// Consecutive lexer errors are coalesced into single `Garbage` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut garbage: Option<Range<usize>> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(span) = garbage.take() {
                    tokens.push(Token::new(TokenKind::Garbage, span));
                }
                tokens.push(Token::new(kind, lexer.span()));
            }
            Some(Err(())) => {
                let span = lexer.span();
                match garbage.as_mut() {
                    Some(open) => open.end = span.end,
                    None => garbage = Some(span),
                }
            }
            None => {
                if let Some(span) = garbage.take() {
                    tokens.push(Token::new(TokenKind::Garbage, span));
                }
                break;
            }
        }
    }

    tokens
}

/// Retrieves the text slice for a token.
#[inline]
pub fn token_text<'p>(source: &'p str, token: &Token) -> &'p str {
    &source[token.span.clone()]
}
