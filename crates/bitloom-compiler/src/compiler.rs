//! Pattern compiler: tokens to a flat instruction stream.
//!
//! Repetition blocks are expanded eagerly as soon as their `}` is seen, so
//! nested blocks are already flat when the enclosing block closes. Bracket
//! balance is deliberately left to the engines: brackets may open in one
//! repetition and close in another.

use std::ops::Range;

use bitloom_bytecode::{
    Directive, Encoding, Flag, Instruction, JumpKind, Literal, ModKind, OffsetKind, Program,
    Setting, Width,
};
use bitloom_core::codec::{MAX_INT_BITS, parse_hex_bytes};

use crate::error::CompileError;
use crate::lexer::{Token, TokenKind, lex, token_text};

/// Upper bound on the expanded instruction count.
pub const MAX_INSTRUCTIONS: usize = 1 << 20;

/// Compile pattern text into a program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    Compiler::new(source).run()
}

/// An open `{ ... }` block collecting its body.
struct Block {
    open: Range<usize>,
    body: Vec<Instruction>,
}

struct Compiler<'p> {
    source: &'p str,
    tokens: Vec<Token>,
    pos: usize,
    output: Vec<Instruction>,
    blocks: Vec<Block>,
}

impl<'p> Compiler<'p> {
    fn new(source: &'p str) -> Self {
        Self {
            source,
            tokens: lex(source),
            pos: 0,
            output: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Program, CompileError> {
        while let Some(token) = self.bump() {
            self.token(token)?;
        }
        if let Some(block) = self.blocks.last() {
            return Err(CompileError::Structural {
                message: "repetition block is never closed".into(),
                span: block.open.clone(),
            });
        }
        Ok(Program::new(self.output))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn token(&mut self, token: Token) -> Result<(), CompileError> {
        let text = token_text(self.source, &token);
        let span = token.span.clone();
        match token.kind {
            TokenKind::Field => self.field(text, span),
            TokenKind::Fill => {
                let width = self.width(&text[1..], span.clone())?;
                let directive = match text.as_bytes()[0] {
                    b'n' | b'z' => Directive::Zeros { width },
                    b'N' | b'o' => Directive::Ones { width },
                    _ => Directive::Next { width },
                };
                self.emit(span, directive)
            }
            TokenKind::Mod => self.modifier(text, span),
            TokenKind::ModOff => self.offset_modifier(text, span),
            TokenKind::ModSet => {
                let flag = match text.as_bytes()[0] {
                    b'R' => Flag::ReverseAll,
                    b'I' => Flag::InvertAll,
                    _ => Flag::EndianSwapAll,
                };
                let setting = match &text[1..] {
                    "y" => Setting::Set,
                    "n" => Setting::Clear,
                    "t" => Setting::Toggle,
                    other => {
                        return Err(self.error(
                            format!("unknown setting qualifier `{other}`, expected y, n or t"),
                            span,
                        ));
                    }
                };
                self.emit(span, Directive::ModSet { flag, setting })
            }
            TokenKind::BracketOpen => self.emit(span, Directive::NestOpen),
            TokenKind::BracketClose => self.emit(span, Directive::NestClose),
            TokenKind::BraceOpen => {
                self.blocks.push(Block {
                    open: span,
                    body: Vec::new(),
                });
                Ok(())
            }
            TokenKind::BraceClose => self.close_block(text, span),
            TokenKind::SetLabel => {
                let name = self.label_name(text, 3, span.clone())?;
                self.emit(span, Directive::SetLabel { name })
            }
            TokenKind::MatchLabel => {
                let name = self.label_name(text, 3, span.clone())?;
                self.emit(span, Directive::MatchLabel { name })
            }
            TokenKind::DefLabel => {
                let name = self.label_name(text, 2, span.clone())?;
                if self.peek_kind() != Some(TokenKind::Equals) {
                    return self.emit(span, Directive::DefLabel { name, value: None });
                }
                self.pos += 1;
                let (value, end) = self.literal(span.end)?;
                self.emit(span.start..end, Directive::DefLabel {
                    name,
                    value: Some(value),
                })
            }
            TokenKind::Equals => {
                let (expected, end) = self.literal(span.end)?;
                self.emit(span.start..end, Directive::Assertion { expected })
            }
            TokenKind::MarkerStart | TokenKind::MarkerEnd => {
                let hex = &text[3..text.len() - 1];
                let bytes = parse_hex_bytes(hex).filter(|b| !b.is_empty()).ok_or_else(|| {
                    self.error(
                        "marker literal must be a non-empty, even-length hex string",
                        span.clone(),
                    )
                })?;
                let directive = if token.kind == TokenKind::MarkerStart {
                    Directive::MarkerStart { bytes }
                } else {
                    Directive::MarkerEnd { bytes }
                };
                self.emit(span, directive)
            }
            TokenKind::Jump => self.jump(text, span),
            TokenKind::Comment => Ok(()),
            TokenKind::Semicolon => Err(self.error("unexpected `;`", span)),
            TokenKind::Str | TokenKind::Number => {
                Err(self.error("literal outside of an assertion or label definition", span))
            }
            TokenKind::Garbage => Err(self.error("unrecognized input", span)),
        }
    }

    fn field(&mut self, text: &str, span: Range<usize>) -> Result<(), CompileError> {
        let letter = text.chars().next().unwrap_or_default();
        let Some(encoding) = Encoding::from_letter(letter) else {
            return Err(self.error("unknown field encoding", span));
        };

        if &text[1..] == "$" {
            let directive = match encoding {
                Encoding::Bytes | Encoding::Char => Directive::TakeAll { encoding },
                _ => Directive::Value {
                    encoding,
                    width: Width::Rest,
                },
            };
            return self.emit(span, directive);
        }

        let width = self.width(&text[1..], span.clone())?;
        match encoding {
            Encoding::Bytes | Encoding::Char if width % 8 != 0 => {
                return Err(self.error(
                    format!("{encoding} width must be a multiple of 8, got {width}"),
                    span,
                ));
            }
            Encoding::Float if width != 32 && width != 64 => {
                return Err(self.error(format!("float width must be 32 or 64, got {width}"), span));
            }
            Encoding::UInt | Encoding::SInt if width > MAX_INT_BITS => {
                return Err(self.error(
                    format!("{encoding} width must be at most {MAX_INT_BITS}, got {width}"),
                    span,
                ));
            }
            _ => {}
        }
        self.emit(span, Directive::Value {
            encoding,
            width: Width::Bits(width),
        })
    }

    fn modifier(&mut self, text: &str, span: Range<usize>) -> Result<(), CompileError> {
        let width = if &text[1..] == "$" {
            Width::Rest
        } else {
            Width::Bits(self.width(&text[1..], span.clone())?)
        };
        let kind = match text.as_bytes()[0] {
            b'r' => ModKind::Reverse,
            b'i' => ModKind::Invert,
            _ => ModKind::EndianSwap,
        };
        if let (ModKind::EndianSwap, Width::Bits(n)) = (kind, width) {
            if n % 8 != 0 {
                return Err(self.error(
                    format!("endian swap width must be a multiple of 8, got {n}"),
                    span,
                ));
            }
        }
        self.emit(span, Directive::Mod { kind, width })
    }

    fn offset_modifier(&mut self, text: &str, span: Range<usize>) -> Result<(), CompileError> {
        let Some((offset, width)) = text[1..].split_once('.') else {
            return Err(self.error("expected `<offset>.<width>`", span));
        };
        let offset = self.number(offset, span.clone())?;
        let width = if width == "$" {
            Width::Rest
        } else {
            Width::Bits(self.width(width, span.clone())?)
        };
        let kind = match text.as_bytes()[0] {
            b'r' => OffsetKind::Reverse,
            b'i' => OffsetKind::Invert,
            _ => OffsetKind::Pull,
        };
        self.emit(span, Directive::ModOff {
            kind,
            offset,
            width,
        })
    }

    fn jump(&mut self, text: &str, span: Range<usize>) -> Result<(), CompileError> {
        let qualifier = &text[1..2];
        let kind = match qualifier {
            "s" => JumpKind::Start,
            "f" => JumpKind::Forward,
            "b" => JumpKind::Backward,
            "e" => JumpKind::End,
            other => {
                return Err(self.error(
                    format!("unknown jump qualifier `{other}`, expected s, f, b or e"),
                    span,
                ));
            }
        };
        if text.len() == 2 {
            return Err(self.error("jump needs a bit count", span));
        }
        let bits = self.number(&text[2..], span.clone())?;
        self.emit(span, Directive::Jump { kind, bits })
    }

    fn close_block(&mut self, text: &str, span: Range<usize>) -> Result<(), CompileError> {
        let Some(block) = self.blocks.pop() else {
            return Err(self.error("`}` without a matching `{`", span));
        };
        let count = match &text[1..] {
            "" => 1,
            "$" => {
                return Err(CompileError::Unsupported {
                    feature: "unbounded repetition",
                    span: block.open.start..span.end,
                });
            }
            digits => self.number(digits, span.clone())?,
        };

        let total = block.body.len().checked_mul(count);
        if total.is_none_or(|n| n > MAX_INSTRUCTIONS) {
            return Err(self.too_large(span));
        }
        let mut expanded = Vec::with_capacity(total.unwrap_or_default());
        for _ in 0..count {
            expanded.extend(block.body.iter().cloned());
        }
        self.push(expanded, span)
    }

    /// Parse `"...";` after `=`, returning the literal and the end of the `;`.
    fn literal(&mut self, after: usize) -> Result<(Literal, usize), CompileError> {
        let Some(token) = self.bump() else {
            return Err(self.error("expected a literal after `=`", after..after));
        };
        let text = token_text(self.source, &token);
        let literal = match token.kind {
            TokenKind::Number => self.number_literal(text, token.span.clone())?,
            TokenKind::Str => Literal::Str(text[1..text.len() - 1].to_string()),
            _ => return Err(self.error("expected a literal after `=`", token.span)),
        };
        match self.bump() {
            Some(semi) if semi.kind == TokenKind::Semicolon => Ok((literal, semi.span.end)),
            Some(other) => Err(self.error("expected `;` after literal", other.span)),
            None => Err(self.error(
                "expected `;` after literal",
                token.span.end..token.span.end,
            )),
        }
    }

    fn number_literal(&self, text: &str, span: Range<usize>) -> Result<Literal, CompileError> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let parsed = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            i128::from_str_radix(hex, 16).ok().map(Literal::Int)
        } else if digits.contains('.') {
            digits.parse::<f64>().ok().map(Literal::Float)
        } else {
            digits.parse::<i128>().ok().map(Literal::Int)
        };
        match parsed {
            Some(Literal::Int(n)) if negative => Ok(Literal::Int(-n)),
            Some(Literal::Float(x)) if negative => Ok(Literal::Float(-x)),
            Some(lit) => Ok(lit),
            None => Err(self.error("number literal out of range", span)),
        }
    }

    fn label_name(
        &self,
        text: &str,
        prefix: usize,
        span: Range<usize>,
    ) -> Result<String, CompileError> {
        let name = &text[prefix..text.len() - 1];
        if name.is_empty() {
            return Err(self.error("label name cannot be empty", span));
        }
        Ok(name.to_string())
    }

    /// A field or window width: a positive bit count.
    fn width(&self, digits: &str, span: Range<usize>) -> Result<usize, CompileError> {
        let n = self.number(digits, span.clone())?;
        if n == 0 {
            return Err(self.error("width must be greater than zero", span));
        }
        Ok(n)
    }

    fn number(&self, digits: &str, span: Range<usize>) -> Result<usize, CompileError> {
        digits
            .parse()
            .map_err(|_| self.error("number out of range", span))
    }

    fn emit(&mut self, span: Range<usize>, directive: Directive) -> Result<(), CompileError> {
        let instr = Instruction::new(&self.source[span.clone()], span.clone(), directive);
        self.push(vec![instr], span)
    }

    /// Append to the innermost open block, or to the output.
    fn push(&mut self, instrs: Vec<Instruction>, span: Range<usize>) -> Result<(), CompileError> {
        let target = match self.blocks.last_mut() {
            Some(block) => &mut block.body,
            None => &mut self.output,
        };
        if target.len() + instrs.len() > MAX_INSTRUCTIONS {
            return Err(self.too_large(span));
        }
        target.extend(instrs);
        Ok(())
    }

    fn too_large(&self, span: Range<usize>) -> CompileError {
        self.error(
            format!("pattern expands to more than {MAX_INSTRUCTIONS} instructions"),
            span,
        )
    }

    fn error(&self, message: impl Into<String>, span: Range<usize>) -> CompileError {
        CompileError::Parse {
            message: message.into(),
            token: self.source[span.clone()].to_string(),
            span,
        }
    }
}
