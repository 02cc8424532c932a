//! Human-readable program dump for debugging and documentation.
//!
//! One line per instruction: step index, source token, mnemonic, operands.

use std::fmt::{self, Write as _};

use bitloom_core::{Colors, hex_string};

use super::instruction::{Directive, Flag, JumpKind, ModKind, OffsetKind, Program, Setting};

/// Generate a human-readable dump of a compiled program.
pub fn dump(program: &Program, colors: Colors) -> String {
    let mut out = String::new();
    let step_width = width_for_count(program.len());
    let token_width = program
        .instructions()
        .iter()
        .map(|i| i.token.chars().count())
        .max()
        .unwrap_or(0);

    for (step, instr) in program.instructions().iter().enumerate() {
        let _ = writeln!(
            out,
            "{step:>step_width$}  {}{:<token_width$}{}  {}",
            colors.dim,
            instr.token,
            colors.reset,
            format_directive(&instr.directive, colors),
        );
    }
    out
}

/// Number of digits needed to print indices `0..count`.
pub fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).to_string().len()
}

/// Mnemonic plus operands, e.g. `VALUE uint 8`.
pub fn format_directive(directive: &Directive, c: Colors) -> String {
    let mut out = format!("{}{}{}", c.blue, directive.mnemonic(), c.reset);
    let operands = match directive {
        Directive::Value { encoding, width } => format!("{encoding} {width}"),
        Directive::Next { width } | Directive::Zeros { width } | Directive::Ones { width } => {
            width.to_string()
        }
        Directive::Mod { kind, width } => format!("{} {width}", mod_name(*kind)),
        Directive::ModOff {
            kind,
            offset,
            width,
        } => format!("{} +{offset} {width}", offset_name(*kind)),
        Directive::ModSet { flag, setting } => {
            format!("{} {}", flag_name(*flag), setting_name(*setting))
        }
        Directive::SetLabel { name } | Directive::MatchLabel { name } => {
            format!("{}{name:?}{}", c.green, c.reset)
        }
        Directive::DefLabel { name, value } => match value {
            Some(lit) => format!("{}{name:?}{} = {}{lit}{}", c.green, c.reset, c.green, c.reset),
            None => format!("{}{name:?}{}", c.green, c.reset),
        },
        Directive::Assertion { expected } => format!("{}{expected}{}", c.green, c.reset),
        Directive::TakeAll { encoding } => encoding.to_string(),
        Directive::Jump { kind, bits } => format!("{} {bits}", jump_name(*kind)),
        Directive::MarkerStart { bytes } | Directive::MarkerEnd { bytes } => {
            format!("{}{}{}", c.green, hex_string(bytes), c.reset)
        }
        Directive::NestOpen | Directive::NestClose => String::new(),
    };
    if !operands.is_empty() {
        out.push(' ');
        out.push_str(&operands);
    }
    out
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_directive(self, Colors::OFF))
    }
}

fn mod_name(kind: ModKind) -> &'static str {
    match kind {
        ModKind::Reverse => "reverse",
        ModKind::Invert => "invert",
        ModKind::EndianSwap => "endian-swap",
    }
}

fn offset_name(kind: OffsetKind) -> &'static str {
    match kind {
        OffsetKind::Reverse => "reverse",
        OffsetKind::Invert => "invert",
        OffsetKind::Pull => "pull",
    }
}

fn flag_name(flag: Flag) -> &'static str {
    match flag {
        Flag::ReverseAll => "reverse-all",
        Flag::InvertAll => "invert-all",
        Flag::EndianSwapAll => "endian-swap-all",
    }
}

fn setting_name(setting: Setting) -> &'static str {
    match setting {
        Setting::Set => "set",
        Setting::Clear => "clear",
        Setting::Toggle => "toggle",
    }
}

fn jump_name(kind: JumpKind) -> &'static str {
    match kind {
        JumpKind::Start => "start",
        JumpKind::Forward => "forward",
        JumpKind::Backward => "backward",
        JumpKind::End => "end",
    }
}
