//! Tracing infrastructure for debugging runs.
//!
//! # Design: Zero-Cost Abstraction
//!
//! When `NoopTracer` is used every hook is an `#[inline(always)]` empty
//! function and the compiler removes the calls together with their
//! arguments. No tracing state lives in the engine itself.
//!
//! `PrintTracer` collects one line per executed instruction plus sub-lines
//! for values, transforms, labels and seeks, filtered by [`Verbosity`].

use std::ops::Range;

use bitloom_bytecode::{Instruction, Program, format_directive, width_for_count};
use bitloom_core::{Colors, Value};

use super::translate::Transform;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Instructions and the values they produce.
    #[default]
    Default,
    /// Verbose (-v): also transforms, labels and seeks.
    Verbose,
    /// Very verbose (-vv): also the cursor on every instruction.
    VeryVerbose,
}

/// Tracer trait for run instrumentation.
///
/// Hooks receive raw data the interpreter already has; formatting happens
/// in the implementation.
pub trait Tracer {
    /// Called before executing an instruction. `pos` is the buffer cursor.
    fn trace_instruction(&mut self, step: usize, instr: &Instruction, pos: usize);

    /// Called when a value is produced or consumed, with its buffer region.
    fn trace_value(&mut self, value: &Value, region: Range<usize>);

    /// Called when a transform is applied (decoder) or recorded (encoder).
    fn trace_transform(&mut self, transform: &Transform);

    /// Called when a label gets a new entry.
    fn trace_label(&mut self, name: &str, value: Option<&Value>);

    /// Called when a jump or marker scan moves the cursor.
    fn trace_seek(&mut self, from: usize, to: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_instruction(&mut self, _step: usize, _instr: &Instruction, _pos: usize) {}

    #[inline(always)]
    fn trace_value(&mut self, _value: &Value, _region: Range<usize>) {}

    #[inline(always)]
    fn trace_transform(&mut self, _transform: &Transform) {}

    #[inline(always)]
    fn trace_label(&mut self, _name: &str, _value: Option<&Value>) {}

    #[inline(always)]
    fn trace_seek(&mut self, _from: usize, _to: usize) {}
}

/// Tracer that collects an execution trace for display.
pub struct PrintTracer {
    verbosity: Verbosity,
    lines: Vec<String>,
    step_width: usize,
    colors: Colors,
}

/// Builder for [`PrintTracer`].
pub struct PrintTracerBuilder {
    step_width: usize,
    verbosity: Verbosity,
    colored: bool,
}

impl PrintTracerBuilder {
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn colored(mut self, enabled: bool) -> Self {
        self.colored = enabled;
        self
    }

    pub fn build(self) -> PrintTracer {
        PrintTracer {
            verbosity: self.verbosity,
            lines: Vec::new(),
            step_width: self.step_width,
            colors: Colors::new(self.colored),
        }
    }
}

impl PrintTracer {
    /// Start building a tracer for runs of `program`.
    pub fn builder(program: &Program) -> PrintTracerBuilder {
        PrintTracerBuilder {
            step_width: width_for_count(program.len()),
            verbosity: Verbosity::Default,
            colored: false,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn add_subline(&mut self, symbol: char, content: &str) {
        let indent = self.step_width + 2;
        self.lines.push(format!("{:indent$}{symbol} {content}", ""));
    }
}

impl Tracer for PrintTracer {
    fn trace_instruction(&mut self, step: usize, instr: &Instruction, pos: usize) {
        let c = self.colors;
        let sw = self.step_width;
        let mut line = format!(
            "{step:>sw$}  {}{}{}  {}",
            c.dim,
            instr.token,
            c.reset,
            format_directive(&instr.directive, c)
        );
        if self.verbosity == Verbosity::VeryVerbose {
            line.push_str(&format!("  {}@{pos}{}", c.dim, c.reset));
        }
        self.lines.push(line);
    }

    fn trace_value(&mut self, value: &Value, region: Range<usize>) {
        let c = self.colors;
        let content = format!(
            "{}  {}[{}, {}){}",
            value.format(false, c),
            c.dim,
            region.start,
            region.end,
            c.reset
        );
        self.add_subline('=', &content);
    }

    fn trace_transform(&mut self, transform: &Transform) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline('~', &transform.to_string());
    }

    fn trace_label(&mut self, name: &str, value: Option<&Value>) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        let shown = value.map_or_else(|| "none".to_string(), |v| v.format(false, c));
        let content = format!("{}{name:?}{} = {shown}", c.green, c.reset);
        self.add_subline('#', &content);
    }

    fn trace_seek(&mut self, from: usize, to: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline('>', &format!("{from} -> {to}"));
    }
}
