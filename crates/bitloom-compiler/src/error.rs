//! Compile errors and their rendering.

use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

/// Errors produced while compiling pattern text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Text that is not a valid token, or a token with invalid operands.
    #[error("parse error: {message} at `{token}`")]
    Parse {
        message: String,
        token: String,
        span: Range<usize>,
    },

    /// Repetition blocks that do not balance.
    #[error("structural error: {message}")]
    Structural { message: String, span: Range<usize> },

    /// Syntax that is recognized but has no defined semantics.
    #[error("unsupported pattern feature: {feature}")]
    Unsupported {
        feature: &'static str,
        span: Range<usize>,
    },
}

impl CompileError {
    pub fn span(&self) -> Range<usize> {
        match self {
            CompileError::Parse { span, .. }
            | CompileError::Structural { span, .. }
            | CompileError::Unsupported { span, .. } => span.clone(),
        }
    }

    fn label(&self) -> String {
        match self {
            CompileError::Parse { message, .. } | CompileError::Structural { message, .. } => {
                message.clone()
            }
            CompileError::Unsupported { feature, .. } => format!("{feature} is not supported"),
        }
    }

    /// Render the error against its pattern, pointing at the offending span.
    pub fn render(&self, source: &str, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let title = self.to_string();
        let label = self.label();
        let snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(adjust_range(self.span(), source.len()))
                .label(&label),
        );
        let report = vec![Level::ERROR.primary_title(&title).element(snippet)];
        renderer.render(&report).to_string()
    }
}

/// Widen empty spans to one character so the annotation is visible.
fn adjust_range(range: Range<usize>, limit: usize) -> Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range
}
