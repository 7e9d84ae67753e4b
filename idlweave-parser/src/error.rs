//! Error types for parsing

use crate::diagnostics::Diagnostic;
use crate::range::{Position, Range};
use std::fmt;

/// The parser cannot continue the current block.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub range: Range,
    /// The definition being parsed when the error occurred, if known.
    pub context: Option<String>,
    pub source_context: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syntax error at line {}", self.range.start.line + 1)?;
        if let Some(context) = &self.context {
            write!(f, ", since `{}`", context)?;
        }
        writeln!(f, ":")?;
        write!(f, "{}", self.source_context)?;
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SyntaxError {}

impl From<&SyntaxError> for Diagnostic {
    fn from(error: &SyntaxError) -> Self {
        Diagnostic::error(error.to_string())
            .with_code("syntax-error")
            .with_range(error.range.clone())
    }
}

pub type ParseResult<T> = Result<T, Box<SyntaxError>>;

/// Format source code context around an error location
///
/// Shows up to 2 lines before the error and the error line, then a caret under the
/// offending column.
pub fn format_source_context(source: &str, at: Position) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let start_line = at.line.saturating_sub(2);
    let end_line = (at.line + 1).min(lines.len());

    let mut context = String::new();
    for line in lines.iter().take(end_line).skip(start_line) {
        context.push_str(line);
        context.push('\n');
    }
    context.push_str(&" ".repeat(at.column));
    context.push_str("^ ");
    context
}
