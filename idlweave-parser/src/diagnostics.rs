//! Structured diagnostics
//!
//! Parse errors and validation failures are both reported as [Diagnostic]s so that the
//! host can surface them the same way (tooltip on the offending block, console output).
//! A diagnostic always belongs to one block; `member` names the member it is about when
//! there is one.

use crate::range::Range;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub range: Option<Range>,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>,
    pub member: Option<String>,
    pub source: String,
}

impl Diagnostic {
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range: None,
            severity,
            message: message.into(),
            code: None,
            member: None,
            source: "idlweave-parser".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.source, self.message)?;
        if let Some(range) = &self.range {
            write!(f, " at {}", range.start)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Position;

    #[test]
    fn test_display_includes_position() {
        let diagnostic = Diagnostic::error("Missing semicolon")
            .with_range(Range::new(3..4, Position::new(0, 3), Position::new(0, 4)));
        assert_eq!(
            diagnostic.to_string(),
            "error [idlweave-parser]: Missing semicolon at 1:4"
        );
    }

    #[test]
    fn test_builder_methods() {
        let diagnostic = Diagnostic::warning("x")
            .with_code("orphan-partial")
            .with_member("foo")
            .with_source("idlweave-engine");
        assert!(!diagnostic.is_error());
        assert_eq!(diagnostic.code.as_deref(), Some("orphan-partial"));
        assert_eq!(diagnostic.member.as_deref(), Some("foo"));
        assert_eq!(diagnostic.source, "idlweave-engine");
    }
}
