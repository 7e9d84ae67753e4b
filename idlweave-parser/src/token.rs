//! Token types shared by the lexer, the parser and the AST.
//!
//! [IdlToken] is what the lexer emits. The AST keeps the parts it needs as [Tok], which is
//! the same data minus the kind: once a token has been placed in the tree, its role is
//! given by the field that holds it.

use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Integer,
    Decimal,
    String,
    Punctuation,
    /// Input the lexer could not classify.
    Other,
    Eof,
}

/// A significant token and the trivia (whitespace, comments) that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlToken {
    pub kind: TokenKind,
    pub trivia: String,
    pub value: String,
    pub span: Range<usize>,
}

impl IdlToken {
    pub fn new(kind: TokenKind, trivia: &str, value: &str, span: Range<usize>) -> Self {
        Self {
            kind,
            trivia: trivia.to_string(),
            value: value.to_string(),
            span,
        }
    }

    pub fn is(&self, value: &str) -> bool {
        self.kind != TokenKind::String && self.value == value
    }

    /// Byte offset where the leading trivia starts.
    pub fn trivia_start(&self) -> usize {
        self.span.start - self.trivia.len()
    }

    pub fn to_tok(&self) -> Tok {
        Tok {
            trivia: self.trivia.clone(),
            value: self.value.clone(),
            span: self.span.clone(),
        }
    }
}

/// A token stored in the AST: its text, its leading trivia and its byte span.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tok {
    pub trivia: String,
    pub value: String,
    pub span: Range<usize>,
}

impl Tok {
    /// A token with no trivia and no source location, for tests and synthesized nodes.
    pub fn bare(value: &str) -> Self {
        Self {
            trivia: String::new(),
            value: value.to_string(),
            span: 0..0,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.trivia);
        out.push_str(&self.value);
    }

    /// True when the trivia holds a comment rather than only whitespace.
    pub fn has_comment(&self) -> bool {
        trivia_has_comment(&self.trivia)
    }
}

pub fn trivia_has_comment(trivia: &str) -> bool {
    !trivia.trim().is_empty()
}

/// Write back a list of tokens in order.
pub fn write_all<'a, I>(tokens: I, out: &mut String)
where
    I: IntoIterator<Item = &'a Tok>,
{
    for tok in tokens {
        tok.write_to(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_start() {
        let token = IdlToken::new(TokenKind::Identifier, "  ", "Foo", 12..15);
        assert_eq!(token.trivia_start(), 10);
    }

    #[test]
    fn test_is_ignores_string_tokens() {
        let string = IdlToken::new(TokenKind::String, "", "\"x\"", 0..3);
        assert!(!string.is("x"));
        let ident = IdlToken::new(TokenKind::Identifier, "", "x", 0..1);
        assert!(ident.is("x"));
    }

    #[test]
    fn test_comment_detection() {
        assert!(!Tok::bare("x").has_comment());
        let tok = Tok {
            trivia: "\n  // note\n  ".to_string(),
            ..Tok::bare("x")
        };
        assert!(tok.has_comment());
    }
}
