//! Recursive-descent parser
//!
//!     The parser walks the token stream from [crate::lexing::tokenize] with a single
//!     cursor. Grammar rules live in three submodules:
//!
//!         definitions   top-level constructs (interface, dictionary, enum, typedef, ...)
//!         members       interface, namespace and dictionary members, enum values
//!         types         types, arguments, extended attributes and literals
//!
//!     Nothing is backtracked: the WebIDL grammar is LL(1) apart from a few two-token
//!     lookaheads (`callback interface`, `async iterable`, `unsigned long long`), which
//!     [Parser::peek_at] covers.
//!
//!     Error handling: a syntax error stops the block. Every definition completed before
//!     the error is kept, and the source from the start of the failing definition (its
//!     leading trivia included) is returned verbatim as the remainder, so the block can
//!     still be written back exactly.

mod definitions;
mod members;
mod types;

use crate::ast::ParsedBlock;
use crate::diagnostics::Diagnostic;
use crate::error::{format_source_context, ParseResult, SyntaxError};
use crate::lexing::tokenize;
use crate::range::LineIndex;
use crate::token::{IdlToken, Tok, TokenKind};
use tracing::debug;

/// Parse one IDL block.
pub fn parse(source: &str) -> ParsedBlock {
    parse_with_scope(source, None)
}

/// Parse one IDL block. `scope` names the block in syntax error messages when the error
/// happens before any definition name is known.
pub fn parse_with_scope(source: &str, scope: Option<&str>) -> ParsedBlock {
    let mut parser = Parser::new(source);
    parser.context = scope.map(str::to_string);

    let mut definitions = Vec::new();
    let mut remainder = None;
    let mut diagnostics = Vec::new();

    while !parser.at_eof() {
        let start = parser.pos;
        match parser.definition() {
            Ok(definition) => definitions.push(definition),
            Err(error) => {
                debug!(%error, parsed = definitions.len(), "syntax error in IDL block");
                let resume = parser.tokens[start].trivia_start();
                remainder = Some(source[resume..].to_string());
                diagnostics.push(Diagnostic::from(&*error));
                break;
            }
        }
    }

    debug!(definitions = definitions.len(), "parsed IDL block");
    ParsedBlock {
        definitions,
        eof: parser.eof_tok(),
        remainder,
        diagnostics,
    }
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<IdlToken>,
    pos: usize,
    lines: LineIndex,
    /// Text of the construct being parsed, for error messages.
    context: Option<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            lines: LineIndex::new(source),
            context: None,
        }
    }

    /// The current token. The stream always ends with Eof, so this never runs out.
    fn peek(&self) -> &IdlToken {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &IdlToken {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// True if the current token is the identifier or punctuation `value`.
    fn at(&self, value: &str) -> bool {
        self.peek().is(value)
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn bump(&mut self) -> Tok {
        let tok = self.peek().to_tok();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, value: &str) -> Option<Tok> {
        if self.at(value) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, value: &str, message: &str) -> ParseResult<Tok> {
        self.eat(value).ok_or_else(|| self.error(message))
    }

    fn identifier(&mut self, message: &str) -> ParseResult<Tok> {
        if self.at_kind(TokenKind::Identifier) {
            Ok(self.bump())
        } else {
            Err(self.error(message))
        }
    }

    fn eof_tok(&self) -> Tok {
        self.tokens[self.tokens.len() - 1].to_tok()
    }

    /// End offset of the last consumed token.
    fn last_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(index) => self.tokens[index].span.end,
            None => 0,
        }
    }

    fn error(&self, message: &str) -> Box<SyntaxError> {
        let token = self.peek();
        let message = match token.kind {
            TokenKind::Other => format!("{} (unexpected character `{}`)", message, token.value),
            _ => message.to_string(),
        };
        let range = self.lines.range(&token.span);
        Box::new(SyntaxError {
            source_context: format_source_context(self.source, range.start),
            message,
            range,
            context: self.context.clone(),
        })
    }
}
