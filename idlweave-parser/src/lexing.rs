//! Lexer
//!
//!     Tokenization runs in two steps. First the logos lexer splits the block source into
//!     raw lexemes, including whitespace and comments. Then [tokenize] folds every run of
//!     whitespace and comments into the `trivia` field of the next significant token, so
//!     the parser never sees trivia but nothing is ever dropped.
//!
//!     The final token is always [TokenKind::Eof]: its value is empty and its trivia holds
//!     whatever trails the last significant token. Concatenating `trivia + value` over the
//!     whole stream reproduces the input byte for byte.
//!
//!     Keywords are not distinguished here. WebIDL lets most keywords appear as argument
//!     names, so the parser compares identifier text instead.

use crate::token::{IdlToken, TokenKind};
use logos::Logos;

/// Raw lexemes as produced by logos, trivia included.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    #[regex(r"[\t\n\r ]+")]
    Whitespace,

    #[regex(r"//[^\n\r]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[regex(r"-?([1-9][0-9]*|0[Xx][0-9A-Fa-f]+|0[0-7]*)")]
    Integer,

    #[regex(r"-?(([0-9]+\.[0-9]*|[0-9]*\.[0-9]+)([Ee][+-]?[0-9]+)?|[0-9]+[Ee][+-]?[0-9]+)")]
    Decimal,

    #[regex(r"[_-]?[A-Za-z][0-9A-Za-z_-]*")]
    Identifier,

    #[regex(r#""[^"]*""#)]
    String,

    #[token("...")]
    Ellipsis,

    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    #[token("<")]
    #[token(">")]
    #[token(",")]
    #[token(";")]
    #[token(":")]
    #[token("=")]
    #[token("?")]
    #[token("*")]
    #[token(".")]
    #[token("-")]
    Punctuation,
}

impl Lexeme {
    /// Whitespace and comments, folded into the following token.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Lexeme::Whitespace | Lexeme::LineComment | Lexeme::BlockComment
        )
    }

    fn kind(self) -> TokenKind {
        match self {
            Lexeme::Integer => TokenKind::Integer,
            Lexeme::Decimal => TokenKind::Decimal,
            Lexeme::Identifier => TokenKind::Identifier,
            Lexeme::String => TokenKind::String,
            Lexeme::Ellipsis | Lexeme::Punctuation => TokenKind::Punctuation,
            // trivia never reaches this point
            Lexeme::Whitespace | Lexeme::LineComment | Lexeme::BlockComment => TokenKind::Other,
        }
    }
}

/// Raw tokenization with byte ranges. Unrecognized input is reported as `None`.
pub fn lex_raw(source: &str) -> Vec<(Option<Lexeme>, std::ops::Range<usize>)> {
    let mut lexer = Lexeme::lexer(source);
    let mut lexemes = Vec::new();

    while let Some(result) = lexer.next() {
        lexemes.push((result.ok(), lexer.span()));
    }

    lexemes
}

/// Tokenize a block, attaching leading trivia to each significant token.
///
/// The returned stream always ends with an [TokenKind::Eof] token.
pub fn tokenize(source: &str) -> Vec<IdlToken> {
    let mut tokens = Vec::new();
    let mut trivia_start: Option<usize> = None;

    for (lexeme, span) in lex_raw(source) {
        match lexeme {
            Some(lexeme) if lexeme.is_trivia() => {
                trivia_start.get_or_insert(span.start);
            }
            other => {
                let trivia = match trivia_start.take() {
                    Some(start) => &source[start..span.start],
                    None => "",
                };
                let kind = other.map(Lexeme::kind).unwrap_or(TokenKind::Other);
                tokens.push(IdlToken::new(
                    kind,
                    trivia,
                    &source[span.clone()],
                    span,
                ));
            }
        }
    }

    let trivia = match trivia_start {
        Some(start) => &source[start..],
        None => "",
    };
    tokens.push(IdlToken::new(
        TokenKind::Eof,
        trivia,
        "",
        source.len()..source.len(),
    ));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_trivia_attaches_to_following_token() {
        let tokens = tokenize("  // hi\ninterface /* c */ Foo");
        assert_eq!(tokens[0].trivia, "  // hi\n");
        assert_eq!(tokens[0].value, "interface");
        assert_eq!(tokens[1].trivia, " /* c */ ");
        assert_eq!(tokens[1].value, "Foo");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].trivia, "");
    }

    #[test]
    fn test_trailing_trivia_lands_on_eof() {
        let tokens = tokenize("x; // done\n");
        let eof = tokens.last().expect("eof token");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.trivia, " // done\n");
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[rstest]
    #[case("42", TokenKind::Integer)]
    #[case("-7", TokenKind::Integer)]
    #[case("0x1F", TokenKind::Integer)]
    #[case("4.2", TokenKind::Decimal)]
    #[case("47.0", TokenKind::Decimal)]
    #[case("1e10", TokenKind::Decimal)]
    #[case("Infinity", TokenKind::Identifier)]
    #[case("-Infinity", TokenKind::Identifier)]
    #[case("_readonly", TokenKind::Identifier)]
    #[case("\"white space\"", TokenKind::String)]
    #[case("...", TokenKind::Punctuation)]
    fn test_single_token_kinds(#[case] source: &str, #[case] expected: TokenKind) {
        let tokens = kinds(source);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], (expected, source.to_string()));
    }

    #[test]
    fn test_generic_brackets_are_separate_tokens() {
        let values: Vec<String> = kinds("sequence<DOMString>")
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec!["sequence", "<", "DOMString", ">", ""]);
    }

    #[test]
    fn test_unknown_characters_become_other_tokens() {
        let tokens = kinds("a # b");
        assert_eq!(tokens[1], (TokenKind::Other, "#".to_string()));
    }

    #[test]
    fn test_concatenation_reproduces_source() {
        let source = "/* a */ [Exposed=Window]\ninterface X {\n  // c\n};\n";
        let rebuilt: String = tokenize(source)
            .iter()
            .map(|t| format!("{}{}", t.trivia, t.value))
            .collect();
        assert_eq!(rebuilt, source);
    }
}
