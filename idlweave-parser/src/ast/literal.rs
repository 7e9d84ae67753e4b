//! Constant values and default values.

use crate::token::Tok;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Boolean(bool),
    Null,
    Integer(String),
    Decimal(String),
    Infinity { negative: bool },
    NaN,
    /// String contents without the quotes.
    String(String),
    EmptySequence,
    EmptyDictionary,
    Undefined,
}

/// A literal and the tokens it spans (`[` `]` for an empty sequence).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub tokens: Vec<Tok>,
    pub value: LiteralValue,
}

impl Literal {
    pub fn write_to(&self, out: &mut String) {
        for tok in &self.tokens {
            tok.write_to(out);
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        match self.tokens.first() {
            Some(first) => out[first.trivia.len()..].to_string(),
            None => out,
        }
    }
}

/// `= value` after a field or argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub assign: Tok,
    pub literal: Literal,
}

impl DefaultValue {
    pub fn write_to(&self, out: &mut String) {
        self.assign.write_to(out);
        self.literal.write_to(out);
    }
}
