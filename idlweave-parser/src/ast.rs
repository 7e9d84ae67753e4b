//! AST for WebIDL blocks
//!
//!     Every node keeps the [Tok]s it was parsed from, so a node can always be written back
//!     to its exact source text (see [ParsedBlock::to_source]). Convenience accessors such as
//!     [Definition::name] or [Member::is_readonly] read from those tokens.
//!
//!     Structure:
//!         ParsedBlock
//!         └── Definition*          (interface, dictionary, enum, typedef, callback, includes, ...)
//!             ├── ExtAttrList?
//!             ├── Inheritance?
//!             └── Member*          (attribute, operation, constant, field, enum value, ...)
//!                 ├── IdlType      (named | generic | union | nullable)
//!                 └── ArgumentList
//!                     └── Argument (ext attrs, optional, type, name, default)
//!
//!     Members record the name of the container they were written in (`scope`). The
//!     registry may later merge partials and mixins into other containers, but it never
//!     rewrites that field.

pub mod argument;
pub mod definition;
pub mod ext_attr;
pub mod literal;
pub mod member;
pub mod types;

pub use argument::{Argument, ArgumentList};
pub use definition::{Definition, DefinitionBody, DefinitionFamily, DefinitionKind, Inheritance};
pub use ext_attr::{ExtAttrList, ExtAttrRhs, ExtAttrValue, ExtendedAttribute};
pub use literal::{DefaultValue, Literal, LiteralValue};
pub use member::{Member, MemberBody, MemberKind};
pub use types::{IdlType, TypeKind};

use crate::diagnostics::Diagnostic;
use crate::token::Tok;

/// The result of parsing one IDL block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub definitions: Vec<Definition>,
    /// End of input; its trivia holds trailing whitespace and lone comments.
    pub eof: Tok,
    /// Source text the parser could not consume after a syntax error.
    pub remainder: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedBlock {
    pub fn has_errors(&self) -> bool {
        self.remainder.is_some() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Write the block back to source text.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for definition in &self.definitions {
            definition.write_to(&mut out);
        }
        match &self.remainder {
            Some(remainder) => out.push_str(remainder),
            None => out.push_str(&self.eof.trivia),
        }
        out
    }
}

/// Strip the escaping underscore from an identifier (`_readonly` is `readonly`).
pub fn unescape(identifier: &str) -> &str {
    identifier.strip_prefix('_').unwrap_or(identifier)
}

/// Write `items` interleaved with `separators`, item first.
pub(crate) fn write_separated<T>(
    items: &[T],
    separators: &[Tok],
    out: &mut String,
    write_item: impl Fn(&T, &mut String),
) {
    for (index, item) in items.iter().enumerate() {
        write_item(item, out);
        if let Some(separator) = separators.get(index) {
            separator.write_to(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("_readonly"), "readonly");
        assert_eq!(unescape("regular"), "regular");
        assert_eq!(unescape("__x"), "_x");
    }

    #[test]
    fn test_write_separated_handles_trailing_separator() {
        let items = vec![Tok::bare("a"), Tok::bare("b")];
        let mut out = String::new();
        write_separated(&items, &[Tok::bare(","), Tok::bare(",")], &mut out, |t, o| {
            t.write_to(o)
        });
        assert_eq!(out, "a,b,");
    }
}
