//! Extended attribute lists: `[A, B(args), C=D, E=(F, G), H=I(args), J="s", K=*]`

use super::argument::ArgumentList;
use super::{unescape, write_separated};
use crate::token::Tok;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtAttrList {
    pub open: Tok,
    pub items: Vec<ExtendedAttribute>,
    pub separators: Vec<Tok>,
    pub close: Tok,
}

impl ExtAttrList {
    pub fn iter(&self) -> impl Iterator<Item = &ExtendedAttribute> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ExtendedAttribute> {
        self.items.iter().find(|attr| attr.name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn write_to(&self, out: &mut String) {
        self.open.write_to(out);
        write_separated(&self.items, &self.separators, out, |attr, out| {
            attr.write_to(out)
        });
        self.close.write_to(out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedAttribute {
    pub name: Tok,
    pub rhs: Option<ExtAttrRhs>,
    pub arguments: Option<ArgumentList>,
}

impl ExtendedAttribute {
    pub fn name(&self) -> &str {
        &self.name.value
    }

    /// Identifiers on the right-hand side, e.g. `Window` and `Worker` in
    /// `Exposed=(Window,Worker)`.
    pub fn rhs_identifiers(&self) -> Vec<&str> {
        match self.rhs.as_ref().map(|rhs| &rhs.value) {
            Some(ExtAttrValue::Identifier(tok)) => vec![unescape(&tok.value)],
            Some(ExtAttrValue::List { items, .. }) => {
                items.iter().map(|tok| unescape(&tok.value)).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn write_to(&self, out: &mut String) {
        self.name.write_to(out);
        if let Some(rhs) = &self.rhs {
            rhs.assign.write_to(out);
            rhs.value.write_to(out);
        }
        if let Some(arguments) = &self.arguments {
            arguments.write_to(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtAttrRhs {
    pub assign: Tok,
    pub value: ExtAttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtAttrValue {
    Identifier(Tok),
    String(Tok),
    Integer(Tok),
    Decimal(Tok),
    Wildcard(Tok),
    List {
        open: Tok,
        items: Vec<Tok>,
        separators: Vec<Tok>,
        close: Tok,
    },
}

impl ExtAttrValue {
    pub fn write_to(&self, out: &mut String) {
        match self {
            ExtAttrValue::Identifier(tok)
            | ExtAttrValue::String(tok)
            | ExtAttrValue::Integer(tok)
            | ExtAttrValue::Decimal(tok)
            | ExtAttrValue::Wildcard(tok) => tok.write_to(out),
            ExtAttrValue::List {
                open,
                items,
                separators,
                close,
            } => {
                open.write_to(out);
                write_separated(items, separators, out, |tok, out| tok.write_to(out));
                close.write_to(out);
            }
        }
    }
}
