//! Type trees: named, generic, union and nullable types.

use super::ext_attr::ExtAttrList;
use super::{unescape, write_separated};
use crate::token::Tok;

#[derive(Debug, Clone, PartialEq)]
pub struct IdlType {
    pub ext_attrs: Option<ExtAttrList>,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A simple name; built-in names may span several tokens (`unsigned long long`).
    Named { tokens: Vec<Tok>, name: String },
    /// `sequence<T>`, `Promise<T>`, `FrozenArray<T>`, `record<K, V>`, ...
    Generic {
        name: Tok,
        open: Tok,
        arguments: Vec<IdlType>,
        separators: Vec<Tok>,
        close: Tok,
    },
    /// `(A or B)`; separators are the `or` tokens.
    Union {
        open: Tok,
        members: Vec<IdlType>,
        separators: Vec<Tok>,
        close: Tok,
    },
    Nullable { inner: Box<IdlType>, question: Tok },
}

impl IdlType {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            ext_attrs: None,
            kind,
        }
    }

    /// The type with any nullable wrapper removed.
    pub fn base(&self) -> &IdlType {
        match &self.kind {
            TypeKind::Nullable { inner, .. } => inner.base(),
            _ => self,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeKind::Nullable { .. })
    }

    /// Name of a simple (possibly nullable) type, unescaped.
    pub fn named(&self) -> Option<&str> {
        match &self.base().kind {
            TypeKind::Named { name, .. } => Some(unescape(name)),
            _ => None,
        }
    }

    /// Every name in the tree that can be linked: simple names and generic names, in
    /// source order.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            TypeKind::Named { name, .. } => names.push(unescape(name)),
            TypeKind::Generic {
                name, arguments, ..
            } => {
                names.push(&name.value);
                for argument in arguments {
                    argument.collect_references(names);
                }
            }
            TypeKind::Union { members, .. } => {
                for member in members {
                    member.collect_references(names);
                }
            }
            TypeKind::Nullable { inner, .. } => inner.collect_references(names),
        }
    }

    /// Trivia before the first token of the type, ext attrs included.
    pub fn leading_trivia(&self) -> &str {
        if let Some(ext_attrs) = &self.ext_attrs {
            return &ext_attrs.open.trivia;
        }
        match &self.kind {
            TypeKind::Named { tokens, .. } => tokens.first().map_or("", |t| t.trivia.as_str()),
            TypeKind::Generic { name, .. } => &name.trivia,
            TypeKind::Union { open, .. } => &open.trivia,
            TypeKind::Nullable { inner, .. } => inner.leading_trivia(),
        }
    }

    pub fn write_to(&self, out: &mut String) {
        if let Some(ext_attrs) = &self.ext_attrs {
            ext_attrs.write_to(out);
        }
        match &self.kind {
            TypeKind::Named { tokens, .. } => {
                for tok in tokens {
                    tok.write_to(out);
                }
            }
            TypeKind::Generic {
                name,
                open,
                arguments,
                separators,
                close,
            } => {
                name.write_to(out);
                open.write_to(out);
                write_separated(arguments, separators, out, |ty, out| ty.write_to(out));
                close.write_to(out);
            }
            TypeKind::Union {
                open,
                members,
                separators,
                close,
            } => {
                open.write_to(out);
                write_separated(members, separators, out, |ty, out| ty.write_to(out));
                close.write_to(out);
            }
            TypeKind::Nullable { inner, question } => {
                inner.write_to(out);
                question.write_to(out);
            }
        }
    }

    /// Source text of the type without its leading trivia.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out[self.leading_trivia().len()..].to_string()
    }
}
