//! Top-level definitions.

use super::argument::ArgumentList;
use super::ext_attr::ExtAttrList;
use super::member::Member;
use super::types::IdlType;
use super::unescape;
use crate::token::Tok;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefinitionKind {
    Interface,
    InterfaceMixin,
    CallbackInterface,
    Namespace,
    Dictionary,
    Enum,
    Typedef,
    Callback,
    Includes,
}

/// Kinds that merge with each other: a `partial interface` extends an `interface`, a
/// `partial interface mixin` extends an `interface mixin`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionFamily {
    Interface,
    Mixin,
    Namespace,
    Dictionary,
}

impl DefinitionKind {
    pub fn family(&self) -> Option<DefinitionFamily> {
        match self {
            DefinitionKind::Interface | DefinitionKind::CallbackInterface => {
                Some(DefinitionFamily::Interface)
            }
            DefinitionKind::InterfaceMixin => Some(DefinitionFamily::Mixin),
            DefinitionKind::Namespace => Some(DefinitionFamily::Namespace),
            DefinitionKind::Dictionary => Some(DefinitionFamily::Dictionary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inheritance {
    pub colon: Tok,
    pub name: Tok,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionBody {
    /// Interfaces, mixins, namespaces, dictionaries and enums.
    Members {
        open: Tok,
        members: Vec<Member>,
        /// Its trivia holds comments that are not attached to any member.
        close: Tok,
        semicolon: Tok,
    },
    /// `typedef <type> <name>;` - the name token follows the type.
    Typedef { idl_type: IdlType, semicolon: Tok },
    /// `callback <name> = <type> (<arguments>);`
    Callback {
        assign: Tok,
        return_type: IdlType,
        arguments: ArgumentList,
        semicolon: Tok,
    },
    /// `<name> includes <mixin>;`
    Includes {
        keyword: Tok,
        mixin: Tok,
        semicolon: Tok,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub ext_attrs: Option<ExtAttrList>,
    pub kind: DefinitionKind,
    pub partial: bool,
    /// Leading keywords: `partial`, `callback`, `interface`, `mixin`, `dictionary`, ...
    pub keywords: Vec<Tok>,
    /// The definition's name; for includes statements, the target interface.
    pub name: Tok,
    pub inheritance: Option<Inheritance>,
    pub body: DefinitionBody,
    /// Byte span of the definition, leading trivia excluded.
    pub span: Range<usize>,
    /// Verbatim source of the definition, leading trivia excluded.
    pub source_text: String,
}

impl Definition {
    pub fn name(&self) -> &str {
        unescape(&self.name.value)
    }

    /// Case-insensitive lookup key.
    pub fn key(&self) -> String {
        self.name().to_lowercase()
    }

    pub fn family(&self) -> Option<DefinitionFamily> {
        self.kind.family()
    }

    pub fn members(&self) -> &[Member] {
        match &self.body {
            DefinitionBody::Members { members, .. } => members,
            _ => &[],
        }
    }

    pub fn inherits_from(&self) -> Option<&str> {
        self.inheritance
            .as_ref()
            .map(|inheritance| unescape(&inheritance.name.value))
    }

    /// For includes statements: the mixin name.
    pub fn included_mixin(&self) -> Option<&str> {
        match &self.body {
            DefinitionBody::Includes { mixin, .. } => Some(unescape(&mixin.value)),
            _ => None,
        }
    }

    pub fn has_ext_attr(&self, name: &str) -> bool {
        self.ext_attrs.as_ref().is_some_and(|list| list.has(name))
    }

    /// The first token of the definition, whose trivia precedes the whole construct.
    pub fn first_tok(&self) -> &Tok {
        match (&self.ext_attrs, self.keywords.first()) {
            (Some(ext_attrs), _) => &ext_attrs.open,
            (None, Some(keyword)) => keyword,
            (None, None) => &self.name,
        }
    }

    pub fn leading_trivia(&self) -> &str {
        &self.first_tok().trivia
    }

    pub fn write_to(&self, out: &mut String) {
        if let Some(ext_attrs) = &self.ext_attrs {
            ext_attrs.write_to(out);
        }
        for keyword in &self.keywords {
            keyword.write_to(out);
        }
        match &self.body {
            DefinitionBody::Members {
                open,
                members,
                close,
                semicolon,
            } => {
                self.name.write_to(out);
                if let Some(inheritance) = &self.inheritance {
                    inheritance.colon.write_to(out);
                    inheritance.name.write_to(out);
                }
                open.write_to(out);
                for member in members {
                    member.write_to(out);
                }
                close.write_to(out);
                semicolon.write_to(out);
            }
            DefinitionBody::Typedef {
                idl_type,
                semicolon,
            } => {
                idl_type.write_to(out);
                self.name.write_to(out);
                semicolon.write_to(out);
            }
            DefinitionBody::Callback {
                assign,
                return_type,
                arguments,
                semicolon,
            } => {
                self.name.write_to(out);
                assign.write_to(out);
                return_type.write_to(out);
                arguments.write_to(out);
                semicolon.write_to(out);
            }
            DefinitionBody::Includes {
                keyword,
                mixin,
                semicolon,
            } => {
                self.name.write_to(out);
                keyword.write_to(out);
                mixin.write_to(out);
                semicolon.write_to(out);
            }
        }
    }
}
