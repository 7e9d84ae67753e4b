//! Members of interfaces, mixins, namespaces, dictionaries and enums.

use super::argument::ArgumentList;
use super::ext_attr::ExtAttrList;
use super::literal::{DefaultValue, Literal};
use super::types::IdlType;
use super::{unescape, write_separated};
use crate::token::Tok;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    Attribute,
    Operation,
    Constructor,
    Constant,
    Field,
    EnumValue,
    Iterable,
    AsyncIterable,
    Maplike,
    Setlike,
    /// A stringifier operation, including the bare `stringifier;`.
    Stringifier,
    Getter,
    Setter,
    Deleter,
}

impl MemberKind {
    /// Operation-like members, rendered and linked as methods.
    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            MemberKind::Operation
                | MemberKind::Stringifier
                | MemberKind::Getter
                | MemberKind::Setter
                | MemberKind::Deleter
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberBody {
    Attribute {
        /// `static`, `stringifier`, `inherit`, `readonly` in source order.
        modifiers: Vec<Tok>,
        keyword: Tok,
        idl_type: IdlType,
        name: Tok,
        semicolon: Tok,
    },
    Operation {
        /// `static` or a special keyword (`getter`, `setter`, `deleter`, `stringifier`).
        modifiers: Vec<Tok>,
        /// Absent for the bare `stringifier;`.
        return_type: Option<IdlType>,
        name: Option<Tok>,
        arguments: Option<ArgumentList>,
        semicolon: Tok,
    },
    Constructor {
        keyword: Tok,
        arguments: ArgumentList,
        semicolon: Tok,
    },
    Constant {
        keyword: Tok,
        idl_type: IdlType,
        name: Tok,
        assign: Tok,
        value: Literal,
        semicolon: Tok,
    },
    Field {
        required: Option<Tok>,
        idl_type: IdlType,
        name: Tok,
        default: Option<DefaultValue>,
        semicolon: Tok,
    },
    EnumValue {
        /// The string literal, quotes included.
        value: Tok,
        separator: Option<Tok>,
    },
    /// `iterable<>`, `async iterable<>`, `maplike<>`, `setlike<>`.
    Declaration {
        /// `readonly` or `async`.
        modifiers: Vec<Tok>,
        keyword: Tok,
        open: Tok,
        types: Vec<IdlType>,
        separators: Vec<Tok>,
        close: Tok,
        arguments: Option<ArgumentList>,
        semicolon: Tok,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub ext_attrs: Option<ExtAttrList>,
    pub kind: MemberKind,
    /// Name of the container the member was written in. Fixed at parse time.
    pub scope: String,
    pub body: MemberBody,
}

impl Member {
    /// The member's identifier, unescaped. Enum values yield their string contents.
    pub fn name(&self) -> Option<&str> {
        match &self.body {
            MemberBody::EnumValue { value, .. } => Some(strip_quotes(&value.value)),
            MemberBody::Constructor { keyword, .. } => Some(&keyword.value),
            _ => self.name_tok().map(|tok| unescape(&tok.value)),
        }
    }

    /// The token holding the member's name, as written.
    pub fn name_tok(&self) -> Option<&Tok> {
        match &self.body {
            MemberBody::Attribute { name, .. }
            | MemberBody::Constant { name, .. }
            | MemberBody::Field { name, .. } => Some(name),
            MemberBody::Operation { name, .. } => name.as_ref(),
            MemberBody::EnumValue { value, .. } => Some(value),
            MemberBody::Constructor { keyword, .. } => Some(keyword),
            MemberBody::Declaration { .. } => None,
        }
    }

    pub fn idl_type(&self) -> Option<&IdlType> {
        match &self.body {
            MemberBody::Attribute { idl_type, .. }
            | MemberBody::Constant { idl_type, .. }
            | MemberBody::Field { idl_type, .. } => Some(idl_type),
            MemberBody::Operation { return_type, .. } => return_type.as_ref(),
            _ => None,
        }
    }

    pub fn arguments(&self) -> Option<&ArgumentList> {
        match &self.body {
            MemberBody::Operation { arguments, .. }
            | MemberBody::Declaration { arguments, .. } => arguments.as_ref(),
            MemberBody::Constructor { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    fn has_modifier(&self, word: &str) -> bool {
        match &self.body {
            MemberBody::Attribute { modifiers, .. }
            | MemberBody::Operation { modifiers, .. }
            | MemberBody::Declaration { modifiers, .. } => {
                modifiers.iter().any(|tok| tok.value == word)
            }
            _ => false,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.has_modifier("readonly")
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }

    pub fn is_stringifier(&self) -> bool {
        self.has_modifier("stringifier")
    }

    pub fn is_required(&self) -> bool {
        matches!(
            &self.body,
            MemberBody::Field {
                required: Some(_),
                ..
            }
        )
    }

    /// Default value of a field, or the value of a constant.
    pub fn default(&self) -> Option<&Literal> {
        match &self.body {
            MemberBody::Field { default, .. } => default.as_ref().map(|d| &d.literal),
            MemberBody::Constant { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn has_ext_attr(&self, name: &str) -> bool {
        self.ext_attrs.as_ref().is_some_and(|list| list.has(name))
    }

    /// Trivia before the member's first token.
    pub fn leading_trivia(&self) -> &str {
        if let Some(ext_attrs) = &self.ext_attrs {
            return &ext_attrs.open.trivia;
        }
        match &self.body {
            MemberBody::Attribute {
                modifiers, keyword, ..
            } => &modifiers.first().unwrap_or(keyword).trivia,
            MemberBody::Operation {
                modifiers,
                return_type,
                semicolon,
                ..
            } => match (modifiers.first(), return_type) {
                (Some(first), _) => &first.trivia,
                (None, Some(ty)) => ty.leading_trivia(),
                (None, None) => &semicolon.trivia,
            },
            MemberBody::Constructor { keyword, .. } | MemberBody::Constant { keyword, .. } => {
                &keyword.trivia
            }
            MemberBody::Field {
                required, idl_type, ..
            } => match required {
                Some(tok) => &tok.trivia,
                None => idl_type.leading_trivia(),
            },
            MemberBody::EnumValue { value, .. } => &value.trivia,
            MemberBody::Declaration {
                modifiers, keyword, ..
            } => &modifiers.first().unwrap_or(keyword).trivia,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        if let Some(ext_attrs) = &self.ext_attrs {
            ext_attrs.write_to(out);
        }
        match &self.body {
            MemberBody::Attribute {
                modifiers,
                keyword,
                idl_type,
                name,
                semicolon,
            } => {
                modifiers.iter().for_each(|tok| tok.write_to(out));
                keyword.write_to(out);
                idl_type.write_to(out);
                name.write_to(out);
                semicolon.write_to(out);
            }
            MemberBody::Operation {
                modifiers,
                return_type,
                name,
                arguments,
                semicolon,
            } => {
                modifiers.iter().for_each(|tok| tok.write_to(out));
                if let Some(ty) = return_type {
                    ty.write_to(out);
                }
                if let Some(name) = name {
                    name.write_to(out);
                }
                if let Some(arguments) = arguments {
                    arguments.write_to(out);
                }
                semicolon.write_to(out);
            }
            MemberBody::Constructor {
                keyword,
                arguments,
                semicolon,
            } => {
                keyword.write_to(out);
                arguments.write_to(out);
                semicolon.write_to(out);
            }
            MemberBody::Constant {
                keyword,
                idl_type,
                name,
                assign,
                value,
                semicolon,
            } => {
                keyword.write_to(out);
                idl_type.write_to(out);
                name.write_to(out);
                assign.write_to(out);
                value.write_to(out);
                semicolon.write_to(out);
            }
            MemberBody::Field {
                required,
                idl_type,
                name,
                default,
                semicolon,
            } => {
                if let Some(required) = required {
                    required.write_to(out);
                }
                idl_type.write_to(out);
                name.write_to(out);
                if let Some(default) = default {
                    default.write_to(out);
                }
                semicolon.write_to(out);
            }
            MemberBody::EnumValue { value, separator } => {
                value.write_to(out);
                if let Some(separator) = separator {
                    separator.write_to(out);
                }
            }
            MemberBody::Declaration {
                modifiers,
                keyword,
                open,
                types,
                separators,
                close,
                arguments,
                semicolon,
            } => {
                modifiers.iter().for_each(|tok| tok.write_to(out));
                keyword.write_to(out);
                open.write_to(out);
                write_separated(types, separators, out, |ty, out| ty.write_to(out));
                close.write_to(out);
                if let Some(arguments) = arguments {
                    arguments.write_to(out);
                }
                semicolon.write_to(out);
            }
        }
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
