//! Operation, callback and extended attribute arguments.

use super::ext_attr::ExtAttrList;
use super::literal::DefaultValue;
use super::types::IdlType;
use super::{unescape, write_separated};
use crate::token::Tok;

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentList {
    pub open: Tok,
    pub arguments: Vec<Argument>,
    pub separators: Vec<Tok>,
    pub close: Tok,
}

impl ArgumentList {
    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter()
    }

    pub fn write_to(&self, out: &mut String) {
        self.open.write_to(out);
        write_separated(&self.arguments, &self.separators, out, |arg, out| {
            arg.write_to(out)
        });
        self.close.write_to(out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub ext_attrs: Option<ExtAttrList>,
    pub optional: Option<Tok>,
    pub idl_type: IdlType,
    pub variadic: Option<Tok>,
    pub name: Tok,
    pub default: Option<DefaultValue>,
}

impl Argument {
    pub fn name(&self) -> &str {
        unescape(&self.name.value)
    }

    pub fn is_optional(&self) -> bool {
        self.optional.is_some()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    pub fn write_to(&self, out: &mut String) {
        if let Some(ext_attrs) = &self.ext_attrs {
            ext_attrs.write_to(out);
        }
        if let Some(optional) = &self.optional {
            optional.write_to(out);
        }
        self.idl_type.write_to(out);
        if let Some(variadic) = &self.variadic {
            variadic.write_to(out);
        }
        self.name.write_to(out);
        if let Some(default) = &self.default {
            default.write_to(out);
        }
    }
}
