//! Closed vocabularies of the rendered markup contract.
//!
//! Rendering and validation work with these enums; the strings the host sees
//! (`data-dfn-type`, `data-idl`, CSS classes) only appear in the `as_str` methods.

use idlweave_parser::ast::{DefinitionKind, MemberKind};
use serde::Serialize;

/// Value of `data-dfn-type` on a definition anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DfnType {
    Interface,
    Namespace,
    Dictionary,
    Enum,
    Typedef,
    Callback,
    Attribute,
    Method,
    Const,
    DictMember,
    EnumValue,
}

impl DfnType {
    pub fn of_definition(kind: DefinitionKind) -> Option<DfnType> {
        match kind {
            DefinitionKind::Interface
            | DefinitionKind::InterfaceMixin
            | DefinitionKind::CallbackInterface => Some(DfnType::Interface),
            DefinitionKind::Namespace => Some(DfnType::Namespace),
            DefinitionKind::Dictionary => Some(DfnType::Dictionary),
            DefinitionKind::Enum => Some(DfnType::Enum),
            DefinitionKind::Typedef => Some(DfnType::Typedef),
            DefinitionKind::Callback => Some(DfnType::Callback),
            DefinitionKind::Includes => None,
        }
    }

    /// Only named members have a dfn type.
    pub fn of_member(kind: MemberKind) -> Option<DfnType> {
        match kind {
            MemberKind::Attribute => Some(DfnType::Attribute),
            MemberKind::Constant => Some(DfnType::Const),
            MemberKind::Field => Some(DfnType::DictMember),
            MemberKind::EnumValue => Some(DfnType::EnumValue),
            MemberKind::Constructor => Some(DfnType::Method),
            kind if kind.is_operation() => Some(DfnType::Method),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DfnType::Interface => "interface",
            DfnType::Namespace => "namespace",
            DfnType::Dictionary => "dictionary",
            DfnType::Enum => "enum",
            DfnType::Typedef => "typedef",
            DfnType::Callback => "callback",
            DfnType::Attribute => "attribute",
            DfnType::Method => "method",
            DfnType::Const => "const",
            DfnType::DictMember => "dict-member",
            DfnType::EnumValue => "enum-value",
        }
    }
}

/// Value of the `data-idl` attribute. Exactly these eight values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdlKind {
    Interface,
    Attribute,
    Operation,
    Dictionary,
    Field,
    Enum,
    EnumValue,
    Partial,
}

impl IdlKind {
    pub fn of_definition(kind: DefinitionKind) -> Option<IdlKind> {
        match kind {
            DefinitionKind::Interface
            | DefinitionKind::InterfaceMixin
            | DefinitionKind::CallbackInterface
            | DefinitionKind::Namespace => Some(IdlKind::Interface),
            DefinitionKind::Dictionary => Some(IdlKind::Dictionary),
            DefinitionKind::Enum => Some(IdlKind::Enum),
            _ => None,
        }
    }

    pub fn of_member(kind: MemberKind) -> Option<IdlKind> {
        match kind {
            MemberKind::Attribute => Some(IdlKind::Attribute),
            MemberKind::Field => Some(IdlKind::Field),
            MemberKind::EnumValue => Some(IdlKind::EnumValue),
            MemberKind::Constructor => Some(IdlKind::Operation),
            kind if kind.is_operation() => Some(IdlKind::Operation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdlKind::Interface => "interface",
            IdlKind::Attribute => "attribute",
            IdlKind::Operation => "operation",
            IdlKind::Dictionary => "dictionary",
            IdlKind::Field => "field",
            IdlKind::Enum => "enum",
            IdlKind::EnumValue => "enum-value",
            IdlKind::Partial => "partial",
        }
    }
}

/// CSS class of a definition wrapper.
pub fn definition_class(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::Interface
        | DefinitionKind::InterfaceMixin
        | DefinitionKind::CallbackInterface => "idlInterface",
        DefinitionKind::Namespace => "idlNamespace",
        DefinitionKind::Dictionary => "idlDictionary",
        DefinitionKind::Enum => "idlEnum",
        DefinitionKind::Typedef => "idlTypedef",
        DefinitionKind::Callback => "idlCallback",
        DefinitionKind::Includes => "idlIncludes",
    }
}

/// CSS class of a member wrapper.
pub fn member_class(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::Attribute => "idlAttribute",
        MemberKind::Constructor => "idlCtor",
        MemberKind::Constant => "idlConst",
        MemberKind::Field => "idlMember",
        MemberKind::EnumValue => "idlEnumItem",
        MemberKind::Iterable | MemberKind::AsyncIterable => "idlIterable",
        MemberKind::Maplike => "idlMaplike",
        MemberKind::Setlike => "idlSetlike",
        MemberKind::Operation
        | MemberKind::Stringifier
        | MemberKind::Getter
        | MemberKind::Setter
        | MemberKind::Deleter => "idlMethod",
    }
}

/// The kind a local link to a definition carries in `data-link-type`.
pub fn link_type(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::Interface
        | DefinitionKind::InterfaceMixin
        | DefinitionKind::CallbackInterface => "interface",
        DefinitionKind::Namespace => "namespace",
        DefinitionKind::Dictionary => "dictionary",
        DefinitionKind::Enum => "enum",
        DefinitionKind::Typedef => "typedef",
        DefinitionKind::Callback => "callback",
        DefinitionKind::Includes => "interface",
    }
}
