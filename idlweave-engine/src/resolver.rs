//! Reference resolution
//!
//!     Every identifier the renderer emits is resolved here. First match wins:
//!
//!         1. host term definition       `<dfn>` with a matching `for` (global if no scope)
//!         2. registry                   definitions (types) or merged members (names)
//!         3. WebIDL builtin             types only: `DOMString`, `Promise`, ...
//!         4. cross-reference table      types only, filled before rendering
//!         5. unresolved
//!
//!     Resolution is a pure lookup: it never touches the registry or the AST.

use crate::builtins::{extended_attribute_anchor, global_interface, type_anchor, DEFAULT_TOJSON_ANCHOR};
use crate::ids::{definition_anchor, member_anchor};
use crate::kinds::{link_type, DfnType};
use crate::registry::Registry;
use crate::terms::{TermClaims, TermIndex};
use crate::xref::{XrefQuery, XrefTable};
use idlweave_parser::ast::{
    ArgumentList, Definition, DefinitionBody, ExtAttrList, IdlType, MemberBody,
};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// A name in type position, or a definition name.
    Type,
    /// A member name inside a container.
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOrigin {
    Host,
    Local,
    Builtin,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub origin: TargetOrigin,
    pub href: String,
    /// Kind of the thing linked to, e.g. `interface` or `attribute`.
    pub link_type: String,
}

impl Target {
    pub(crate) fn new(origin: TargetOrigin, href: String, link_type: &str) -> Self {
        Self {
            origin,
            href,
            link_type: link_type.to_string(),
        }
    }

    /// Links into the same document.
    pub fn is_internal(&self) -> bool {
        matches!(self.origin, TargetOrigin::Host | TargetOrigin::Local)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Linked(Target),
    Unresolved,
}

impl Resolution {
    pub fn target(&self) -> Option<&Target> {
        match self {
            Resolution::Linked(target) => Some(target),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Linked(_))
    }
}

pub struct Resolver<'r, 'a> {
    registry: &'r Registry<'a>,
    terms: &'r TermIndex,
    claims: &'r TermClaims,
    xref: &'r XrefTable,
    base_url: &'r str,
    cite: &'r [String],
}

impl<'r, 'a> Resolver<'r, 'a> {
    pub fn new(
        registry: &'r Registry<'a>,
        terms: &'r TermIndex,
        claims: &'r TermClaims,
        xref: &'r XrefTable,
        base_url: &'r str,
    ) -> Self {
        Self {
            registry,
            terms,
            claims,
            xref,
            base_url,
            cite: &[],
        }
    }

    /// Resolve with a block's citation hints.
    pub fn with_cite(&self, cite: &'r [String]) -> Self {
        Self { cite, ..*self }
    }

    pub fn resolve(&self, identifier: &str, kind: ReferenceKind, scope: Option<&str>) -> Resolution {
        match self.resolve_local(identifier, kind, scope) {
            Some(target) => Resolution::Linked(target),
            None if kind == ReferenceKind::Type => self
                .external(identifier)
                .map_or(Resolution::Unresolved, Resolution::Linked),
            None => Resolution::Unresolved,
        }
    }

    /// Steps 1 to 3; what remains needs an external lookup.
    fn resolve_local(&self, identifier: &str, kind: ReferenceKind, scope: Option<&str>) -> Option<Target> {
        let scope = match kind {
            ReferenceKind::Type => None,
            ReferenceKind::Name => scope,
        };
        if let Some(target) = self.host(identifier, scope) {
            return Some(target);
        }
        match scope {
            None => {
                if let Some(definition) = self.registry.definition(identifier) {
                    return Some(Target::new(
                        TargetOrigin::Local,
                        format!("#{}", definition_anchor(identifier)),
                        link_type(definition.kind),
                    ));
                }
            }
            Some(scope) => {
                if let Some(member) = self.registry.member(scope, identifier) {
                    let link = DfnType::of_member(member.kind).map_or("idl", |t| t.as_str());
                    return Some(Target::new(
                        TargetOrigin::Local,
                        format!("#{}", member_anchor(scope, identifier, 0)),
                        link,
                    ));
                }
            }
        }
        if kind == ReferenceKind::Type {
            return type_anchor(identifier).map(|anchor| {
                Target::new(TargetOrigin::Builtin, self.webidl_url(&anchor), "interface")
            });
        }
        None
    }

    fn host(&self, identifier: &str, scope: Option<&str>) -> Option<Target> {
        let term = *self.terms.matching(scope, identifier).first()?;
        let annotation = self.claims.annotation(term)?;
        let link = annotation.dfn_type.map_or("dfn", |t| t.as_str());
        Some(Target::new(TargetOrigin::Host, annotation.href(), link))
    }

    fn external(&self, identifier: &str) -> Option<Target> {
        let query = XrefQuery::new(identifier, ReferenceKind::Type, self.cite);
        self.xref
            .get(&query)
            .map(|entry| Target::new(TargetOrigin::External, entry.url.clone(), &entry.kind))
    }

    /// True when no local source resolves this type name.
    pub fn needs_lookup(&self, identifier: &str) -> bool {
        self.resolve_local(identifier, ReferenceKind::Type, None).is_none()
    }

    pub fn resolve_extended_attribute(&self, name: &str) -> Resolution {
        match extended_attribute_anchor(name) {
            Some(anchor) => Resolution::Linked(Target::new(
                TargetOrigin::Builtin,
                self.webidl_url(&anchor),
                "extended-attribute",
            )),
            None => Resolution::Unresolved,
        }
    }

    /// `[Exposed=Worker]` names the `WorkerGlobalScope` interface.
    pub fn resolve_global(&self, name: &str) -> Resolution {
        match global_interface(name) {
            Some(interface) => self.resolve(interface, ReferenceKind::Type, None),
            None => Resolution::Unresolved,
        }
    }

    /// Link target of a `[Default] toJSON()` the host does not define.
    pub fn default_tojson(&self) -> Target {
        Target::new(
            TargetOrigin::Builtin,
            self.webidl_url(DEFAULT_TOJSON_ANCHOR),
            "method",
        )
    }

    fn webidl_url(&self, anchor: &str) -> String {
        format!("{}#{}", self.base_url, anchor)
    }
}

/// Every name in a definition that resolves as a type: type leaves, inheritance,
/// `includes` operands, partial names and the globals named by `[Exposed]`/`[Global]`.
/// Each name appears once, at its first occurrence.
pub fn referenced_types(definition: &Definition) -> Vec<String> {
    let mut names = Vec::new();
    collect_ext_attrs(definition.ext_attrs.as_ref(), &mut names);
    if definition.partial {
        names.push(definition.name().to_string());
    }
    if let Some(parent) = definition.inherits_from() {
        names.push(parent.to_string());
    }
    match &definition.body {
        DefinitionBody::Members { members, .. } => {
            for member in members {
                collect_ext_attrs(member.ext_attrs.as_ref(), &mut names);
                if let Some(ty) = member.idl_type() {
                    collect_type(ty, &mut names);
                }
                if let MemberBody::Declaration { types, .. } = &member.body {
                    types.iter().for_each(|ty| collect_type(ty, &mut names));
                }
                if let Some(arguments) = member.arguments() {
                    collect_arguments(arguments, &mut names);
                }
            }
        }
        DefinitionBody::Typedef { idl_type, .. } => collect_type(idl_type, &mut names),
        DefinitionBody::Callback {
            return_type,
            arguments,
            ..
        } => {
            collect_type(return_type, &mut names);
            collect_arguments(arguments, &mut names);
        }
        DefinitionBody::Includes { .. } => {
            names.push(definition.name().to_string());
            if let Some(mixin) = definition.included_mixin() {
                names.push(mixin.to_string());
            }
        }
    }
    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    names
}

fn collect_type(ty: &IdlType, names: &mut Vec<String>) {
    collect_ext_attrs(ty.ext_attrs.as_ref(), names);
    names.extend(ty.references().into_iter().map(str::to_string));
}

fn collect_arguments(arguments: &ArgumentList, names: &mut Vec<String>) {
    for argument in arguments.iter() {
        collect_ext_attrs(argument.ext_attrs.as_ref(), names);
        collect_type(&argument.idl_type, names);
    }
}

fn collect_ext_attrs(list: Option<&ExtAttrList>, names: &mut Vec<String>) {
    let Some(list) = list else {
        return;
    };
    for attr in list.iter() {
        if matches!(attr.name(), "Exposed" | "Global") {
            names.extend(
                attr.rhs_identifiers()
                    .into_iter()
                    .filter_map(global_interface)
                    .map(str::to_string),
            );
        }
        if let Some(arguments) = &attr.arguments {
            collect_arguments(arguments, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TermDefinition;
    use crate::ids::AnchorPlan;
    use crate::registry::BlockId;
    use crate::xref::XrefEntry;
    use idlweave_parser::parse;

    const BASE: &str = "https://webidl.spec.whatwg.org/";

    #[test]
    fn test_precedence() {
        let block = parse(
            "interface Foo { attribute Performance perf; attribute Bar bar; };\ndictionary Bar { long x; };",
        );
        let terms = vec![TermDefinition::new("Performance"), TermDefinition::new("x").for_scope("Bar")];
        let mut registry = Registry::new();
        registry.register(BlockId(0), &block.definitions);
        let index = TermIndex::new(&terms);
        let plan = AnchorPlan::new([block.definitions.as_slice()]);
        let claims = TermClaims::build(&terms, &index, [block.definitions.as_slice()], &plan);
        let mut xref = XrefTable::new();
        xref.record(
            XrefQuery::new("EventTarget", ReferenceKind::Type, &[]),
            vec![XrefEntry::new("https://dom.spec.whatwg.org/#eventtarget", "dom", "interface")],
        );
        let resolver = Resolver::new(&registry, &index, &claims, &xref, BASE);

        let host = resolver.resolve("Performance", ReferenceKind::Type, None);
        assert_eq!(host.target().map(|t| t.href.as_str()), Some("#dfn-performance"));

        let local = resolver.resolve("Bar", ReferenceKind::Type, None);
        let local = local.target().unwrap();
        assert_eq!((local.href.as_str(), local.link_type.as_str()), ("#dom-bar", "dictionary"));

        let claimed = resolver.resolve("x", ReferenceKind::Name, Some("Bar"));
        assert_eq!(claimed.target().unwrap().origin, TargetOrigin::Host);
        assert_eq!(claimed.target().unwrap().href, "#dom-bar-x");

        let member = resolver.resolve("bar", ReferenceKind::Name, Some("Foo"));
        assert_eq!(member.target().unwrap().href, "#dom-foo-bar");

        let builtin = resolver.resolve("unsigned long long", ReferenceKind::Type, None);
        assert_eq!(
            builtin.target().unwrap().href,
            "https://webidl.spec.whatwg.org/#idl-unsigned-long-long"
        );

        let external = resolver.resolve("EventTarget", ReferenceKind::Type, None);
        assert_eq!(external.target().unwrap().origin, TargetOrigin::External);

        assert_eq!(
            resolver.resolve("Nothing", ReferenceKind::Type, None),
            Resolution::Unresolved
        );
        assert!(!resolver.needs_lookup("DOMString"));
        assert!(resolver.needs_lookup("EventTarget"));
    }

    #[test]
    fn test_names_do_not_fall_back_to_builtins() {
        let registry = Registry::new();
        let index = TermIndex::default();
        let claims = TermClaims::default();
        let xref = XrefTable::new();
        let resolver = Resolver::new(&registry, &index, &claims, &xref, BASE);
        assert!(!resolver
            .resolve("DOMString", ReferenceKind::Name, Some("Foo"))
            .is_resolved());
        assert_eq!(
            resolver.resolve_extended_attribute("Default").target().unwrap().href,
            "https://webidl.spec.whatwg.org/#Default"
        );
        assert!(!resolver.resolve_extended_attribute("Something").is_resolved());
        assert_eq!(
            resolver.default_tojson().href,
            "https://webidl.spec.whatwg.org/#default-tojson-operation"
        );
    }

    #[test]
    fn test_referenced_types() {
        let block = parse(
            "[Exposed=(Window,Worker), Constructor(sequence<Foo> foos)]\ninterface A : B {\n  attribute (C or D) cd;\n  Promise<E> run(optional F f);\n  maplike<G, H>;\n};",
        );
        assert_eq!(
            referenced_types(&block.definitions[0]),
            vec![
                "Window",
                "WorkerGlobalScope",
                "sequence",
                "Foo",
                "B",
                "C",
                "D",
                "Promise",
                "E",
                "F",
                "G",
                "H"
            ]
        );
    }

    #[test]
    fn test_referenced_types_are_unique() {
        let block = parse(
            "[Exposed=Window]\ninterface A {\n  attribute Foo first;\n  attribute long n;\n  Foo second(Foo f, long m);\n};",
        );
        assert_eq!(
            referenced_types(&block.definitions[0]),
            vec!["Window", "Foo", "long"]
        );
    }
}
