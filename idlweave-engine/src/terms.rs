//! Host term definitions
//!
//!     Authors may define IDL names in prose with `<dfn>`. Before rendering, every IDL
//!     definition and named member is matched against those terms in document order:
//!
//!         definition `Foo`            ← dfn "Foo" with no `for`
//!         member `bar` of `Foo`       ← dfn "bar" for "Foo", or dfn "Foo.bar" / "Foo/bar"
//!
//!     Each dfn is claimed at most once, so the k-th overload of `bar` takes the k-th
//!     matching dfn. A claimed dfn receives the IDL anchor as its id (unless the author
//!     wrote one) and the IDL metadata; the rendered name then links to it instead of
//!     defining itself. Matching is case-sensitive. Call parentheses (`bar()`, `bar(x)`)
//!     and enum value quotes are ignored.
//!
//!     Partial definitions and `includes` statements never claim a dfn for their name.

use crate::host::TermDefinition;
use crate::ids::{definition_anchor, member_anchor, slug, AnchorPlan, DefinitionRef, MemberRef};
use crate::kinds::{DfnType, IdlKind};
use idlweave_parser::ast::{Definition, DefinitionKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)[./](.+)$").expect("valid qualified name pattern")
});

static CALL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*\)$").expect("valid call suffix pattern"));

#[derive(Debug, Clone, PartialEq)]
struct TermKey {
    term: usize,
    for_scope: Option<String>,
    name: String,
}

/// Reduce a dfn text to its (scope, name) lookup key.
fn term_key(text: &str, for_scope: Option<&str>) -> (Option<String>, String) {
    let text = CALL_SUFFIX.replace(text.trim(), "");
    let (scope, name) = match for_scope {
        Some(scope) => (Some(scope.to_string()), text.to_string()),
        None => match QUALIFIED.captures(&text) {
            Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
            None => (None, text.to_string()),
        },
    };
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .map(str::to_string)
        .unwrap_or(name);
    (scope, name)
}

/// Lookup over the host's term definitions.
#[derive(Debug, Default)]
pub struct TermIndex {
    keys: Vec<TermKey>,
}

impl TermIndex {
    pub fn new(terms: &[TermDefinition]) -> Self {
        let mut keys = Vec::new();
        for (term, definition) in terms.iter().enumerate() {
            let texts = std::iter::once(&definition.text).chain(&definition.alternates);
            for text in texts {
                let (for_scope, name) = term_key(text, definition.for_scope.as_deref());
                keys.push(TermKey {
                    term,
                    for_scope,
                    name,
                });
            }
        }
        Self { keys }
    }

    /// Terms matching `name` in `scope` (global terms when `scope` is `None`), in document
    /// order and without repeats.
    pub fn matching(&self, scope: Option<&str>, name: &str) -> Vec<usize> {
        let mut terms: Vec<usize> = Vec::new();
        for key in &self.keys {
            if key.for_scope.as_deref() == scope && key.name == name && !terms.contains(&key.term) {
                terms.push(key.term);
            }
        }
        terms
    }

    /// Terms matching `name` in `scope`, ignoring case.
    pub fn matching_ignore_case(&self, scope: Option<&str>, name: &str) -> Vec<usize> {
        let name = name.to_lowercase();
        let scope = scope.map(str::to_lowercase);
        let mut terms: Vec<usize> = Vec::new();
        for key in &self.keys {
            if key.for_scope.as_ref().map(|s| s.to_lowercase()) == scope
                && key.name.to_lowercase() == name
                && !terms.contains(&key.term)
            {
                terms.push(key.term);
            }
        }
        terms
    }
}

/// What the build tells the host about one of its `<dfn>`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermAnnotation {
    pub text: String,
    pub id: String,
    pub dfn_type: Option<DfnType>,
    pub for_scope: Option<String>,
    pub idl: Option<IdlKind>,
    pub export: bool,
}

impl TermAnnotation {
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }

    pub fn claimed(&self) -> bool {
        self.idl.is_some() || self.dfn_type.is_some()
    }
}

/// Terms claimed by IDL definitions and members.
#[derive(Debug, Default)]
pub struct TermClaims {
    annotations: Vec<TermAnnotation>,
    definitions: HashMap<DefinitionRef, usize>,
    members: HashMap<MemberRef, usize>,
}

impl TermClaims {
    /// Walk every block in document order and let each definition and member claim the
    /// first matching dfn nobody claimed before it.
    pub fn build<'a, I>(
        terms: &[TermDefinition],
        index: &TermIndex,
        blocks: I,
        plan: &AnchorPlan,
    ) -> Self
    where
        I: IntoIterator<Item = &'a [Definition]>,
    {
        let mut claims = TermClaims {
            annotations: terms
                .iter()
                .map(|term| TermAnnotation {
                    text: term.text.clone(),
                    id: term
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("dfn-{}", slug(&term.text))),
                    dfn_type: None,
                    for_scope: term.for_scope.clone(),
                    idl: None,
                    export: false,
                })
                .collect(),
            ..Default::default()
        };
        let mut taken = vec![false; terms.len()];
        let mut take = |scope: Option<&str>, name: &str| {
            let term = index
                .matching(scope, name)
                .into_iter()
                .find(|&term| !taken[term])?;
            taken[term] = true;
            Some(term)
        };

        for (block, definitions) in blocks.into_iter().enumerate() {
            for (position, definition) in definitions.iter().enumerate() {
                let at = DefinitionRef {
                    block,
                    definition: position,
                };
                if !definition.partial && definition.kind != DefinitionKind::Includes {
                    if let Some(term) = take(None, definition.name()) {
                        let explicit = terms[term].id.clone();
                        let annotation = &mut claims.annotations[term];
                        annotation.id =
                            explicit.unwrap_or_else(|| definition_anchor(definition.name()));
                        annotation.dfn_type = DfnType::of_definition(definition.kind);
                        annotation.for_scope = None;
                        annotation.idl = IdlKind::of_definition(definition.kind);
                        annotation.export = plan.owns_name(at);
                        claims.definitions.insert(at, term);
                    }
                }
                for (index, member) in definition.members().iter().enumerate() {
                    let Some(name) = member.name() else {
                        continue;
                    };
                    let Some(dfn_type) = DfnType::of_member(member.kind) else {
                        continue;
                    };
                    let at = MemberRef {
                        block,
                        definition: position,
                        member: index,
                    };
                    if let Some(term) = take(Some(&member.scope), name) {
                        let explicit = terms[term].id.clone();
                        let annotation = &mut claims.annotations[term];
                        annotation.id = explicit.unwrap_or_else(|| {
                            member_anchor(&member.scope, name, plan.overload(at))
                        });
                        annotation.dfn_type = Some(dfn_type);
                        annotation.for_scope = Some(member.scope.clone());
                        annotation.idl = IdlKind::of_member(member.kind);
                        annotation.export = !definition.partial;
                        claims.members.insert(at, term);
                    }
                }
            }
        }
        claims
    }

    pub fn annotations(&self) -> &[TermAnnotation] {
        &self.annotations
    }

    pub fn annotation(&self, term: usize) -> Option<&TermAnnotation> {
        self.annotations.get(term)
    }

    pub fn definition(&self, at: DefinitionRef) -> Option<&TermAnnotation> {
        self.definitions
            .get(&at)
            .and_then(|&term| self.annotations.get(term))
    }

    pub fn member(&self, at: MemberRef) -> Option<&TermAnnotation> {
        self.members
            .get(&at)
            .and_then(|&term| self.annotations.get(term))
    }

    pub fn into_annotations(self) -> Vec<TermAnnotation> {
        self.annotations
    }
}
