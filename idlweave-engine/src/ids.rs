//! Generated identifiers
//!
//!     Anchors:    dom-<definition>                       (definition names)
//!                 dom-<container>-<member>[!overload-N]  (member names)
//!     Wrappers:   idl-def-<definition>
//!                 idl-def-<container>-<member>[!overload-N]
//!
//!     Each part is slugged: lowercased, the escaping `_` dropped, every run of
//!     non-alphanumeric characters folded to a single hyphen, hyphens trimmed. An empty
//!     enum value slugs to `the-empty-string`.
//!
//!     Overload numbers depend on document order across every block, so they are computed
//!     once per build by [AnchorPlan] before any block is rendered: the first member named
//!     `m` in container `c` gets no suffix, the next one `!overload-1`, and so on.

use idlweave_parser::ast::{unescape, Definition, DefinitionKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// Slug one identifier part.
pub fn slug(text: &str) -> String {
    let lower = unescape(text).to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

fn member_slug(member: &str) -> String {
    match slug(member) {
        s if s.is_empty() => "the-empty-string".to_string(),
        s => s,
    }
}

fn overload_suffix(overload: usize) -> String {
    match overload {
        0 => String::new(),
        n => format!("!overload-{n}"),
    }
}

pub fn definition_anchor(name: &str) -> String {
    format!("dom-{}", slug(name))
}

pub fn member_anchor(container: &str, member: &str, overload: usize) -> String {
    format!(
        "dom-{}-{}{}",
        slug(container),
        member_slug(member),
        overload_suffix(overload)
    )
}

pub fn definition_wrapper_id(name: &str) -> String {
    format!("idl-def-{}", slug(name))
}

pub fn member_wrapper_id(container: &str, member: &str, overload: usize) -> String {
    format!(
        "idl-def-{}-{}{}",
        slug(container),
        member_slug(member),
        overload_suffix(overload)
    )
}

/// Position of a definition in the build: block index and definition index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionRef {
    pub block: usize,
    pub definition: usize,
}

/// Position of a member in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberRef {
    pub block: usize,
    pub definition: usize,
    pub member: usize,
}

/// Generated ids for one build, computed before rendering.
#[derive(Debug, Default)]
pub struct AnchorPlan {
    overloads: HashMap<MemberRef, usize>,
    /// Definitions that own the `idl-def-` wrapper id and `dom-` anchor of their name.
    owners: HashSet<DefinitionRef>,
}

impl AnchorPlan {
    /// Walk every block in document order.
    pub fn new<'a, I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = &'a [Definition]>,
    {
        let mut plan = AnchorPlan::default();
        let mut seen_members: HashMap<(String, String), usize> = HashMap::new();
        let mut seen_definitions: HashSet<String> = HashSet::new();

        for (block, definitions) in blocks.into_iter().enumerate() {
            for (index, definition) in definitions.iter().enumerate() {
                let at = DefinitionRef {
                    block,
                    definition: index,
                };
                if !definition.partial
                    && definition.kind != DefinitionKind::Includes
                    && seen_definitions.insert(slug(definition.name()))
                {
                    plan.owners.insert(at);
                }
                for (member_index, member) in definition.members().iter().enumerate() {
                    let Some(name) = member.name() else {
                        continue;
                    };
                    let key = (slug(&member.scope), member_slug(name));
                    let count = seen_members.entry(key).or_insert(0);
                    plan.overloads.insert(
                        MemberRef {
                            block,
                            definition: index,
                            member: member_index,
                        },
                        *count,
                    );
                    *count += 1;
                }
            }
        }
        plan
    }

    /// Overload number of a named member; 0 for the first occurrence.
    pub fn overload(&self, at: MemberRef) -> usize {
        self.overloads.get(&at).copied().unwrap_or(0)
    }

    /// True if this definition carries the ids generated from its name.
    pub fn owns_name(&self, at: DefinitionRef) -> bool {
        self.owners.contains(&at)
    }
}
