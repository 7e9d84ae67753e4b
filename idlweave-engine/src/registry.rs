//! Definition registry
//!
//!     The registry accumulates every definition of every block of one build, in document
//!     order. It never merges anything in place. Partial fragments and `includes`
//!     statements are kept as append-only edge lists, and the merged view of a container
//!     is assembled on demand by [Registry::merged_members]:
//!
//!         base members → partial fragments' members (document order)
//!                      → members of every included mixin (base mixin, then its partials)
//!
//!     Name matching for merging is exact. Case-insensitive lookups are offered separately
//!     for linking prose references.

use idlweave_parser::ast::{
    Definition, DefinitionFamily, DefinitionKind, ExtendedAttribute, Member,
};
use serde::Serialize;
use std::fmt;

/// Index of a block in the build, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block #{}", self.0)
    }
}

/// A registered definition and where it came from.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub block: BlockId,
    /// Index of the definition inside its block.
    pub index: usize,
    pub definition: &'a Definition,
}

impl<'a> Fragment<'a> {
    pub fn name(&self) -> &'a str {
        self.definition.name()
    }
}

#[derive(Debug, Clone)]
struct IncludesEdge {
    target: String,
    mixin: String,
}

#[derive(Debug, Default)]
pub struct Registry<'a> {
    fragments: Vec<Fragment<'a>>,
    /// Partial fragment positions in `fragments`, keyed by base name.
    partial_edges: Vec<(String, usize)>,
    includes_edges: Vec<IncludesEdge>,
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the definitions of one block. Blocks must be registered in document order.
    pub fn register(&mut self, block: BlockId, definitions: &'a [Definition]) {
        for (index, definition) in definitions.iter().enumerate() {
            if definition.partial {
                self.partial_edges
                    .push((definition.name().to_string(), self.fragments.len()));
            }
            if let Some(mixin) = definition.included_mixin() {
                self.includes_edges.push(IncludesEdge {
                    target: definition.name().to_string(),
                    mixin: mixin.to_string(),
                });
            }
            self.fragments.push(Fragment {
                block,
                index,
                definition,
            });
        }
    }

    pub fn fragments(&self) -> &[Fragment<'a>] {
        &self.fragments
    }

    /// Distinct blocks that registered at least one definition, in document order.
    pub fn blocks(&self) -> Vec<BlockId> {
        let mut blocks: Vec<BlockId> = self.fragments.iter().map(|f| f.block).collect();
        blocks.dedup();
        blocks
    }

    /// The first non-partial definition with this exact name.
    pub fn definition(&self, name: &str) -> Option<&'a Definition> {
        self.base_fragment(name, None).map(|f| f.definition)
    }

    /// Like [Registry::definition], ignoring case.
    pub fn definition_ignore_case(&self, name: &str) -> Option<&'a Definition> {
        let key = name.to_lowercase();
        self.fragments
            .iter()
            .find(|f| is_base(f.definition) && f.definition.key() == key)
            .map(|f| f.definition)
    }

    /// The first non-partial fragment with this name, optionally restricted to a family.
    pub fn base_fragment(&self, name: &str, family: Option<DefinitionFamily>) -> Option<&Fragment<'a>> {
        self.fragments.iter().find(|f| {
            is_base(f.definition)
                && f.name() == name
                && family.map_or(true, |family| f.definition.family() == Some(family))
        })
    }

    /// Partial fragments extending `name` in `family`, in document order.
    pub fn partials(&self, name: &str, family: DefinitionFamily) -> Vec<&Fragment<'a>> {
        self.partial_edges
            .iter()
            .filter(|(base, _)| base == name)
            .map(|(_, position)| &self.fragments[*position])
            .filter(|f| f.definition.family() == Some(family))
            .collect()
    }

    /// Mixins included into `target`, first inclusion order, without repeats.
    pub fn included_mixins(&self, target: &str) -> Vec<&str> {
        let mut mixins: Vec<&str> = Vec::new();
        for edge in self.includes_edges.iter().filter(|e| e.target == target) {
            if !mixins.contains(&edge.mixin.as_str()) {
                mixins.push(&edge.mixin);
            }
        }
        mixins
    }

    /// Fragments that contribute to the merged view of `name`: base, then partials.
    fn own_fragments(&self, name: &str, family: DefinitionFamily) -> Vec<&Fragment<'a>> {
        let mut fragments: Vec<&Fragment<'a>> = self
            .base_fragment(name, Some(family))
            .into_iter()
            .collect();
        fragments.extend(self.partials(name, family));
        fragments
    }

    /// Fragments of `name` plus, for interfaces and namespaces, those of included mixins.
    pub fn merged_fragments(&self, name: &str, family: DefinitionFamily) -> Vec<&Fragment<'a>> {
        let mut fragments = self.own_fragments(name, family);
        if matches!(family, DefinitionFamily::Interface | DefinitionFamily::Namespace) {
            for mixin in self.included_mixins(name) {
                fragments.extend(self.own_fragments(mixin, DefinitionFamily::Mixin));
            }
        }
        fragments
    }

    /// The merged member view of a container.
    pub fn merged_members(&self, name: &str, family: DefinitionFamily) -> Vec<&'a Member> {
        self.merged_fragments(name, family)
            .into_iter()
            .flat_map(|f| f.definition.members())
            .collect()
    }

    /// Extended attributes of the base, its partials and included mixins.
    pub fn merged_extended_attributes(
        &self,
        name: &str,
        family: DefinitionFamily,
    ) -> Vec<&'a ExtendedAttribute> {
        self.merged_fragments(name, family)
            .into_iter()
            .filter_map(|f| f.definition.ext_attrs.as_ref())
            .flat_map(|list| list.iter())
            .collect()
    }

    /// Family of the container called `scope`, taken from its first fragment.
    pub fn family_of(&self, scope: &str) -> Option<DefinitionFamily> {
        self.fragments
            .iter()
            .filter(|f| f.name() == scope)
            .find_map(|f| f.definition.family())
    }

    /// A member of `scope`'s merged view. Enum values are found in their enum.
    pub fn member(&self, scope: &str, name: &str) -> Option<&'a Member> {
        if let Some(family) = self.family_of(scope) {
            return self
                .merged_members(scope, family)
                .into_iter()
                .find(|m| m.name() == Some(name));
        }
        self.fragments
            .iter()
            .filter(|f| f.name() == scope && f.definition.kind == DefinitionKind::Enum)
            .flat_map(|f| f.definition.members())
            .find(|m| m.name() == Some(name))
    }

    /// Partial fragments whose base is not declared anywhere in the build.
    pub fn orphan_partials(&self) -> Vec<&Fragment<'a>> {
        self.partial_edges
            .iter()
            .map(|(_, position)| &self.fragments[*position])
            .filter(|f| {
                f.definition
                    .family()
                    .map_or(true, |family| self.base_fragment(f.name(), Some(family)).is_none())
            })
            .collect()
    }
}

/// A definition that can own a name: not partial and not an includes statement.
fn is_base(definition: &Definition) -> bool {
    !definition.partial && definition.kind != DefinitionKind::Includes
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlweave_parser::{parse, ParsedBlock};

    fn registry(blocks: &[ParsedBlock]) -> Registry<'_> {
        let mut registry = Registry::new();
        for (index, block) in blocks.iter().enumerate() {
            registry.register(BlockId(index), &block.definitions);
        }
        registry
    }

    fn names(members: Vec<&Member>) -> Vec<&str> {
        members.into_iter().filter_map(|m| m.name()).collect()
    }

    #[test]
    fn test_merged_members_order() {
        let blocks = vec![
            parse("partial interface Window { attribute long early; };"),
            parse("interface Window { attribute long own; };\nWindow includes Events;"),
            parse("interface mixin Events { attribute long onload; };\npartial interface mixin Events { attribute long onerror; };"),
            parse("partial interface Window { attribute long late; };"),
        ];
        let registry = registry(&blocks);
        assert_eq!(
            names(registry.merged_members("Window", DefinitionFamily::Interface)),
            vec!["own", "early", "late", "onload", "onerror"]
        );
    }

    #[test]
    fn test_merging_is_exact_case() {
        let blocks = vec![parse("interface Foo {};\npartial interface foo { void f(); };")];
        let registry = registry(&blocks);
        assert!(registry
            .merged_members("Foo", DefinitionFamily::Interface)
            .is_empty());
        assert_eq!(registry.orphan_partials().len(), 1);
        assert!(registry.definition_ignore_case("FOO").is_some());
    }

    #[test]
    fn test_orphan_partial_still_contributes() {
        let blocks = vec![parse("partial dictionary Options { long x; };")];
        let registry = registry(&blocks);
        assert_eq!(
            names(registry.merged_members("Options", DefinitionFamily::Dictionary)),
            vec!["x"]
        );
        let orphans = registry.orphan_partials();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name(), "Options");
        assert!(registry.definition("Options").is_none());
    }

    #[test]
    fn test_merged_extended_attributes_include_mixins_and_partials() {
        let blocks = vec![parse(
            "interface A {};\n[SecureContext] partial interface A {};\nA includes M;\n[Exposed=Window] interface mixin M {};",
        )];
        let registry = registry(&blocks);
        let attrs: Vec<&str> = registry
            .merged_extended_attributes("A", DefinitionFamily::Interface)
            .into_iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(attrs, vec!["SecureContext", "Exposed"]);
    }

    #[test]
    fn test_member_lookup_in_scope() {
        let blocks = vec![parse(
            "dictionary Roselia { DOMString hikawa; };\ndictionary PastelPalettes { DOMString hikawa; };\nenum E { \"one\" };",
        )];
        let registry = registry(&blocks);
        let roselia = registry.member("Roselia", "hikawa").expect("member");
        assert_eq!(roselia.scope, "Roselia");
        let pastel = registry.member("PastelPalettes", "hikawa").expect("member");
        assert_eq!(pastel.scope, "PastelPalettes");
        assert!(registry.member("E", "one").is_some());
        assert!(registry.member("Roselia", "missing").is_none());
    }

    #[test]
    fn test_includes_edges_are_deduplicated() {
        let blocks = vec![parse("A includes M;\nA includes M;\nA includes N;")];
        let registry = registry(&blocks);
        assert_eq!(registry.included_mixins("A"), vec!["M", "N"]);
        assert_eq!(registry.blocks(), vec![BlockId(0)]);
    }
}
