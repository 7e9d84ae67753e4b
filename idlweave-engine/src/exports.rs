//! Exported terms
//!
//! The names other documents may link to: every non-partial definition that owns its
//! name, and the named members written directly inside it. Members contributed by
//! partials and mixins are left out.

use crate::ids::{definition_anchor, member_anchor, AnchorPlan, DefinitionRef, MemberRef};
use crate::kinds::DfnType;
use crate::terms::TermClaims;
use idlweave_parser::ParsedBlock;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedTerm {
    pub name: String,
    #[serde(rename = "for", skip_serializing_if = "Option::is_none")]
    pub for_scope: Option<String>,
    #[serde(rename = "type")]
    pub dfn_type: DfnType,
    /// Anchor of the defining element in this document.
    pub id: String,
}

pub fn exported_terms(blocks: &[ParsedBlock], plan: &AnchorPlan, claims: &TermClaims) -> Vec<ExportedTerm> {
    let mut exports = Vec::new();
    for (block, parsed) in blocks.iter().enumerate() {
        for (index, definition) in parsed.definitions.iter().enumerate() {
            let at = DefinitionRef {
                block,
                definition: index,
            };
            if definition.partial || !plan.owns_name(at) {
                continue;
            }
            let Some(dfn_type) = DfnType::of_definition(definition.kind) else {
                continue;
            };
            let id = claims
                .definition(at)
                .map(|annotation| annotation.id.clone())
                .unwrap_or_else(|| definition_anchor(definition.name()));
            exports.push(ExportedTerm {
                name: definition.name().to_string(),
                for_scope: None,
                dfn_type,
                id,
            });

            for (position, member) in definition.members().iter().enumerate() {
                let (Some(name), Some(dfn_type)) = (member.name(), DfnType::of_member(member.kind)) else {
                    continue;
                };
                let at = MemberRef {
                    block,
                    definition: index,
                    member: position,
                };
                let id = match claims.member(at) {
                    Some(annotation) => annotation.id.clone(),
                    None => member_anchor(&member.scope, name, plan.overload(at)),
                };
                exports.push(ExportedTerm {
                    name: name.to_string(),
                    for_scope: Some(member.scope.clone()),
                    dfn_type,
                    id,
                });
            }
        }
    }
    exports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::TermIndex;
    use idlweave_parser::parse;

    fn exports_of(sources: &[&str]) -> Vec<ExportedTerm> {
        let blocks: Vec<ParsedBlock> = sources.iter().map(|source| parse(source)).collect();
        let plan = AnchorPlan::new(blocks.iter().map(|b| b.definitions.as_slice()));
        let index = TermIndex::new(&[]);
        let claims = TermClaims::build(
            &[],
            &index,
            blocks.iter().map(|b| b.definitions.as_slice()),
            &plan,
        );
        exported_terms(&blocks, &plan, &claims)
    }

    #[test]
    fn test_partial_members_are_not_exported() {
        let exports = exports_of(&[
            "interface Banana { void nana(); void nana(long n); };",
            "partial interface Banana { attribute long peel; };",
            "partial interface Orphan { attribute long x; };",
        ]);
        let ids: Vec<&str> = exports.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["dom-banana", "dom-banana-nana", "dom-banana-nana!overload-1"]
        );
        assert_eq!(exports[1].for_scope.as_deref(), Some("Banana"));
    }

    #[test]
    fn test_serialized_shape() {
        let exports = exports_of(&["enum Flavor { \"sweet\" };"]);
        insta::assert_snapshot!(
            serde_json::to_string(&exports).unwrap(),
            @r#"[{"name":"Flavor","type":"enum","id":"dom-flavor"},{"name":"sweet","for":"Flavor","type":"enum-value","id":"dom-flavor-sweet"}]"#
        );
    }
}
