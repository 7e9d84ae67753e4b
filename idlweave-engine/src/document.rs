//! Document build
//!
//!     One build turns a [DocumentInput] into a [DocumentOutput]. Phases run strictly in
//!     this order; only the cross-reference prefetch suspends:
//!
//!         parse every block
//!           → register all definitions, plan anchors and overload numbers
//!           → match host term definitions (claims)
//!           → prefetch external lookups for names nothing local resolves
//!           → render every block
//!           → validate the merged registry, flag offending blocks
//!           → link bare references in prose
//!           → collect exports
//!
//!     Nothing survives a build. Errors in one block never stop the others: a block that
//!     fails to parse is rendered up to the failure, keeps the rest verbatim, and is
//!     flagged.

use crate::error::RenderError;
use crate::exports::{exported_terms, ExportedTerm};
use crate::host::{BareReference, DocumentInput};
use crate::ids::{definition_wrapper_id, member_anchor, AnchorPlan};
use crate::kinds::DfnType;
use crate::markup::Element;
use crate::registry::{BlockId, Registry};
use crate::render::{render, RenderContext, OFFENDING_CLASS};
use crate::resolver::{referenced_types, ReferenceKind, Resolver, Target, TargetOrigin};
use crate::terms::{TermAnnotation, TermClaims, TermIndex};
use crate::validate::{validate, SOURCE};
use crate::xref::{prefetch, XrefProvider, XrefQuery, XrefTable};
use idlweave_config::{load_defaults, ConfigError, IdlweaveConfig};
use idlweave_parser::{parse_with_scope, Diagnostic, ParsedBlock};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

static QUALIFIED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)[./](.+)$").expect("valid reference pattern")
});

#[derive(Debug, Clone, Serialize)]
pub struct RenderedBlock {
    pub block: BlockId,
    /// Id of the host block element, if it had one.
    pub id: Option<String>,
    pub markup: Element,
    pub html: String,
    /// Validation verdict; `None` when the block passed.
    pub verdict: Option<Diagnostic>,
    /// Parser diagnostics of this block.
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedBlock {
    pub fn is_offending(&self) -> bool {
        self.verdict.is_some()
    }
}

/// A bare prose reference and where it now points.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedReference {
    pub text: String,
    pub link_for: Option<String>,
    pub target: Option<Target>,
}

impl LinkedReference {
    pub fn href(&self) -> Option<&str> {
        self.target.as_ref().map(|target| target.href.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutput {
    pub blocks: Vec<RenderedBlock>,
    /// Annotations for the host's term definitions, in input order.
    pub terms: Vec<TermAnnotation>,
    /// Linked bare references, in input order.
    pub references: Vec<LinkedReference>,
    pub exports: Vec<ExportedTerm>,
    pub warnings: Vec<Diagnostic>,
}

impl DocumentOutput {
    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(|block| !block.is_offending())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The entry point a host drives: configuration plus an optional cross-reference
/// provider, reused across builds.
#[derive(Clone)]
pub struct Engine {
    config: IdlweaveConfig,
    xref: Option<Arc<dyn XrefProvider>>,
}

impl Engine {
    pub fn new(config: IdlweaveConfig) -> Self {
        Self { config, xref: None }
    }

    /// An engine configured with the embedded defaults.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Ok(Self::new(load_defaults()?))
    }

    pub fn with_xref(mut self, provider: Arc<dyn XrefProvider>) -> Self {
        self.xref = Some(provider);
        self
    }

    pub fn config(&self) -> &IdlweaveConfig {
        &self.config
    }

    pub async fn build(&self, input: &DocumentInput) -> Result<DocumentOutput, RenderError> {
        let parsed: Vec<ParsedBlock> = input
            .blocks
            .iter()
            .map(|block| parse_with_scope(&block.source, block.id.as_deref()))
            .collect();
        debug!(blocks = parsed.len(), "parsed IDL blocks");

        let mut registry = Registry::new();
        for (index, block) in parsed.iter().enumerate() {
            registry.register(BlockId(index), &block.definitions);
        }
        let plan = AnchorPlan::new(parsed.iter().map(|block| block.definitions.as_slice()));
        let index = TermIndex::new(&input.terms);
        let claims = TermClaims::build(
            &input.terms,
            &index,
            parsed.iter().map(|block| block.definitions.as_slice()),
            &plan,
        );
        debug!(
            fragments = registry.fragments().len(),
            terms = input.terms.len(),
            "registered definitions"
        );

        let base_url = self.config.webidl.base_url.as_str();
        let xref = self
            .prefetch(input, &parsed, &Resolver::new(&registry, &index, &claims, &XrefTable::new(), base_url))
            .await;
        let resolver = Resolver::new(&registry, &index, &claims, &xref, base_url);

        let mut markups = Vec::with_capacity(parsed.len());
        for (position, (block, source)) in parsed.iter().zip(&input.blocks).enumerate() {
            let cx = RenderContext {
                resolver: resolver.with_cite(&source.cite),
                plan: &plan,
                claims: &claims,
            };
            let mut markup = render(block, BlockId(position), &cx);
            for class in &source.classes {
                markup.add_class(class);
            }
            if let Some(id) = &source.id {
                markup.set_attr("id", id.clone());
            }
            markups.push(markup);
        }

        let report = validate(
            &registry,
            &parsed,
            &self.config.validation,
            &|block: BlockId, name: &str| {
                resolver
                    .with_cite(&input.blocks[block.0].cite)
                    .resolve(name, ReferenceKind::Type, None)
                    .is_resolved()
            },
        );

        let mut blocks = Vec::with_capacity(markups.len());
        for (position, mut markup) in markups.into_iter().enumerate() {
            let block = BlockId(position);
            let verdict = report.verdict(block).cloned();
            if let Some(verdict) = &verdict {
                markup.add_class(OFFENDING_CLASS);
                markup.set_attr("title", verdict.message.clone());
            }
            let html = markup.to_html()?;
            blocks.push(RenderedBlock {
                block,
                id: input.blocks[position].id.clone(),
                markup,
                html,
                verdict,
                diagnostics: parsed[position].diagnostics.clone(),
            });
        }

        let mut warnings = report.warnings.clone();
        for (query, candidates) in xref.ambiguities() {
            let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
            warnings.push(
                Diagnostic::warning(format!(
                    "`{}` is defined by several specifications ({}). Add a citation hint to pick one.",
                    query.term,
                    urls.join(", ")
                ))
                .with_code("xref-ambiguous")
                .with_source(SOURCE),
            );
        }

        let references: Vec<LinkedReference> = input
            .references
            .iter()
            .map(|reference| link_reference(reference, &resolver, &registry, &index, &claims))
            .collect();
        for reference in references.iter().filter(|r| r.target.is_none()) {
            warnings.push(
                Diagnostic::warning(format!("Could not find a definition for `{}`.", reference.text))
                    .with_code("unresolved-reference")
                    .with_source(SOURCE),
            );
        }

        let exports = exported_terms(&parsed, &plan, &claims);
        debug!(
            offending = report.flagged_blocks().len(),
            exports = exports.len(),
            "build finished"
        );

        Ok(DocumentOutput {
            blocks,
            terms: claims.annotations().to_vec(),
            references,
            exports,
            warnings,
        })
    }

    /// Look up, concurrently, every type name and bare reference nothing local resolves.
    async fn prefetch(
        &self,
        input: &DocumentInput,
        parsed: &[ParsedBlock],
        local: &Resolver<'_, '_>,
    ) -> XrefTable {
        let provider = match (&self.xref, self.config.xref.enabled) {
            (Some(provider), true) => Arc::clone(provider),
            _ => return XrefTable::new(),
        };

        let mut queries = Vec::new();
        for (block, source) in parsed.iter().zip(&input.blocks) {
            for definition in &block.definitions {
                for name in referenced_types(definition) {
                    if local.needs_lookup(&name) {
                        queries.push(XrefQuery::new(name, ReferenceKind::Type, &source.cite));
                    }
                }
            }
        }
        for reference in &input.references {
            let (scope, name) = reference_key(reference);
            if scope.is_none() && local.needs_lookup(&name) {
                queries.push(XrefQuery::new(name, ReferenceKind::Type, &[]));
            }
        }

        let table = prefetch(provider, queries, self.config.xref.timeout()).await;
        debug!(
            settled = table.len(),
            failed = table.failures().len(),
            "cross-references ready"
        );
        table
    }
}

/// `{{Roselia/hikawa}}`, `Roselia.hikawa` or `hikawa` with a `link-for`, reduced to
/// (scope, name).
fn reference_key(reference: &BareReference) -> (Option<String>, String) {
    let text = reference.text.trim();
    let text = text
        .strip_prefix("{{")
        .and_then(|t| t.strip_suffix("}}"))
        .unwrap_or(text)
        .trim();
    let text = text.strip_suffix("()").unwrap_or(text);
    if let Some(scope) = &reference.link_for {
        return (Some(scope.clone()), text.to_string());
    }
    match QUALIFIED_REFERENCE.captures(text) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
        None => (None, text.to_string()),
    }
}

/// Link a prose reference. First match wins: host term, IDL member, IDL definition the
/// host did not define, host term ignoring case, then builtins and cross-references.
fn link_reference(
    reference: &BareReference,
    resolver: &Resolver<'_, '_>,
    registry: &Registry<'_>,
    index: &TermIndex,
    claims: &TermClaims,
) -> LinkedReference {
    let (scope, name) = reference_key(reference);
    let scope = scope.as_deref();
    let host = |terms: Vec<usize>| {
        terms
            .first()
            .and_then(|&term| claims.annotation(term))
            .map(|annotation| {
                let link = annotation.dfn_type.map_or("dfn", |t| t.as_str());
                Target::new(TargetOrigin::Host, annotation.href(), link)
            })
    };

    let target = host(index.matching(scope, &name))
        .or_else(|| match scope {
            Some(scope) => registry.member(scope, &name).map(|member| {
                let link = DfnType::of_member(member.kind).map_or("idl", |t| t.as_str());
                Target::new(
                    TargetOrigin::Local,
                    format!("#{}", member_anchor(scope, &name, 0)),
                    link,
                )
            }),
            None => registry.definition(&name).map(|definition| {
                Target::new(
                    TargetOrigin::Local,
                    format!("#{}", definition_wrapper_id(definition.name())),
                    crate::kinds::link_type(definition.kind),
                )
            }),
        })
        .or_else(|| host(index.matching_ignore_case(scope, &name)))
        .or_else(|| match scope {
            Some(_) => None,
            None => resolver
                .resolve(&name, ReferenceKind::Type, None)
                .target()
                .cloned(),
        });

    LinkedReference {
        text: reference.text.clone(),
        link_for: reference.link_for.clone(),
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{IdlBlockInput, TermDefinition};
    use rstest::rstest;

    #[rstest]
    #[case("{{Roselia/hikawa}}", None, Some("Roselia"), "hikawa")]
    #[case("Roselia.hikawa", None, Some("Roselia"), "hikawa")]
    #[case("hikawa()", Some("Roselia"), Some("Roselia"), "hikawa")]
    #[case("Roselia", None, None, "Roselia")]
    fn test_reference_key(
        #[case] text: &str,
        #[case] link_for: Option<&str>,
        #[case] scope: Option<&str>,
        #[case] name: &str,
    ) {
        let mut reference = BareReference::new(text);
        if let Some(link_for) = link_for {
            reference = reference.link_for(link_for);
        }
        assert_eq!(
            reference_key(&reference),
            (scope.map(str::to_string), name.to_string())
        );
    }

    #[tokio::test]
    async fn test_build_links_prose_references() {
        let input = DocumentInput::new()
            .block(IdlBlockInput::new(
                "dictionary Roselia {\n  DOMString hikawa = \"sayo\";\n};\ndictionary PastelPalettes {\n  DOMString hikawa = \"hina\";\n};",
            ))
            .term(TermDefinition::new("Roselia"))
            .term(TermDefinition::new("PastelPalettes"))
            .reference(BareReference::new("Roselia"))
            .reference(BareReference::new("PastelPalettes"))
            .reference(BareReference::new("{{Roselia/hikawa}}"));
        let output = Engine::with_defaults().unwrap().build(&input).await.unwrap();
        let hrefs: Vec<Option<&str>> = output.references.iter().map(|r| r.href()).collect();
        assert_eq!(
            hrefs,
            vec![
                Some("#dom-roselia"),
                Some("#dom-pastelpalettes"),
                Some("#dom-roselia-hikawa")
            ]
        );
        assert!(output.is_valid());
    }

    #[tokio::test]
    async fn test_verdict_lands_on_root() {
        let input = DocumentInput::new().block(
            IdlBlockInput::new("interface Circle {};")
                .with_id("circle")
                .with_classes(["idl", "extra"]),
        );
        let output = Engine::with_defaults().unwrap().build(&input).await.unwrap();
        let block = &output.blocks[0];
        assert_eq!(block.markup.classes, vec!["idl", "extra", OFFENDING_CLASS]);
        assert_eq!(block.markup.id(), Some("circle"));
        assert!(block.markup.get_attr("title").unwrap().contains("Exposed"));
        assert!(block.html.starts_with("<pre class=\"idl extra respec-offending-element\""));
    }
}
