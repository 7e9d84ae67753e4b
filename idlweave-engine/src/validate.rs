//! Validation
//!
//!     Rules run once over the merged registry, after every block is registered, so a
//!     block can be flagged for something declared in another one (an optional argument
//!     typed with a dictionary from an earlier block). Rules run in a fixed order:
//!
//!         parse-error → require-exposed → dict-arg-default → duplicate-member
//!                     → duplicate-definition → orphan-partial (warning only)
//!
//!     Every rule but `parse-error` can be switched off in [ValidationConfig]. Findings are
//!     grouped per block into a single verdict whose message joins the findings' messages
//!     with newlines, in rule order.

use crate::registry::{BlockId, Registry};
use idlweave_config::ValidationConfig;
use idlweave_parser::ast::{
    ArgumentList, Definition, DefinitionBody, DefinitionFamily, DefinitionKind, ExtAttrList,
    IdlType, MemberKind,
};
use idlweave_parser::{Diagnostic, ParsedBlock};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// `source` of every diagnostic raised here.
pub const SOURCE: &str = "idlweave-engine";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    ParseError,
    RequireExposed,
    DictArgDefault,
    DuplicateMember,
    DuplicateDefinition,
    OrphanPartial,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Rule::ParseError => "parse-error",
            Rule::RequireExposed => "require-exposed",
            Rule::DictArgDefault => "dict-arg-default",
            Rule::DuplicateMember => "duplicate-member",
            Rule::DuplicateDefinition => "duplicate-definition",
            Rule::OrphanPartial => "orphan-partial",
        }
    }

    pub fn enabled(&self, config: &ValidationConfig) -> bool {
        match self {
            Rule::ParseError => true,
            Rule::RequireExposed => config.require_exposed,
            Rule::DictArgDefault => config.dict_arg_default,
            Rule::DuplicateMember => config.duplicate_member,
            Rule::DuplicateDefinition => config.duplicate_definition,
            Rule::OrphanPartial => config.orphan_partial,
        }
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(self.code())
            .with_source(SOURCE)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// One entry per block of the build; `None` when the block passed.
    pub verdicts: BTreeMap<BlockId, Option<Diagnostic>>,
    /// Individual findings behind the verdicts, in rule order.
    pub findings: Vec<(BlockId, Diagnostic)>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn verdict(&self, block: BlockId) -> Option<&Diagnostic> {
        self.verdicts.get(&block).and_then(Option::as_ref)
    }

    pub fn flagged_blocks(&self) -> Vec<BlockId> {
        self.verdicts
            .iter()
            .filter(|(_, verdict)| verdict.is_some())
            .map(|(block, _)| *block)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.verdicts.values().all(Option::is_none)
    }
}

/// Validate a build. `blocks[i]` is the parse result of `BlockId(i)`; `resolvable` tells
/// whether a name missing from the registry is still known elsewhere (host or xref), as
/// seen from the given block.
pub fn validate(
    registry: &Registry<'_>,
    blocks: &[ParsedBlock],
    config: &ValidationConfig,
    resolvable: &dyn Fn(BlockId, &str) -> bool,
) -> ValidationReport {
    let mut findings: Vec<(BlockId, Diagnostic)> = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        if let Some(error) = block.diagnostics.iter().find(|d| d.is_error()) {
            findings.push((BlockId(index), error.clone()));
        }
    }
    if Rule::RequireExposed.enabled(config) {
        findings.extend(require_exposed(registry));
    }
    if Rule::DictArgDefault.enabled(config) {
        findings.extend(dict_arg_default(registry));
    }
    if Rule::DuplicateMember.enabled(config) {
        findings.extend(duplicate_members(registry));
    }
    if Rule::DuplicateDefinition.enabled(config) {
        findings.extend(duplicate_definitions(registry));
    }

    let mut warnings = Vec::new();
    if Rule::OrphanPartial.enabled(config) {
        for fragment in registry.orphan_partials() {
            if resolvable(fragment.block, fragment.name()) {
                continue;
            }
            let message = format!(
                "Partial definition `{}` in {} does not extend any known definition.",
                fragment.name(),
                fragment.block
            );
            warn!(block = %fragment.block, name = fragment.name(), "orphan partial");
            warnings.push(
                Diagnostic::warning(message)
                    .with_code(Rule::OrphanPartial.code())
                    .with_source(SOURCE),
            );
        }
    }

    let mut verdicts: BTreeMap<BlockId, Option<Diagnostic>> =
        (0..blocks.len()).map(|index| (BlockId(index), None)).collect();
    for (block, finding) in &findings {
        let verdict = verdicts.entry(*block).or_insert(None);
        match verdict {
            Some(existing) => {
                existing.message.push('\n');
                existing.message.push_str(&finding.message);
            }
            None => *verdict = Some(finding.clone()),
        }
    }
    for (block, verdict) in &verdicts {
        if let Some(verdict) = verdict {
            debug!(block = %block, code = ?verdict.code, "block flagged");
        }
    }

    ValidationReport {
        verdicts,
        findings,
        warnings,
    }
}

fn require_exposed(registry: &Registry<'_>) -> Vec<(BlockId, Diagnostic)> {
    let mut findings = Vec::new();
    for fragment in registry.fragments() {
        let definition = fragment.definition;
        if definition.partial {
            continue;
        }
        let (noun, family) = match definition.kind {
            DefinitionKind::Interface => ("Interfaces", DefinitionFamily::Interface),
            DefinitionKind::Namespace => ("Namespaces", DefinitionFamily::Namespace),
            _ => continue,
        };
        let exposed = registry
            .merged_extended_attributes(definition.name(), family)
            .iter()
            .any(|attr| {
                matches!(
                    attr.name(),
                    "Exposed" | "LegacyNoInterfaceObject" | "NoInterfaceObject"
                )
            });
        if !exposed {
            let message = format!(
                "{noun} must have `[Exposed]` extended attribute. To fix, add, for example, \
                 `[Exposed=Window]`. Please also consider carefully whether `{}` needs to be \
                 exposed on all of the globals it names.",
                definition.name()
            );
            findings.push((fragment.block, Rule::RequireExposed.error(message)));
        }
    }
    findings
}

fn dict_arg_default(registry: &Registry<'_>) -> Vec<(BlockId, Diagnostic)> {
    let mut findings = Vec::new();
    for fragment in registry.fragments() {
        for (owner, list) in argument_lists(fragment.definition) {
            for argument in list.iter() {
                if !argument.is_optional() || argument.default.is_some() {
                    continue;
                }
                let Some(dictionary) = dictionary_behind(registry, &argument.idl_type) else {
                    continue;
                };
                let message = if has_required_fields(registry, dictionary) {
                    format!(
                        "Optional dictionary argument `{}` refers to dictionary `{}`, which has \
                         required fields. Make the argument required, or make the fields optional.",
                        argument.name(),
                        dictionary.name()
                    )
                } else {
                    format!(
                        "Optional dictionary arguments must have a default value of `{{}}`. \
                         Add `= {{}}` to argument `{}` of `{}`.",
                        argument.name(),
                        owner
                    )
                };
                findings.push((
                    fragment.block,
                    Rule::DictArgDefault
                        .error(message)
                        .with_member(owner.to_string()),
                ));
            }
        }
    }
    findings
}

/// Every argument list of a definition, with the name of what it belongs to.
fn argument_lists(definition: &Definition) -> Vec<(String, &ArgumentList)> {
    fn from_ext_attrs<'d>(owner: &str, list: Option<&'d ExtAttrList>, out: &mut Vec<(String, &'d ArgumentList)>) {
        for attr in list.into_iter().flat_map(|list| list.iter()) {
            if let Some(arguments) = &attr.arguments {
                out.push((format!("{owner} [{}]", attr.name()), arguments));
            }
        }
    }

    let mut lists = Vec::new();
    from_ext_attrs(definition.name(), definition.ext_attrs.as_ref(), &mut lists);
    if let DefinitionBody::Callback { arguments, .. } = &definition.body {
        lists.push((definition.name().to_string(), arguments));
    }
    for member in definition.members() {
        let owner = match member.name() {
            Some(name) => format!("{}.{}", member.scope, name),
            None => member.scope.clone(),
        };
        from_ext_attrs(&owner, member.ext_attrs.as_ref(), &mut lists);
        if let Some(arguments) = member.arguments() {
            lists.push((owner, arguments));
        }
    }
    lists
}

/// The dictionary a type names, looking through nullability and typedefs.
fn dictionary_behind<'a>(registry: &Registry<'a>, ty: &'a IdlType) -> Option<&'a Definition> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ty = ty;
    loop {
        let name = ty.named()?;
        let definition = registry.definition(name)?;
        match &definition.body {
            _ if definition.kind == DefinitionKind::Dictionary => return Some(definition),
            DefinitionBody::Typedef { idl_type, .. } if seen.insert(name) => ty = idl_type,
            _ => return None,
        }
    }
}

/// Whether a dictionary, its partials or any ancestor declares a `required` field.
fn has_required_fields(registry: &Registry<'_>, dictionary: &Definition) -> bool {
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = Some(dictionary.name().to_string());
    while let Some(name) = current.take() {
        if !seen.insert(name.clone()) {
            break;
        }
        if registry
            .merged_members(&name, DefinitionFamily::Dictionary)
            .iter()
            .any(|member| member.is_required())
        {
            return true;
        }
        current = registry
            .base_fragment(&name, Some(DefinitionFamily::Dictionary))
            .and_then(|fragment| fragment.definition.inherits_from())
            .map(str::to_string);
    }
    false
}

fn duplicate_members(registry: &Registry<'_>) -> Vec<(BlockId, Diagnostic)> {
    let mut findings = Vec::new();
    let mut checked: HashSet<(&str, DefinitionFamily)> = HashSet::new();
    for fragment in registry.fragments() {
        let definition = fragment.definition;
        let Some(family) = definition.family() else {
            continue;
        };
        if definition.partial || !checked.insert((fragment.name(), family)) {
            continue;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for part in registry.merged_fragments(fragment.name(), family) {
            for member in part.definition.members() {
                if !matches!(member.kind, MemberKind::Constant | MemberKind::Field) {
                    continue;
                }
                let Some(name) = member.name() else {
                    continue;
                };
                if !seen.insert(name) {
                    let message = format!(
                        "`{}` declares member `{name}` more than once.",
                        fragment.name()
                    );
                    findings.push((
                        part.block,
                        Rule::DuplicateMember.error(message).with_member(name),
                    ));
                }
            }
        }
    }
    findings
}

fn duplicate_definitions(registry: &Registry<'_>) -> Vec<(BlockId, Diagnostic)> {
    let mut findings = Vec::new();
    let mut first: HashMap<&str, BlockId> = HashMap::new();
    for fragment in registry.fragments() {
        let definition = fragment.definition;
        if definition.partial || definition.kind == DefinitionKind::Includes {
            continue;
        }
        match first.get(fragment.name()) {
            Some(block) => {
                let message = format!(
                    "`{}` is already defined in {block}. Use a partial definition to extend it.",
                    fragment.name()
                );
                findings.push((fragment.block, Rule::DuplicateDefinition.error(message)));
            }
            None => {
                first.insert(fragment.name(), fragment.block);
            }
        }
    }
    findings
}
