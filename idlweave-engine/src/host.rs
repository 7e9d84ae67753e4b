//! Host document model
//!
//!     The host (the document processor embedding the engine) extracts the IDL blocks and
//!     the author-written term definitions from its document and hands them over as a
//!     [DocumentInput]. Everything here is plain data and deserializes from JSON, so a host
//!     in another process can drive a build.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One `<pre class="idl">` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdlBlockInput {
    /// The block element's own id, if it has one.
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    /// Citation hints (`data-cite`): specifications to prefer for external lookups.
    #[serde(default)]
    pub cite: Vec<String>,
    /// CSS classes already on the block; kept on the rendered root.
    #[serde(default)]
    pub classes: Vec<String>,
}

impl IdlBlockInput {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_cite<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cite = specs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }
}

/// An author-written `<dfn>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermDefinition {
    pub text: String,
    /// Declared container (`data-dfn-for`).
    #[serde(default)]
    pub for_scope: Option<String>,
    /// Explicit id written by the author.
    #[serde(default)]
    pub id: Option<String>,
    /// Alternate forms (`data-lt`), e.g. a fully-qualified `Interface.member`.
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl TermDefinition {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn for_scope(mut self, scope: impl Into<String>) -> Self {
        self.for_scope = Some(scope.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternates.push(alternate.into());
        self
    }
}

/// A bare `<a>` in prose, to be linked by the build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BareReference {
    pub text: String,
    /// Container to resolve against (`data-link-for`).
    #[serde(default)]
    pub link_for: Option<String>,
}

impl BareReference {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link_for: None,
        }
    }

    pub fn link_for(mut self, scope: impl Into<String>) -> Self {
        self.link_for = Some(scope.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub blocks: Vec<IdlBlockInput>,
    #[serde(default)]
    pub terms: Vec<TermDefinition>,
    #[serde(default)]
    pub references: Vec<BareReference>,
}

impl DocumentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, block: IdlBlockInput) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn term(mut self, term: TermDefinition) -> Self {
        self.terms.push(term);
        self
    }

    pub fn reference(mut self, reference: BareReference) -> Self {
        self.references.push(reference);
        self
    }
}

static LEADING_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*").expect("valid indent pattern"));

/// Prepare raw `<pre>` text the way the host shows it: blank lines at both ends dropped,
/// trailing whitespace removed and the common indentation of the remaining lines stripped.
pub fn normalize_block_source(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(first);
    let body = &lines[first..=last];

    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| LEADING_INDENT.find(line).map_or(0, |m| m.end()))
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| {
            let line = line.trim_end();
            line.get(indent..).unwrap_or_else(|| line.trim_start())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dedents_and_trims() {
        let raw = "\n          dictionary Foo {\n            record<DOMString, USVString> pass;\n          };\n        ";
        assert_eq!(
            normalize_block_source(raw),
            "dictionary Foo {\n  record<DOMString, USVString> pass;\n};"
        );
    }

    #[test]
    fn test_normalize_keeps_inner_blank_lines() {
        let raw = "  a\n\n  b  \n";
        assert_eq!(normalize_block_source(raw), "a\n\nb");
        assert_eq!(normalize_block_source("   \n  "), "");
    }

    #[test]
    fn test_document_input_from_json() {
        let input: DocumentInput = serde_json::from_str(
            r#"{
                "blocks": [{ "source": "interface A {};", "cite": ["DOM"] }],
                "terms": [{ "text": "b", "for_scope": "A" }]
            }"#,
        )
        .unwrap();
        assert_eq!(input.blocks[0].cite, vec!["DOM"]);
        assert_eq!(input.terms[0].for_scope.as_deref(), Some("A"));
        assert!(input.references.is_empty());
    }
}
