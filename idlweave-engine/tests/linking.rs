//! Linking against host definitions, other blocks and an external cross-reference
//! database.

use idlweave_config::Loader;
use idlweave_engine::error::XrefError;
use idlweave_engine::xref::LookupFuture;
use idlweave_engine::{
    BareReference, DocumentInput, DocumentOutput, Engine, IdlBlockInput, StaticXrefDatabase,
    Tag, TermDefinition, XrefProvider, XrefQuery,
};
use std::sync::Arc;
use std::time::Duration;

const DOM_SHADOW: &str = "https://dom.spec.whatwg.org/#documentorshadowroot";
const HTML_WINDOW: &str = "https://html.spec.whatwg.org/multipage/window-object.html#window";
const WIDGET_A: &str = "https://widgets.example/a#widget";
const WIDGET_B: &str = "https://widgets.example/b#widget";

fn database() -> StaticXrefDatabase {
    StaticXrefDatabase::from_json(&format!(
        r#"{{
            "DocumentOrShadowRoot": [{{ "url": "{DOM_SHADOW}", "spec": "dom", "type": "interface" }}],
            "Window": [{{ "url": "{HTML_WINDOW}", "spec": "html", "type": "interface" }}],
            "Widget": [
                {{ "url": "{WIDGET_A}", "spec": "widgets-a", "type": "interface" }},
                {{ "url": "{WIDGET_B}", "spec": "widgets-b", "type": "interface" }}
            ]
        }}"#
    ))
    .unwrap()
}

async fn build(input: DocumentInput) -> DocumentOutput {
    Engine::with_defaults()
        .unwrap()
        .with_xref(Arc::new(database()))
        .build(&input)
        .await
        .unwrap()
}

fn has_warning(output: &DocumentOutput, code: &str) -> bool {
    output.warnings.iter().any(|w| w.code.as_deref() == Some(code))
}

#[tokio::test]
async fn test_external_partial_links_out() {
    let input = DocumentInput::new().block(IdlBlockInput::new(
        "partial interface DocumentOrShadowRoot {\n  readonly attribute long depth;\n};",
    ));
    let output = build(input).await;
    let pre = &output.blocks[0].markup;
    let name = pre.find_by_attr("data-idl", "partial").unwrap();
    assert_eq!(name.tag, Tag::A);
    assert_eq!(name.get_attr("href"), Some(DOM_SHADOW));
    assert_eq!(name.get_attr("data-xref-type"), Some("interface"));
    assert!(!name.has_class("internalDFN"));
    assert!(!output.blocks[0].is_offending());
    assert!(!has_warning(&output, "orphan-partial"));
}

#[tokio::test]
async fn test_cited_external_partial_is_not_orphaned() {
    let input = DocumentInput::new().block(
        IdlBlockInput::new("partial interface DocumentOrShadowRoot {\n  readonly attribute long depth;\n};")
            .with_cite(["dom"]),
    );
    let output = build(input).await;
    let name = output.blocks[0]
        .markup
        .find_by_attr("data-idl", "partial")
        .unwrap();
    assert_eq!(name.get_attr("href"), Some(DOM_SHADOW));
    assert!(!has_warning(&output, "orphan-partial"));
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_exposed_global_links_through_xref() {
    let input = DocumentInput::new().block(IdlBlockInput::new("[Exposed=Window] interface Lamp {};"));
    let output = build(input).await;
    let window = output.blocks[0].markup.find_by_attr("href", HTML_WINDOW).unwrap();
    assert_eq!(window.text_content(), "Window");
    assert_eq!(window.get_attr("data-link-type"), Some("interface"));
    assert_eq!(window.get_attr("data-xref-type"), Some("interface"));
}

#[tokio::test]
async fn test_ambiguous_name_is_reported_not_guessed() {
    let source = "[Exposed=Window] interface Gadget {\n  attribute Widget widget;\n};";
    let output = build(DocumentInput::new().block(IdlBlockInput::new(source))).await;
    let pre = &output.blocks[0].markup;
    assert!(pre.find_by_attr("href", WIDGET_A).is_none());
    assert!(pre.find_by_attr("href", WIDGET_B).is_none());
    let warning = output
        .warnings
        .iter()
        .find(|w| w.code.as_deref() == Some("xref-ambiguous"))
        .unwrap();
    assert!(warning.message.contains(WIDGET_A));
    assert!(warning.message.contains(WIDGET_B));
}

#[tokio::test]
async fn test_citation_narrows_candidates() {
    let source = "[Exposed=Window] interface Gadget {\n  attribute Widget widget;\n};";
    let input = DocumentInput::new().block(IdlBlockInput::new(source).with_cite(["widgets-b"]));
    let output = build(input).await;
    let widget = output.blocks[0].markup.find_by_attr("href", WIDGET_B).unwrap();
    assert_eq!(widget.text_content(), "Widget");
    assert!(!has_warning(&output, "xref-ambiguous"));
}

#[tokio::test]
async fn test_bare_references() {
    let input = DocumentInput::new()
        .block(IdlBlockInput::new(
            "[Exposed=Window] interface Documented {\n  attribute long size;\n};",
        ))
        .term(TermDefinition::new("Flower").with_id("flower"))
        .reference(BareReference::new("Documented"))
        .reference(BareReference::new("{{Documented/size}}"))
        .reference(BareReference::new("size").link_for("Documented"))
        .reference(BareReference::new("flower"))
        .reference(BareReference::new("Window"))
        .reference(BareReference::new("Nowhere"));
    let output = build(input).await;
    let hrefs: Vec<Option<&str>> = output.references.iter().map(|r| r.href()).collect();
    assert_eq!(
        hrefs,
        vec![
            Some("#idl-def-documented"),
            Some("#dom-documented-size"),
            Some("#dom-documented-size"),
            Some("#flower"),
            Some(HTML_WINDOW),
            None,
        ]
    );
    let unresolved: Vec<&str> = output
        .warnings
        .iter()
        .filter(|w| w.code.as_deref() == Some("unresolved-reference"))
        .map(|w| w.message.as_str())
        .collect();
    assert_eq!(unresolved, vec!["Could not find a definition for `Nowhere`."]);
}

#[tokio::test]
async fn test_host_dfn_claims_definition_and_member() {
    let input = DocumentInput::new()
        .block(IdlBlockInput::new(
            "[Exposed=Window] interface Parcel {\n  [Default] object toJSON();\n  void open();\n};",
        ))
        .term(TermDefinition::new("Parcel"))
        .term(TermDefinition::new("open()").for_scope("Parcel"))
        .reference(BareReference::new("Parcel"));
    let output = build(input).await;

    assert_eq!(output.terms[0].id, "dom-parcel");
    assert_eq!(output.terms[1].id, "dom-parcel-open");
    assert_eq!(output.references[0].href(), Some("#dom-parcel"));

    let pre = &output.blocks[0].markup;
    let parcel = pre.find_by_attr("href", "#dom-parcel").unwrap();
    assert!(parcel.has_class("internalDFN"));
    assert_eq!(pre.find_by_attr("href", "#dom-parcel-open").unwrap().text_content(), "open");
    // Nothing in the host defines toJSON, so the builtin default operation is used.
    let to_json = pre
        .find_by_attr("href", "https://heycam.github.io/webidl/#default-tojson-operation")
        .unwrap();
    assert_eq!(to_json.text_content(), "toJSON");
    assert!(pre.find_by_tag(Tag::Dfn).is_empty());
}

#[tokio::test]
async fn test_host_defined_tojson_wins() {
    let input = DocumentInput::new()
        .block(IdlBlockInput::new(
            "[Exposed=Window] interface Parcel {\n  [Default] object toJSON();\n};",
        ))
        .term(TermDefinition::new("toJSON()").for_scope("Parcel"));
    let output = build(input).await;
    let to_json = output.blocks[0]
        .markup
        .find_by_attr("href", "#dom-parcel-tojson")
        .unwrap();
    assert!(to_json.has_class("internalDFN"));
    assert_eq!(to_json.get_attr("data-link-for"), Some("Parcel"));
}

struct Unreachable;

impl XrefProvider for Unreachable {
    fn lookup(&self, _query: XrefQuery) -> LookupFuture<'_> {
        Box::pin(async { Err(XrefError::Unavailable("connection refused".to_string())) })
    }
}

struct Stalled;

impl XrefProvider for Stalled {
    fn lookup(&self, _query: XrefQuery) -> LookupFuture<'_> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        })
    }
}

#[tokio::test]
async fn test_failed_lookups_leave_names_unlinked() {
    let input = DocumentInput::new().block(IdlBlockInput::new(
        "[Exposed=Window] interface Gadget {\n  attribute Widget widget;\n};",
    ));
    let output = Engine::with_defaults()
        .unwrap()
        .with_xref(Arc::new(Unreachable))
        .build(&input)
        .await
        .unwrap();
    let pre = &output.blocks[0].markup;
    assert_eq!(pre.text_content(), input.blocks[0].source);
    assert!(pre
        .find_by_tag(Tag::A)
        .iter()
        .all(|a| a.text_content() != "Widget"));
    assert!(output.is_valid());
}

#[tokio::test]
async fn test_lookups_are_bounded_by_timeout() {
    let config = Loader::new()
        .set_override("xref.timeout_ms", 20_i64)
        .unwrap()
        .build()
        .unwrap();
    let input = DocumentInput::new().block(IdlBlockInput::new(
        "[Exposed=Window] interface Gadget {\n  attribute Widget widget;\n};",
    ));
    let started = std::time::Instant::now();
    let output = Engine::new(config)
        .with_xref(Arc::new(Stalled))
        .build(&input)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(output.blocks.len(), 1);
}

#[tokio::test]
async fn test_disabled_xref_skips_provider() {
    let config = Loader::new()
        .set_override("xref.enabled", false)
        .unwrap()
        .build()
        .unwrap();
    let input = DocumentInput::new().block(IdlBlockInput::new("[Exposed=Window] interface Lamp {};"));
    let output = Engine::new(config)
        .with_xref(Arc::new(database()))
        .build(&input)
        .await
        .unwrap();
    assert!(output.blocks[0].markup.find_by_attr("href", HTML_WINDOW).is_none());
}
