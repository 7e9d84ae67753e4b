//! Whole-document validation verdicts as the host sees them.

use idlweave_config::Loader;
use idlweave_engine::render::OFFENDING_CLASS;
use idlweave_engine::{DocumentInput, DocumentOutput, Engine, IdlBlockInput, Tag};

async fn build(blocks: &[&str]) -> DocumentOutput {
    let input = blocks
        .iter()
        .fold(DocumentInput::new(), |input, source| input.block(IdlBlockInput::new(*source)));
    Engine::with_defaults()
        .unwrap()
        .build(&input)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_interface_needs_exposed() {
    let output = build(&["interface Circle {};"]).await;
    let block = &output.blocks[0];
    assert!(block.markup.has_class(OFFENDING_CLASS));
    assert!(block.markup.get_attr("title").unwrap().contains("Exposed"));
    assert!(!output.is_valid());
}

#[tokio::test]
async fn test_validates_across_blocks() {
    let output = build(&[
        "dictionary Bread {\n  DOMString type = \"melon\";\n};",
        "[Exposed=Window]\ninterface Moka {\n  void eat(optional Bread bread);\n};",
    ])
    .await;
    assert!(!output.blocks[0].markup.has_class(OFFENDING_CLASS));
    let moka = &output.blocks[1];
    assert!(moka.markup.has_class(OFFENDING_CLASS));
    assert!(moka.markup.get_attr("title").unwrap().contains("Optional dictionary"));
}

#[tokio::test]
async fn test_failing_block_is_flagged_and_kept() {
    let source = "interface Muscle {}";
    let output = build(&[source, "[Exposed=Window] interface Fine {};"]).await;
    let muscle = &output.blocks[0];
    assert!(muscle.markup.has_class(OFFENDING_CLASS));
    assert_eq!(muscle.markup.text_content(), source);
    assert_eq!(muscle.diagnostics.len(), 1);
    assert!(!output.blocks[1].is_offending());
}

#[tokio::test]
async fn test_self_defining_idl() {
    let output = build(&[
        "interface RASAintShared {\n  attribute DOMString layer;\n};\nenum TestEnum {\"\"};\npartial interface TeaTime {};",
    ])
    .await;
    let pre = &output.blocks[0].markup;
    let dfns = pre.find_by_tag(Tag::Dfn);
    assert_eq!(dfns.len(), 4);
    assert_eq!(dfns[0].id(), Some("dom-rasaintshared"));
    assert_eq!(dfns[0].get_attr("data-dfn-type"), Some("interface"));
    assert_eq!(dfns[0].get_attr("data-export"), Some(""));
    assert!(!dfns[0].has_class(OFFENDING_CLASS));
    assert_eq!(dfns[1].id(), Some("dom-rasaintshared-layer"));
    assert_eq!(dfns[1].get_attr("data-dfn-type"), Some("attribute"));
    assert_eq!(dfns[2].id(), Some("dom-testenum"));
    assert_eq!(dfns[2].get_attr("data-dfn-type"), Some("enum"));
    assert_eq!(dfns[3].id(), Some("dom-testenum-the-empty-string"));
    assert_eq!(dfns[3].get_attr("data-dfn-type"), Some("enum-value"));

    // The block is flagged for the missing [Exposed]; inside it only the orphan partial's name is.
    assert!(pre.has_class(OFFENDING_CLASS));
    let offending = pre.find_by_class(OFFENDING_CLASS);
    assert_eq!(offending.len(), 1);
    assert_eq!(offending[0].text_content(), "TeaTime");
    assert!(output
        .warnings
        .iter()
        .any(|w| w.code.as_deref() == Some("orphan-partial")));
}

#[tokio::test]
async fn test_validation_rules_follow_config() {
    let config = Loader::new()
        .set_override("validation.require_exposed", false)
        .unwrap()
        .build()
        .unwrap();
    let input = DocumentInput::new().block(IdlBlockInput::new("interface Circle {};"));
    let output = Engine::new(config).build(&input).await.unwrap();
    assert!(output.is_valid());
    assert_eq!(output.blocks[0].markup.get_attr("title"), None);
}

#[tokio::test]
async fn test_messages_are_stable() {
    let output = build(&["interface Circle {};\ninterface Circle {};"]).await;
    let verdict = output.blocks[0].verdict.as_ref().unwrap();
    insta::assert_snapshot!(verdict.message, @r###"
    Interfaces must have `[Exposed]` extended attribute. To fix, add, for example, `[Exposed=Window]`. Please also consider carefully whether `Circle` needs to be exposed on all of the globals it names.
    Interfaces must have `[Exposed]` extended attribute. To fix, add, for example, `[Exposed=Window]`. Please also consider carefully whether `Circle` needs to be exposed on all of the globals it names.
    `Circle` is already defined in block #0. Use a partial definition to extend it.
    "###);
}
