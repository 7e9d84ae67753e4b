//! Rendering never changes the text of a block, whatever the block contains.

use idlweave_engine::{DocumentInput, Engine, IdlBlockInput};
use proptest::prelude::*;

const PIECES: &[&str] = &[
    "[Exposed=Window]\n",
    "[Exposed=(Window,Worker), SecureContext] ",
    "interface Circle {\n",
    "partial interface Circle {\n",
    "interface mixin Shape {\n",
    "dictionary Options {\n",
    "enum Mode { \"on\", \"off\", \"\" };\n",
    "callback Handler = void (DOMString type);\n",
    "typedef (long or DOMString)? Key;\n",
    "Circle includes Shape;\n",
    "  attribute double radius;\n",
    "  readonly attribute FrozenArray<DOMString> names;\n",
    "  void draw(optional Options options = {});\n",
    "  Promise<sequence<Circle>> all(long... rest);\n",
    "  getter DOMString (unsigned long index);\n",
    "  required long width;\n",
    "  const unsigned short MAX = 0xFF;\n",
    "  iterable<DOMString, long>;\n",
    "  stringifier;\n",
    "  // comment\n",
    "/* block\n comment */ ",
    "};\n",
    "}",
    ";",
    "?",
    "<",
    "\"unterminated",
    "\n\n",
];

fn source() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(PIECES).prop_map(str::to_string);
    let noise = "[ -~\n]{0,8}";
    prop::collection::vec(prop_oneof![4 => piece, 1 => noise], 0..16)
        .prop_map(|parts| parts.concat())
}

fn rendered_text(source: &str) -> String {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let input = DocumentInput::new().block(IdlBlockInput::new(source));
    let output = runtime
        .block_on(Engine::with_defaults().unwrap().build(&input))
        .unwrap();
    output.blocks[0].markup.text_content()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_rendered_text_matches_source(source in source()) {
        prop_assert_eq!(rendered_text(&source), source);
    }
}

#[test]
fn test_known_blocks_keep_their_text() {
    for source in [
        "",
        "   \n",
        "// only a comment",
        "[Exposed=Window]\ninterface Circle {\n  attribute double radius;\n};",
        "interface Muscle {}",
        "enum E { \"a\", };",
    ] {
        assert_eq!(rendered_text(source), source);
    }
}
