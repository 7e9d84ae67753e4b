//! WebIDL parser
//!
//!     Parses one block of WebIDL source into an ordered list of definitions. The parser is
//!     trivia-preserving: every token keeps the whitespace and comments that preceded it,
//!     so [ast::ParsedBlock::to_source] reproduces the input byte for byte, including after
//!     a syntax error (the unparsed rest of the block is kept verbatim).
//!
//!     Pipeline:
//!         source → lexing::tokenize (logos + trivia folding) → parsing (recursive descent)
//!                → ast::ParsedBlock { definitions, eof, remainder, diagnostics }
//!
//!     The parser knows nothing about other blocks. Merging partials and mixins, resolving
//!     names and rendering happen in `idlweave-engine`.
//!
//!     Usage:
//!         let block = idlweave_parser::parse("[Exposed=Window] interface Circle {};");
//!         assert_eq!(block.definitions[0].name(), "Circle");

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod lexing;
pub mod parsing;
pub mod range;
pub mod token;

pub use ast::ParsedBlock;
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use error::SyntaxError;
pub use parsing::{parse, parse_with_scope};
