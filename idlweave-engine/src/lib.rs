//! WebIDL engine
//!
//!     Takes every IDL block of a document, links each identifier to where it is defined
//!     and renders the blocks back as annotated markup, then validates the merged result.
//!
//!     Pipeline (one [Engine::build] per document):
//!         DocumentInput
//!           → idlweave_parser::parse per block
//!           → registry (partials, mixins, includes; merged on demand)
//!           → terms (host <dfn>s claimed by IDL names) + ids (anchor plan)
//!           → xref prefetch (async, concurrent, bounded by a timeout)
//!           → render per block (resolver) → validate (whole registry)
//!           → DocumentOutput { blocks, terms, references, exports, warnings }
//!
//!     Usage:
//!         let engine = Engine::with_defaults()?;
//!         let input = DocumentInput::new()
//!             .block(IdlBlockInput::new("[Exposed=Window] interface Circle {};"));
//!         let output = engine.build(&input).await?;
//!         println!("{}", output.blocks[0].html);

pub mod builtins;
pub mod document;
pub mod error;
pub mod exports;
pub mod host;
pub mod ids;
pub mod kinds;
pub mod markup;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod terms;
pub mod validate;
pub mod xref;

pub use document::{DocumentOutput, Engine, LinkedReference, RenderedBlock};
pub use error::{RenderError, XrefError};
pub use exports::ExportedTerm;
pub use host::{normalize_block_source, BareReference, DocumentInput, IdlBlockInput, TermDefinition};
pub use markup::{Element, Markup, Tag};
pub use registry::{BlockId, Registry};
pub use validate::{validate, ValidationReport};
pub use xref::{StaticXrefDatabase, XrefEntry, XrefProvider, XrefQuery};
