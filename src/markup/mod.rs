//! Textual markup front-end.
//!
//! Turns a markup document into a declarative [`Node`](crate::tree::Node)
//! tree, ready for interpretation.

mod parser;
mod tokenizer;

pub use parser::{parse, ParseError};
pub use tokenizer::{ContentToken, TagToken};
