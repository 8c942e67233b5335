mod document;
mod graph;
mod parse;

pub use document::{Document, Section, load_document};
pub use graph::Outline;
pub use parse::parse_outline;
