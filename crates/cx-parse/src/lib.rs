//! Parser adapters (C1): wraps tree-sitter so `cx-extract` can walk a
//! concrete syntax tree without caring which grammar produced it.

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod error;
pub mod registry;
pub mod tree_sitter_adapter;

pub use adapter::{ParseResult, ParserAdapter};
pub use error::ParseError;
pub use registry::ParserRegistry;
