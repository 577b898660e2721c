// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser module - AST parsing using tree-sitter

pub mod constructs;
pub mod languages;

pub use constructs::{Construct, ConstructExtractor, ConstructKind};
pub use languages::{JsDialect, Language};
