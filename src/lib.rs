// SPDX-License-Identifier: MIT OR Apache-2.0

//! reposcope - Semantic code search over JavaScript and Python repositories
//!
//! Shared modules for the reposcope CLI tool: file discovery, tree-sitter
//! construct extraction, embedding-based ranking with a keyword fallback,
//! and text/JSON/HTML rendering of the results.

pub mod chunker;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod output;
pub mod parser;
pub mod scanner;
pub mod scoring;
pub mod search;
