// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Library failures are typed enums; empty-but-valid search outcomes are not
//! errors and are described by [`crate::search::SearchNotice`] instead.

use thiserror::Error;

/// Errors raised by the search core itself
#[derive(Debug, Error)]
pub enum SearchError {
    /// Two vectors of different length were compared. Embeddings have a
    /// fixed dimensionality, so this means an upstream invariant broke.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("failed to parse source: {0}")]
    Parse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the embedding endpoint
///
/// These never escape the pipeline: [`crate::embedding::embed_or_zero`]
/// logs them and substitutes the zero vector.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("embedding endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("expected {expected}-dimensional embedding, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("embedding endpoint returned an all-zero vector")]
    AllZero,
}

/// Helper functions for creating helpful messages
pub mod suggestions {
    /// Message shown when the query is blank
    pub fn empty_query_message() -> String {
        "Search query is empty\n\n\
         Example: reposcope search \"parse config file\""
            .to_string()
    }

    /// Message shown when the collector found nothing to search
    pub fn no_files_message(directory: &str) -> String {
        format!(
            "No code files found in '{}'\n\n\
             Try:\n\
             - Checking the path exists\n\
             - Widening the extension list: --ext js,ts,py\n\
             - Passing --no-ignore if the files are gitignored",
            directory
        )
    }

    /// Message shown when files were searched but nothing matched
    pub fn no_matches_message(query: &str) -> String {
        format!(
            "No matches found for '{}'\n\n\
             Try:\n\
             - Different or fewer keywords\n\
             - Semantic search with --embeddings",
            query
        )
    }
}
