// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON rendering of a [`SearchResult`]

use crate::search::SearchResult;

pub fn format_json(result: &SearchResult, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    }
}

/// Inverse of [`format_json`]
pub fn parse_json(input: &str) -> serde_json::Result<SearchResult> {
    serde_json::from_str(input)
}
