// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size line windows, used when construct extraction has nothing to offer

pub const CHUNK_LINES: usize = 30;

/// A window of consecutive lines (1-based, inclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub line_start: usize,
    pub line_end: usize,
}

/// Split `source` into windows of [`CHUNK_LINES`] lines. The last window may
/// be shorter; empty input gives no chunks.
pub fn chunk(source: &str) -> Vec<Chunk> {
    chunk_with_size(source, CHUNK_LINES)
}

pub fn chunk_with_size(source: &str, lines_per_chunk: usize) -> Vec<Chunk> {
    let lines: Vec<&str> = source.lines().collect();
    let size = lines_per_chunk.max(1);

    lines
        .chunks(size)
        .enumerate()
        .map(|(idx, window)| {
            let line_start = idx * size + 1;
            Chunk {
                text: window.join("\n"),
                line_start,
                line_end: line_start + window.len() - 1,
            }
        })
        .collect()
}
