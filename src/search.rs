// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search pipeline: collect files, split them into candidates, score,
//! rank, then widen each surviving hit with context re-read from disk.
//!
//! Everything runs sequentially. Files are walked in batches of
//! [`FILE_BATCH_SIZE`] and each read and embedding call is awaited before the
//! next one starts. A failure on one file or one chunk is logged and the
//! search moves on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tree_sitter::Parser;

use crate::chunker;
use crate::config::{DEFAULT_CONTEXT_LINES, DEFAULT_MAX_RESULTS};
use crate::embedding::{embed_or_zero, EmbeddingProvider, EmbeddingSettings, HttpEmbedder};
use crate::errors::SearchError;
use crate::parser::{ConstructExtractor, ConstructKind, Language};
use crate::scanner::{relative_display_path, FileCollector};
use crate::scoring::{score_candidate, KeywordQuery, MIN_LINE_LEN};

/// Files are processed in sequential groups of this size
pub const FILE_BATCH_SIZE: usize = 50;

/// Inputs for one search invocation
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub directory: PathBuf,
    pub limit: usize,
    pub context_lines: usize,
    pub use_embeddings: bool,
    pub api_key: Option<String>,
    pub construct_filter: Option<ConstructKind>,
    /// Extension allowlist; empty means the collector's default set
    pub extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub respect_gitignore: bool,
    pub embedding: EmbeddingSettings,
}

impl SearchOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            limit: DEFAULT_MAX_RESULTS,
            context_lines: DEFAULT_CONTEXT_LINES,
            use_embeddings: false,
            api_key: None,
            construct_filter: None,
            extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            respect_gitignore: true,
            embedding: EmbeddingSettings::default(),
        }
    }

    /// API key to use for semantic search, if it is both requested and possible
    pub fn semantic_api_key(&self) -> Option<&str> {
        if !self.use_embeddings {
            return None;
        }
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// One ranked excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Path relative to the searched directory
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
    pub content: String,
    /// Cosine similarity, semantic mode only
    pub similarity: Option<f32>,
    pub score: f32,
    #[serde(
        rename = "constructType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub construct_kind: Option<ConstructKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construct_name: Option<String>,
    /// Matched range before context widening
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_end: Option<usize>,
}

impl SearchHit {
    /// Whether `line` belongs to the matched range rather than the context
    pub fn is_highlighted(&self, line: usize) -> bool {
        let start = self.highlight_start.unwrap_or(self.line_start);
        let end = self.highlight_end.unwrap_or(self.line_end);
        (start..=end).contains(&line)
    }
}

/// Why a result is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchNotice {
    EmptyQuery,
    NoFiles,
    NoMatches,
}

/// Output of one search invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    #[serde(rename = "results")]
    pub hits: Vec<SearchHit>,
    #[serde(rename = "resultCount")]
    pub count: usize,
    #[serde(rename = "semanticSearch")]
    pub used_semantic_search: bool,
    #[serde(rename = "filesSearched", default)]
    pub files_searched: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<SearchNotice>,
}

impl SearchResult {
    fn empty(query: &str, semantic: bool, files_searched: usize, notice: SearchNotice) -> Self {
        Self {
            query: query.to_string(),
            hits: Vec::new(),
            count: 0,
            used_semantic_search: semantic,
            files_searched,
            notice: Some(notice),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Scoring unit before it becomes a hit
#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    line_start: usize,
    line_end: usize,
    kind: Option<ConstructKind>,
    name: Option<String>,
}

/// Run a search, using the hosted embedding endpoint when
/// [`SearchOptions::semantic_api_key`] allows it and keyword scoring otherwise.
pub async fn search(query: &str, options: &SearchOptions) -> Result<SearchResult, SearchError> {
    let embedder = options
        .semantic_api_key()
        .map(|key| HttpEmbedder::new(key, options.embedding.clone()));
    let provider = embedder.as_ref().map(|e| e as &dyn EmbeddingProvider);
    search_with(query, options, provider).await
}

/// Run a search with an explicit embedding provider. `None` selects keyword
/// scoring.
///
/// Only a dimension mismatch between embeddings is an error; everything else
/// degrades to fewer or empty results.
pub async fn search_with(
    query: &str,
    options: &SearchOptions,
    embedder: Option<&dyn EmbeddingProvider>,
) -> Result<SearchResult, SearchError> {
    let semantic = embedder.is_some();
    let query_text = query.trim();
    if query_text.is_empty() {
        return Ok(SearchResult::empty(query, semantic, 0, SearchNotice::EmptyQuery));
    }

    let root = match std::fs::canonicalize(&options.directory) {
        Ok(root) => root,
        Err(e) => {
            debug!("cannot resolve {}: {}", options.directory.display(), e);
            return Ok(SearchResult::empty(query, semantic, 0, SearchNotice::NoFiles));
        }
    };

    let files = FileCollector::new(&root)
        .with_extensions(&options.extensions)
        .with_excludes(options.exclude_patterns.clone())
        .with_gitignore(options.respect_gitignore)
        .collect();
    if files.is_empty() {
        return Ok(SearchResult::empty(query, semantic, 0, SearchNotice::NoFiles));
    }

    let mut hits = match embedder {
        Some(provider) => semantic_hits(query_text, &root, &files, options, provider).await?,
        None => keyword_hits(query_text, &root, &files, options).await,
    };

    rank_hits(&mut hits, options.limit);
    let hits = assemble(hits, &root, options.context_lines).await;

    let count = hits.len();
    Ok(SearchResult {
        query: query.to_string(),
        hits,
        count,
        used_semantic_search: semantic,
        files_searched: files.len(),
        notice: (count == 0).then_some(SearchNotice::NoMatches),
    })
}

async fn keyword_hits(
    query: &str,
    root: &Path,
    files: &[PathBuf],
    options: &SearchOptions,
) -> Vec<SearchHit> {
    let keywords = KeywordQuery::parse(query);
    if keywords.is_empty() {
        debug!("query has no tokens longer than two characters");
        return Vec::new();
    }

    let extractor = ConstructExtractor::new();
    let mut parser = Parser::new();
    let mut hits = Vec::new();

    for (batch_idx, batch) in files.chunks(FILE_BATCH_SIZE).enumerate() {
        debug!("keyword batch {} ({} files)", batch_idx + 1, batch.len());
        for path in batch {
            let rel_path = relative_display_path(path, root);
            let source = match read_source(path).await {
                Ok(source) => source,
                Err(e) => {
                    warn!("skipping {}: {}", rel_path, e);
                    continue;
                }
            };
            let constructs = match construct_candidates(
                &extractor,
                &mut parser,
                &source,
                path,
                options.construct_filter,
            ) {
                Ok(constructs) => constructs,
                Err(e) => {
                    warn!("skipping {}: {}", rel_path, e);
                    continue;
                }
            };

            let candidates = if constructs.is_empty() {
                line_candidates(&source)
            } else {
                constructs
            };

            for candidate in candidates {
                let score = keywords.score(&candidate.text);
                if score > 0.0 {
                    hits.push(candidate.into_hit(&rel_path, score, None));
                }
            }
        }
    }

    hits
}

async fn semantic_hits(
    query: &str,
    root: &Path,
    files: &[PathBuf],
    options: &SearchOptions,
    embedder: &dyn EmbeddingProvider,
) -> Result<Vec<SearchHit>, SearchError> {
    let query_vector = embed_or_zero(embedder, query).await;

    let extractor = ConstructExtractor::new();
    let mut parser = Parser::new();
    let mut hits = Vec::new();

    for (batch_idx, batch) in files.chunks(FILE_BATCH_SIZE).enumerate() {
        debug!("semantic batch {} ({} files)", batch_idx + 1, batch.len());
        for path in batch {
            let rel_path = relative_display_path(path, root);
            let source = match read_source(path).await {
                Ok(source) => source,
                Err(e) => {
                    warn!("skipping {}: {}", rel_path, e);
                    continue;
                }
            };
            let constructs = match construct_candidates(
                &extractor,
                &mut parser,
                &source,
                path,
                options.construct_filter,
            ) {
                Ok(constructs) => constructs,
                Err(e) => {
                    warn!("skipping {}: {}", rel_path, e);
                    continue;
                }
            };

            let candidates = if constructs.is_empty() {
                chunk_candidates(&source)
            } else {
                constructs
            };

            for candidate in candidates {
                let vector = embed_or_zero(embedder, &candidate.text).await;
                let (similarity, score) = score_candidate(
                    &query_vector,
                    &vector,
                    candidate.text.chars().count(),
                    candidate.kind,
                )?;
                hits.push(candidate.into_hit(&rel_path, score, Some(similarity)));
            }
        }
    }

    Ok(hits)
}

/// Constructs are only consulted when a construct filter is requested.
fn construct_candidates(
    extractor: &ConstructExtractor,
    parser: &mut Parser,
    source: &str,
    path: &Path,
    filter: Option<ConstructKind>,
) -> Result<Vec<Candidate>, SearchError> {
    let Some(kind) = filter else {
        return Ok(Vec::new());
    };
    let language = Language::from_path(path);
    if !language.is_supported() {
        return Ok(Vec::new());
    }

    let constructs = extractor.extract_with_parser(source, language, Some(kind), parser)?;
    Ok(constructs
        .into_iter()
        .map(|construct| Candidate {
            text: construct.text(source).to_string(),
            line_start: construct.start_line,
            line_end: construct.end_line,
            kind: Some(construct.kind),
            name: Some(construct.name),
        })
        .collect())
}

fn chunk_candidates(source: &str) -> Vec<Candidate> {
    chunker::chunk(source)
        .into_iter()
        .map(|chunk| Candidate {
            text: chunk.text,
            line_start: chunk.line_start,
            line_end: chunk.line_end,
            kind: None,
            name: None,
        })
        .collect()
}

fn line_candidates(source: &str) -> Vec<Candidate> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim().chars().count() >= MIN_LINE_LEN)
        .map(|(idx, line)| Candidate {
            text: line.to_string(),
            line_start: idx + 1,
            line_end: idx + 1,
            kind: None,
            name: None,
        })
        .collect()
}

impl Candidate {
    fn into_hit(self, file: &str, score: f32, similarity: Option<f32>) -> SearchHit {
        SearchHit {
            file: file.to_string(),
            line_start: self.line_start,
            line_end: self.line_end,
            content: self.text,
            similarity,
            score,
            construct_kind: self.kind,
            construct_name: self.name,
            highlight_start: None,
            highlight_end: None,
        }
    }
}

async fn read_source(path: &Path) -> Result<String, SearchError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SearchError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Sort by score descending (ties by file, then line) and keep at most `limit`
pub fn rank_hits(hits: &mut Vec<SearchHit>, limit: usize) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line_start.cmp(&b.line_start))
    });
    hits.truncate(limit.max(1));
}

/// Widen every hit by `context_lines` on both sides, re-reading its file
/// relative to `root`. Hits whose file cannot be read are kept as they are.
pub async fn assemble(hits: Vec<SearchHit>, root: &Path, context_lines: usize) -> Vec<SearchHit> {
    let mut cache: HashMap<String, Option<Vec<String>>> = HashMap::new();
    let mut assembled = Vec::with_capacity(hits.len());

    for hit in hits {
        if !cache.contains_key(&hit.file) {
            let lines = read_file_lines(&root.join(&hit.file)).await;
            cache.insert(hit.file.clone(), lines);
        }
        let widened = match cache.get(&hit.file) {
            Some(Some(lines)) => widen_hit(&hit, lines, context_lines),
            _ => mark_unwidened(hit),
        };
        assembled.push(widened);
    }

    assembled
}

async fn read_file_lines(path: &Path) -> Option<Vec<String>> {
    match read_source(path).await {
        Ok(content) => Some(content.lines().map(str::to_string).collect()),
        Err(e) => {
            warn!("no context for hit: {}", e);
            None
        }
    }
}

/// Copy of `hit` covering `[start - context, end + context]`, clipped to the
/// file, with the original range kept as the highlight.
pub fn widen_hit(hit: &SearchHit, lines: &[String], context_lines: usize) -> SearchHit {
    let total = lines.len();
    if total == 0 || hit.line_start == 0 || hit.line_start > total {
        return mark_unwidened(hit.clone());
    }

    let match_end = hit.line_end.clamp(hit.line_start, total);
    let start = hit.line_start.saturating_sub(context_lines).max(1);
    let end = (match_end + context_lines).min(total);

    SearchHit {
        line_start: start,
        line_end: end,
        content: lines[start - 1..end].join("\n"),
        highlight_start: Some(hit.line_start),
        highlight_end: Some(match_end),
        ..hit.clone()
    }
}

fn mark_unwidened(hit: SearchHit) -> SearchHit {
    SearchHit {
        highlight_start: Some(hit.line_start),
        highlight_end: Some(hit.line_end),
        ..hit
    }
}
