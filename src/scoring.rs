// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity and keyword scoring

use crate::errors::SearchError;
use crate::parser::ConstructKind;

/// Hits below this similarity are flagged in output. Display only.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;

const SIMILARITY_WEIGHT: f32 = 0.7;
const LENGTH_WEIGHT: f32 = 0.2;
const TYPE_WEIGHT: f32 = 0.1;
/// Chunk length (chars) at which the length term saturates
const LENGTH_SATURATION: f32 = 500.0;

/// Keyword tokens of this length or shorter are ignored
const MIN_TOKEN_LEN: usize = 2;
/// Lines shorter than this are not keyword candidates
pub const MIN_LINE_LEN: usize = 10;

/// Cosine similarity. Zero when either side has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SearchError> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Construct weight used by [`composite_score`]
pub fn type_weight(kind: Option<ConstructKind>) -> f32 {
    match kind {
        Some(ConstructKind::Function) => 1.2,
        Some(ConstructKind::Class) => 1.1,
        Some(ConstructKind::Variable) | None => 1.0,
    }
}

/// `0.7 * similarity + 0.2 * min(len / 500, 1) + 0.1 * typeWeight`
pub fn composite_score(similarity: f32, chunk_length: usize, kind: Option<ConstructKind>) -> f32 {
    let length_factor = (chunk_length as f32 / LENGTH_SATURATION).min(1.0);
    SIMILARITY_WEIGHT * similarity + LENGTH_WEIGHT * length_factor + TYPE_WEIGHT * type_weight(kind)
}

/// Score a candidate vector against the query vector
pub fn score_candidate(
    query_vector: &[f32],
    candidate_vector: &[f32],
    chunk_length: usize,
    kind: Option<ConstructKind>,
) -> Result<(f32, f32), SearchError> {
    let similarity = cosine_similarity(query_vector, candidate_vector)?;
    Ok((similarity, composite_score(similarity, chunk_length, kind)))
}

/// Lowercased query tokens used for substring matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    tokens: Vec<String>,
}

impl KeywordQuery {
    /// Whitespace tokens longer than two chars, lowercased, duplicates dropped
    pub fn parse(query: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in query
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_LEN)
            .map(|token| token.to_lowercase())
        {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Fraction of query tokens found in `text`, case-insensitively.
    ///
    /// The denominator is the number of distinct tokens, so "retry retry
    /// token" scores like "retry token".
    pub fn score(&self, text: &str) -> f32 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        let haystack = text.to_lowercase();
        let hits = self
            .tokens
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .count();
        hits as f32 / self.tokens.len() as f32
    }
}

/// Convenience form of [`KeywordQuery::score`]
pub fn keyword_score(query: &str, text: &str) -> f32 {
    KeywordQuery::parse(query).score(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_is_symmetric() {
        let a = [0.3, -1.2, 4.0, 0.5];
        let b = [1.1, 0.2, -0.7, 2.0];
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_against_zero_vector_is_exactly_zero() {
        let sim = cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
        assert_eq!(cosine_similarity(&[0.0; 3], &[0.0; 3]).unwrap(), 0.0);
    }

    #[test]
    fn cosine_dimension_mismatch_is_an_error() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch { left: 2, right: 3 }
        ));
    }

    #[test]
    fn composite_blend_matches_formula() {
        let score = composite_score(0.5, 250, Some(ConstructKind::Function));
        let expected = 0.7 * 0.5 + 0.2 * 0.5 + 0.1 * 1.2;
        assert!((score - expected).abs() < 1e-6);
    }

    #[test]
    fn function_outranks_variable_at_equal_similarity() {
        let function = composite_score(0.8, 300, Some(ConstructKind::Function));
        let class = composite_score(0.8, 300, Some(ConstructKind::Class));
        let variable = composite_score(0.8, 300, Some(ConstructKind::Variable));
        let plain = composite_score(0.8, 300, None);
        assert!(function >= class);
        assert!(class >= variable);
        assert_eq!(variable, plain);
    }

    #[test]
    fn longer_chunk_scores_higher_until_saturation() {
        let long = composite_score(0.6, 600, None);
        let short = composite_score(0.6, 100, None);
        assert!(long > short);
        assert_eq!(composite_score(0.6, 500, None), composite_score(0.6, 5000, None));
    }

    #[test]
    fn keyword_score_is_case_insensitive() {
        assert_eq!(
            keyword_score("Foo", "this has FOO in it"),
            keyword_score("foo", "this has foo in it")
        );
        assert_eq!(keyword_score("Foo", "this has FOO in it"), 1.0);
    }

    #[test]
    fn keyword_short_tokens_are_dropped() {
        let query = KeywordQuery::parse("a to add function");
        assert_eq!(query.tokens(), &["add".to_string(), "function".to_string()]);
        assert_eq!(query.score("function add(a, b) {"), 1.0);
        assert_eq!(query.score("return a + b;"), 0.0);
        assert_eq!(query.score("// add numbers"), 0.5);
    }

    #[test]
    fn keyword_query_of_only_short_tokens_scores_zero() {
        let query = KeywordQuery::parse("a b to");
        assert!(query.is_empty());
        assert_eq!(query.score("a b to"), 0.0);
    }

    #[test]
    fn repeated_query_tokens_count_once() {
        let query = KeywordQuery::parse("retry Retry backoff");
        assert_eq!(query.tokens().len(), 2);
        assert_eq!(query.score("retry loop"), 0.5);
    }
}
