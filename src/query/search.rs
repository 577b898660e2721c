// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search command: merge flags with config, run the pipeline, render

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cli::OutputFormat;
use reposcope::config::Config;
use reposcope::embedding::EmbeddingSettings;
use reposcope::errors::suggestions;
use reposcope::output::{self, FormatOptions, OutputMode};
use reposcope::parser::ConstructKind;
use reposcope::search::{self as pipeline, SearchNotice, SearchOptions, SearchResult};

/// Search flags after clap parsing
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: String,
    pub path: Option<String>,
    pub limit: Option<usize>,
    pub context: Option<usize>,
    pub embeddings: bool,
    pub api_key: Option<String>,
    pub construct: Option<ConstructKind>,
    pub extensions: Vec<String>,
    pub no_ignore: bool,
    pub output: Option<String>,
}

/// Run the search command
pub async fn run(
    args: &SearchArgs,
    config: &Config,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let start_time = Instant::now();
    let options = build_options(args, config);

    if options.use_embeddings && options.semantic_api_key().is_none() {
        eprintln!(
            "Warning: --embeddings needs an API key (--api-key or OPENAI_API_KEY); using keyword search."
        );
    }

    let spinner = if options.semantic_api_key().is_some()
        && format == OutputFormat::Text
        && std::io::stderr().is_terminal()
    {
        Some(start_spinner())
    } else {
        None
    };

    let outcome = pipeline::search(&args.query, &options).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = outcome.context("Search failed")?;

    let to_file = args.output.is_some();
    let format_options = FormatOptions {
        use_color: !to_file && format == OutputFormat::Text && output::use_colors(),
        compact,
    };
    let rendered = output::format(&result, OutputMode::from(format), format_options)
        .context("Failed to render results")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write results to {}", path))?;
            eprintln!("Wrote {} results to {}", result.count, path);
        }
        None => print!("{}", ensure_trailing_newline(rendered)),
    }

    if format == OutputFormat::Text {
        if let Some(hint) = notice_hint(&result, &options) {
            eprintln!("\n{}", hint);
        }
        eprintln!(
            "\n{} files | {} results | {:.2}ms",
            result.files_searched,
            result.count,
            start_time.elapsed().as_secs_f64() * 1000.0
        );
    }

    Ok(())
}

/// Merge CLI flags over config values into pipeline options
pub(crate) fn build_options(args: &SearchArgs, config: &Config) -> SearchOptions {
    let directory = args
        .path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = SearchOptions::new(directory);
    options.limit = config.merge_max_results(args.limit);
    options.context_lines = config.merge_context_lines(args.context);
    options.use_embeddings = config.merge_use_embeddings(args.embeddings);
    options.api_key = args.api_key.clone();
    options.construct_filter = args.construct;
    options.extensions = config.merge_extensions(&args.extensions);
    options.exclude_patterns = config.exclude_patterns.clone();
    options.respect_gitignore = !args.no_ignore;
    options.embedding = EmbeddingSettings {
        model: config.embedding_model(),
        endpoint: config.embedding_endpoint(),
    };
    options
}

fn start_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Embedding candidates...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn notice_hint(result: &SearchResult, options: &SearchOptions) -> Option<String> {
    match result.notice? {
        SearchNotice::EmptyQuery => Some(suggestions::empty_query_message()),
        SearchNotice::NoFiles => Some(suggestions::no_files_message(
            &options.directory.display().to_string(),
        )),
        SearchNotice::NoMatches => Some(suggestions::no_matches_message(&result.query)),
    }
}

fn ensure_trailing_newline(mut rendered: String) -> String {
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposcope::config::EmbeddingsSection;

    #[test]
    fn cli_flags_override_config() {
        let config = Config {
            max_results: Some(3),
            context_lines: Some(5),
            extensions: vec!["py".to_string()],
            exclude_patterns: vec!["fixtures".to_string()],
            embeddings: EmbeddingsSection {
                enabled: Some(false),
                model: Some("custom-model".to_string()),
                endpoint: None,
            },
            ..Config::default()
        };
        let args = SearchArgs {
            query: "q".to_string(),
            path: Some("src".to_string()),
            limit: Some(7),
            extensions: vec!["js".to_string()],
            no_ignore: true,
            ..SearchArgs::default()
        };

        let options = build_options(&args, &config);
        assert_eq!(options.directory, PathBuf::from("src"));
        assert_eq!(options.limit, 7);
        assert_eq!(options.context_lines, 5);
        assert_eq!(options.extensions, vec!["js".to_string()]);
        assert_eq!(options.exclude_patterns, vec!["fixtures".to_string()]);
        assert!(!options.respect_gitignore);
        assert!(!options.use_embeddings);
        assert_eq!(options.embedding.model, "custom-model");
    }

    #[test]
    fn defaults_apply_without_flags_or_config() {
        let args = SearchArgs {
            query: "q".to_string(),
            ..SearchArgs::default()
        };
        let options = build_options(&args, &Config::default());
        assert_eq!(options.directory, PathBuf::from("."));
        assert_eq!(options.limit, 10);
        assert_eq!(options.context_lines, 2);
        assert!(options.respect_gitignore);
        assert!(options.semantic_api_key().is_none());
    }

    #[test]
    fn embeddings_without_key_stays_keyword() {
        let args = SearchArgs {
            query: "q".to_string(),
            embeddings: true,
            api_key: Some("   ".to_string()),
            ..SearchArgs::default()
        };
        let options = build_options(&args, &Config::default());
        assert!(options.use_embeddings);
        assert!(options.semantic_api_key().is_none());
    }
}
