// SPDX-License-Identifier: MIT OR Apache-2.0

//! reposcope - Semantic code search tool
//!
//! Combines tree-sitter construct extraction with embedding similarity and a
//! keyword fallback to rank code against natural-language queries.

mod cli;
mod query;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use reposcope::config::{Config, ConfigOutputFormat};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        Some(ConfigOutputFormat::Html) => OutputFormat::Html,
        Some(ConfigOutputFormat::Text) | None => OutputFormat::Text,
    });

    match cli.command {
        Commands::Search {
            query,
            path_positional,
            path,
            limit,
            context,
            embeddings,
            api_key,
            construct,
            ext,
            no_ignore,
            output,
        } => {
            let args = query::search::SearchArgs {
                query,
                path: path.or(path_positional),
                limit,
                context,
                embeddings,
                api_key,
                construct: construct.map(Into::into),
                extensions: ext,
                no_ignore,
                output,
            };
            query::search::run(&args, &config, format, cli.compact).await?;
        }
        Commands::Constructs { file, construct } => {
            query::constructs::run(&file, construct.map(Into::into), format, cli.compact)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "reposcope", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn setup_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
