// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use reposcope::output::OutputMode;
use reposcope::parser::ConstructKind;

/// reposcope - Semantic code search for JavaScript and Python repositories
///
/// Ranks functions, classes and code chunks against a natural-language query
/// using embeddings, falling back to keyword matching when no API key is set.
#[derive(Parser, Debug)]
#[command(name = "reposcope")]
#[command(
    author,
    version,
    about,
    long_about = None,
    override_usage = "reposcope [OPTIONS] <COMMAND>",
    after_help = "Search quickstart:\n  reposcope s \"retry with backoff\" src/\n  reposcope search -e -k function \"parse config\" -p app/\n  reposcope --format html search \"auth\" -o report.html"
)]
pub struct Cli {
    /// Output format (text, json or html)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    /// Self-contained HTML page
    Html,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => OutputMode::Text,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Html => OutputMode::Html,
        }
    }
}

/// Construct bucket accepted by `-k/--construct`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliConstructKind {
    Function,
    Class,
    Variable,
}

impl From<CliConstructKind> for ConstructKind {
    fn from(kind: CliConstructKind) -> Self {
        match kind {
            CliConstructKind::Function => ConstructKind::Function,
            CliConstructKind::Class => ConstructKind::Class,
            CliConstructKind::Variable => ConstructKind::Variable,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank code in a directory against a natural-language query
    #[command(
        visible_aliases = ["s", "find"],
        after_help = "Examples:\n  reposcope s \"add two numbers\" src/\n  reposcope search -e \"token refresh\" -p app/ -m 5\n  reposcope search -k class \"http client\" --ext py"
    )]
    Search {
        /// Search query (natural language or keywords)
        query: String,

        /// Optional path (grep-style positional form)
        #[arg(value_name = "PATH")]
        path_positional: Option<String>,

        /// Path to search in (defaults to current directory)
        #[arg(short, long, help_heading = "Core")]
        path: Option<String>,

        /// Maximum number of results
        #[arg(
            short = 'm',
            long = "limit",
            visible_alias = "max-results",
            help_heading = "Core"
        )]
        limit: Option<usize>,

        /// Show N lines before and after each match (like grep -C)
        #[arg(short = 'C', long, help_heading = "Core")]
        context: Option<usize>,

        /// Rank by embedding similarity (needs an API key)
        #[arg(short = 'e', long, help_heading = "Mode")]
        embeddings: bool,

        /// API key for the embeddings endpoint
        #[arg(
            long,
            env = "OPENAI_API_KEY",
            hide_env_values = true,
            help_heading = "Mode"
        )]
        api_key: Option<String>,

        /// Only rank constructs of this kind
        #[arg(short = 'k', long, value_enum, help_heading = "Mode")]
        construct: Option<CliConstructKind>,

        /// Comma-separated extension allowlist (e.g. js,ts,py)
        #[arg(long, value_delimiter = ',', help_heading = "Scope")]
        ext: Vec<String>,

        /// Do not respect .gitignore/.ignore rules
        #[arg(long, help_heading = "Scope")]
        no_ignore: bool,

        /// Write rendered output to FILE instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<String>,
    },

    /// List the functions, classes and variables found in one file
    #[command(visible_aliases = ["c"])]
    Constructs {
        /// Source file to inspect
        file: String,

        /// Only list constructs of this kind
        #[arg(short = 'k', long, value_enum)]
        construct: Option<CliConstructKind>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
