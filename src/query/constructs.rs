// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construct listing command

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use reposcope::output::{print_json, use_colors};
use reposcope::parser::{Construct, ConstructExtractor, ConstructKind, Language};

/// Construct listing for JSON output
#[derive(Debug, Serialize)]
struct ConstructListing<'a> {
    file: &'a str,
    language: &'static str,
    constructs: &'a [Construct],
}

/// Run the constructs command
pub fn run(
    file: &str,
    filter: Option<ConstructKind>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let path = Path::new(file);
    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", file))?;
    let language = Language::from_path(path);
    let constructs = ConstructExtractor::new()
        .extract(&source, language, filter)
        .with_context(|| format!("Failed to parse {}", file))?;

    match format {
        OutputFormat::Json => {
            let listing = ConstructListing {
                file,
                language: language.name(),
                constructs: &constructs,
            };
            print_json(&listing, compact)?;
        }
        // No page layout for a listing; html falls back to the text form
        OutputFormat::Text | OutputFormat::Html => {
            print!("{}", render_text(file, language, &constructs, use_colors()));
        }
    }

    Ok(())
}

fn render_text(file: &str, language: Language, constructs: &[Construct], use_color: bool) -> String {
    if !language.is_supported() {
        return format!("Unsupported file type: {}\n", file);
    }
    if constructs.is_empty() {
        return if use_color {
            format!("{} No constructs found in {}\n", "✗".red(), file.magenta())
        } else {
            format!("No constructs found in {}\n", file)
        };
    }

    let mut out = if use_color {
        format!(
            "{} {} constructs in {} ({})\n",
            "✓".green(),
            constructs.len().to_string().cyan(),
            file.magenta(),
            language.name()
        )
    } else {
        format!(
            "{} constructs in {} ({})\n",
            constructs.len(),
            file,
            language.name()
        )
    };

    for construct in constructs {
        let kind = format!("{:<8}", construct.kind.to_string());
        let lines = format!("{}-{}", construct.start_line, construct.end_line);
        if use_color {
            out.push_str(&format!(
                "  {} {}  {}\n",
                kind.blue(),
                construct.name.bold(),
                lines.yellow()
            ));
        } else {
            out.push_str(&format!("  {} {}  {}\n", kind, construct.name, lines));
        }
    }
    out
}
