// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output formatting for search results

mod html;
mod json;
mod text;

use colored::Colorize;
use std::io::IsTerminal;

use crate::search::SearchResult;

pub use html::format_html;
pub use json::{format_json, parse_json};
pub use text::format_text;

/// Rendering target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
    Html,
}

/// Presentation switches that do not change the data
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub use_color: bool,
    /// Single-line JSON
    pub compact: bool,
}

/// Render a result in the requested mode
pub fn format(
    result: &SearchResult,
    mode: OutputMode,
    options: FormatOptions,
) -> serde_json::Result<String> {
    match mode {
        OutputMode::Text => Ok(format_text(result, options.use_color)),
        OutputMode::Json => format_json(result, options.compact),
        OutputMode::Html => Ok(format_html(result)),
    }
}

/// True when stdout is a terminal and colors are not disabled
pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn colorize_path(path: &str, use_color: bool) -> String {
    if use_color {
        path.magenta().to_string()
    } else {
        path.to_string()
    }
}

pub fn colorize_line_num(line: usize, use_color: bool) -> String {
    if use_color {
        line.to_string().yellow().to_string()
    } else {
        line.to_string()
    }
}

pub fn colorize_context(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

pub fn colorize_match(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Print a serializable value as JSON to stdout
pub fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> serde_json::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}
