// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering

use colored::Colorize;
use std::fmt::Write as _;

use super::{colorize_context, colorize_line_num, colorize_match, colorize_path};
use crate::scoring::SIMILARITY_THRESHOLD;
use crate::search::{SearchHit, SearchNotice, SearchResult};

pub fn format_text(result: &SearchResult, use_color: bool) -> String {
    let mut out = String::new();

    if result.is_empty() {
        let message = match result.notice {
            Some(SearchNotice::EmptyQuery) => "Search query is empty".to_string(),
            Some(SearchNotice::NoFiles) => "No code files found".to_string(),
            Some(SearchNotice::NoMatches) | None => {
                format!("No matches found for: {}", result.query)
            }
        };
        if use_color {
            let _ = writeln!(out, "{} {}", "✗".red(), message);
        } else {
            let _ = writeln!(out, "{}", message);
        }
        return out;
    }

    let mode = if result.used_semantic_search {
        "semantic"
    } else {
        "keyword"
    };
    if use_color {
        let _ = writeln!(
            out,
            "\n{} Found {} results for: {} ({})\n",
            "✓".green(),
            result.count.to_string().cyan(),
            result.query.yellow(),
            mode
        );
    } else {
        let _ = writeln!(
            out,
            "\nFound {} results for: {} ({})\n",
            result.count, result.query, mode
        );
    }

    for (idx, hit) in result.hits.iter().enumerate() {
        if idx > 0 {
            let separator = if use_color {
                "--".dimmed().to_string()
            } else {
                "--".to_string()
            };
            let _ = writeln!(out, "{}", separator);
        }
        let _ = writeln!(out, "{}", hit_header(hit, use_color));
        write_hit_lines(&mut out, hit, use_color);
    }

    out
}

fn hit_header(hit: &SearchHit, use_color: bool) -> String {
    let mut header = format!(
        "{}:{}-{}  score {:.3}",
        colorize_path(&hit.file, use_color),
        colorize_line_num(hit.line_start, use_color),
        colorize_line_num(hit.line_end, use_color),
        hit.score
    );

    if let Some(similarity) = hit.similarity {
        let _ = write!(header, "  similarity {:.3}", similarity);
        if similarity < SIMILARITY_THRESHOLD {
            let note = if use_color {
                "(low similarity)".red().to_string()
            } else {
                "(low similarity)".to_string()
            };
            let _ = write!(header, " {}", note);
        }
    }

    if let Some(kind) = hit.construct_kind {
        let name = hit.construct_name.as_deref().unwrap_or("anonymous");
        let tag = format!("[{} {}]", kind, name);
        if use_color {
            let _ = write!(header, "  {}", tag.blue());
        } else {
            let _ = write!(header, "  {}", tag);
        }
    }

    header
}

fn write_hit_lines(out: &mut String, hit: &SearchHit, use_color: bool) {
    let width = hit.line_end.to_string().len();
    for (offset, line) in hit.content.lines().enumerate() {
        let line_num = hit.line_start + offset;
        let highlighted = hit.is_highlighted(line_num);
        let marker = match (highlighted, use_color) {
            (true, true) => ">".blue().to_string(),
            (true, false) => ">".to_string(),
            (false, _) => " ".to_string(),
        };
        let padded = format!("{:>width$}", line_num, width = width);
        let num = if use_color {
            padded.yellow().to_string()
        } else {
            padded
        };
        let body = if highlighted {
            colorize_match(line, use_color)
        } else {
            colorize_context(line, use_color)
        };
        let _ = writeln!(out, "{} {} | {}", marker, num, body);
    }
}
