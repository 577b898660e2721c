// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-contained HTML report with inline syntax highlighting

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;

use crate::parser::Language;
use crate::scoring::SIMILARITY_THRESHOLD;
use crate::search::{SearchHit, SearchNotice, SearchResult};

static C_STYLE_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<comment>//.*$|/\*.*?\*/)|(?P<string>"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`(?:[^`\\]|\\.)*`)|(?P<number>\b\d+(?:\.\d+)?\b)|(?P<keyword>\b(?:async|await|break|case|catch|class|const|continue|default|delete|do|else|export|extends|false|finally|for|from|function|if|import|in|instanceof|interface|let|new|null|return|static|super|switch|this|throw|true|try|type|typeof|undefined|var|void|while|yield)\b)"#,
    )
    .expect("valid C-style token regex")
});

static HASH_COMMENT_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<comment>#.*$)|(?P<string>"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')|(?P<number>\b\d+(?:\.\d+)?\b)|(?P<keyword>\b(?:and|as|assert|async|await|break|class|continue|def|del|elif|else|except|False|finally|for|from|global|if|import|in|is|lambda|None|nonlocal|not|or|pass|raise|return|self|True|try|while|with|yield)\b)"#,
    )
    .expect("valid hash-comment token regex")
});

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 2rem; background: #f6f8fa; color: #24292f; }
h1 { font-size: 1.4rem; }
.summary { color: #57606a; margin-bottom: 1.5rem; }
.hit { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; margin-bottom: 1.5rem; overflow: hidden; }
.hit-header { padding: 0.6rem 1rem; border-bottom: 1px solid #d0d7de; background: #f6f8fa; display: flex; gap: 1rem; flex-wrap: wrap; align-items: baseline; }
.file { font-weight: 600; }
.metric { color: #57606a; font-size: 0.9rem; }
.low { color: #cf222e; }
.construct { background: #ddf4ff; color: #0969da; border-radius: 4px; padding: 0 0.4rem; font-size: 0.85rem; }
table.code { border-collapse: collapse; width: 100%; font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.85rem; }
table.code td { padding: 0 0.8rem; white-space: pre; vertical-align: top; }
table.code td.ln { color: #8c959f; text-align: right; user-select: none; width: 1%; }
table.code tr.hl { background: #fff8c5; }
table.code tr.hl td.ln { color: #57606a; font-weight: 600; }
.tok-kw { color: #cf222e; }
.tok-str { color: #0a3069; }
.tok-num { color: #0550ae; }
.tok-com { color: #6e7781; font-style: italic; }
.empty { color: #57606a; }
"#;

pub fn format_html(result: &SearchResult) -> String {
    let mut out = String::new();
    let title = format!("Search results: {}", escape_html(&result.query));

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", title);
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>{}</h1>", title);

    let mode = if result.used_semantic_search {
        "semantic"
    } else {
        "keyword"
    };
    let _ = writeln!(
        out,
        "<p class=\"summary\">{} results ({} search, {} files searched)</p>",
        result.count, mode, result.files_searched
    );

    if result.is_empty() {
        let message = match result.notice {
            Some(SearchNotice::EmptyQuery) => "Search query is empty",
            Some(SearchNotice::NoFiles) => "No code files found",
            Some(SearchNotice::NoMatches) | None => "No matches found",
        };
        let _ = writeln!(out, "<p class=\"empty\">{}</p>", message);
    }

    for hit in &result.hits {
        write_hit(&mut out, hit);
    }

    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

fn write_hit(out: &mut String, hit: &SearchHit) {
    let _ = writeln!(out, "<section class=\"hit\">");
    let _ = write!(
        out,
        "<div class=\"hit-header\"><span class=\"file\">{}:{}-{}</span><span class=\"metric\">score {:.3}</span>",
        escape_html(&hit.file),
        hit.line_start,
        hit.line_end,
        hit.score
    );
    if let Some(similarity) = hit.similarity {
        let low = if similarity < SIMILARITY_THRESHOLD {
            " <span class=\"low\">(low similarity)</span>"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<span class=\"metric\">similarity {:.3}{}</span>",
            similarity, low
        );
    }
    if let Some(kind) = hit.construct_kind {
        let name = hit.construct_name.as_deref().unwrap_or("anonymous");
        let _ = write!(
            out,
            "<span class=\"construct\">{} {}</span>",
            kind,
            escape_html(name)
        );
    }
    let _ = writeln!(out, "</div>");

    let tokens = token_pattern(&hit.file);
    let _ = writeln!(out, "<table class=\"code\">");
    for (offset, line) in hit.content.lines().enumerate() {
        let line_num = hit.line_start + offset;
        let class = if hit.is_highlighted(line_num) {
            " class=\"hl\""
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<tr{}><td class=\"ln\">{}</td><td>{}</td></tr>",
            class,
            line_num,
            highlight_line(line, tokens)
        );
    }
    let _ = writeln!(out, "</table>");
    let _ = writeln!(out, "</section>");
}

fn token_pattern(file: &str) -> &'static Regex {
    match Language::from_path(Path::new(file)) {
        Language::PythonFamily => &HASH_COMMENT_TOKENS,
        _ => &C_STYLE_TOKENS,
    }
}

/// Escape `line` and wrap keywords, strings, numbers and comments in spans
fn highlight_line(line: &str, tokens: &Regex) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in tokens.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&escape_html(&line[last..whole.start()]));
        let class = if caps.name("comment").is_some() {
            "tok-com"
        } else if caps.name("string").is_some() {
            "tok-str"
        } else if caps.name("number").is_some() {
            "tok-num"
        } else {
            "tok-kw"
        };
        let _ = write!(
            out,
            "<span class=\"{}\">{}</span>",
            class,
            escape_html(whole.as_str())
        );
        last = whole.end();
    }

    out.push_str(&escape_html(&line[last..]));
    out
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ConstructKind;

    fn sample() -> SearchResult {
        SearchResult {
            query: "compare <values>".to_string(),
            hits: vec![SearchHit {
                file: "src/cmp.js".to_string(),
                line_start: 3,
                line_end: 5,
                content: "// compare\nfunction lt(a, b) {\n  return a < b && \"x\";\n".to_string(),
                similarity: Some(0.5),
                score: 0.72,
                construct_kind: Some(ConstructKind::Function),
                construct_name: Some("lt".to_string()),
                highlight_start: Some(4),
                highlight_end: Some(5),
            }],
            count: 1,
            used_semantic_search: true,
            files_searched: 2,
            notice: None,
        }
    }

    #[test]
    fn page_is_self_contained() {
        let html = format_html(&sample());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<link"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn query_and_code_are_escaped() {
        let html = format_html(&sample());
        assert!(html.contains("Search results: compare &lt;values&gt;"));
        assert!(html.contains("a &lt; b &amp;&amp;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn matched_rows_are_highlighted() {
        let html = format_html(&sample());
        assert!(html.contains("<tr><td class=\"ln\">3</td>"));
        assert!(html.contains("<tr class=\"hl\"><td class=\"ln\">4</td>"));
        assert!(html.contains("<tr class=\"hl\"><td class=\"ln\">5</td>"));
        assert!(html.contains("(low similarity)"));
        assert!(html.contains("<span class=\"construct\">function lt</span>"));
    }

    #[test]
    fn tokens_get_classes() {
        let line = highlight_line("const n = 42; // answer", &C_STYLE_TOKENS);
        assert_eq!(
            line,
            "<span class=\"tok-kw\">const</span> n = <span class=\"tok-num\">42</span>; <span class=\"tok-com\">// answer</span>"
        );

        let py = highlight_line("def f(): return 'x'  # done", &HASH_COMMENT_TOKENS);
        assert!(py.starts_with("<span class=\"tok-kw\">def</span>"));
        assert!(py.contains("<span class=\"tok-str\">&#39;x&#39;</span>"));
        assert!(py.ends_with("<span class=\"tok-com\"># done</span>"));
    }

    #[test]
    fn empty_result_page_explains_why() {
        let mut result = sample();
        result.hits.clear();
        result.count = 0;
        result.notice = Some(SearchNotice::NoFiles);
        assert!(format_html(&result).contains("No code files found"));
    }
}
