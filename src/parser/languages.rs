// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language detection and grammar selection

use std::path::Path;

/// Grammar flavour inside the ECMAScript family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsDialect {
    JavaScript,
    TypeScript,
    Tsx,
}

/// Language family of a candidate file, resolved once from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JsFamily(JsDialect),
    PythonFamily,
    Unsupported,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Language::JsFamily(JsDialect::JavaScript),
            "ts" | "mts" | "cts" => Language::JsFamily(JsDialect::TypeScript),
            "tsx" => Language::JsFamily(JsDialect::Tsx),
            "py" | "pyi" => Language::PythonFamily,
            _ => Language::Unsupported,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unsupported)
    }

    pub fn is_supported(self) -> bool {
        self != Language::Unsupported
    }

    /// Short name used in output and for syntax highlighting
    pub fn name(self) -> &'static str {
        match self {
            Language::JsFamily(JsDialect::JavaScript) => "javascript",
            Language::JsFamily(JsDialect::TypeScript) | Language::JsFamily(JsDialect::Tsx) => {
                "typescript"
            }
            Language::PythonFamily => "python",
            Language::Unsupported => "text",
        }
    }

    /// Tree-sitter grammar, if this language has one
    pub fn grammar(self) -> Option<tree_sitter::Language> {
        match self {
            Language::JsFamily(JsDialect::JavaScript) => {
                Some(tree_sitter_javascript::LANGUAGE.into())
            }
            Language::JsFamily(JsDialect::TypeScript) => {
                Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            }
            Language::JsFamily(JsDialect::Tsx) => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Language::PythonFamily => Some(tree_sitter_python::LANGUAGE.into()),
            Language::Unsupported => None,
        }
    }
}
