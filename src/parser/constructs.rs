// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construct extraction from AST using tree-sitter node traversal

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser};

use crate::errors::SearchError;
use crate::parser::languages::Language;

const ANONYMOUS: &str = "anonymous";

/// Coarse construct buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    Function,
    Class,
    Variable,
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructKind::Function => write!(f, "function"),
            ConstructKind::Class => write!(f, "class"),
            ConstructKind::Variable => write!(f, "variable"),
        }
    }
}

impl std::str::FromStr for ConstructKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "function" => Ok(ConstructKind::Function),
            "class" => Ok(ConstructKind::Class),
            "variable" => Ok(ConstructKind::Variable),
            other => Err(format!("unknown construct kind: {other}")),
        }
    }
}

/// A function, class or variable declaration found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Construct {
    pub kind: ConstructKind,
    pub name: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Construct {
    /// Source text covered by this construct
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start_offset..self.end_offset).unwrap_or("")
    }
}

/// Construct extractor using tree-sitter node traversal
pub struct ConstructExtractor;

impl Default for ConstructExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract constructs from source code.
    ///
    /// Unsupported languages yield an empty list. With `filter` set only that
    /// bucket is emitted.
    pub fn extract(
        &self,
        source: &str,
        language: Language,
        filter: Option<ConstructKind>,
    ) -> Result<Vec<Construct>, SearchError> {
        let mut parser = Parser::new();
        self.extract_with_parser(source, language, filter, &mut parser)
    }

    /// Extract constructs using a caller-provided parser instance.
    pub fn extract_with_parser(
        &self,
        source: &str,
        language: Language,
        filter: Option<ConstructKind>,
        parser: &mut Parser,
    ) -> Result<Vec<Construct>, SearchError> {
        let Some(grammar) = language.grammar() else {
            return Ok(Vec::new());
        };

        parser
            .set_language(&grammar)
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SearchError::Parse("parser produced no tree".to_string()))?;

        let mut constructs = Vec::new();
        self.traverse_node(
            tree.root_node(),
            source.as_bytes(),
            language,
            filter,
            &mut constructs,
        );
        Ok(constructs)
    }

    fn traverse_node(
        &self,
        node: Node,
        source: &[u8],
        language: Language,
        filter: Option<ConstructKind>,
        constructs: &mut Vec<Construct>,
    ) {
        let kind = if node.is_named() {
            classify_node(language, node.kind())
        } else {
            None
        };
        if let Some(kind) = kind {
            if filter.map_or(true, |wanted| wanted == kind) {
                constructs.push(Construct {
                    kind,
                    name: resolve_name(node, source),
                    start_offset: node.start_byte(),
                    end_offset: node.end_byte(),
                    start_line: node.start_position().row + 1,
                    end_line: node.end_position().row + 1,
                });
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.traverse_node(child, source, language, filter, constructs);
        }
    }
}

/// Map a node type to its bucket for the given language
fn classify_node(language: Language, node_kind: &str) -> Option<ConstructKind> {
    match language {
        Language::JsFamily(_) => match node_kind {
            "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "arrow_function"
            | "method_definition" => Some(ConstructKind::Function),
            "class_declaration" | "abstract_class_declaration" | "class" => {
                Some(ConstructKind::Class)
            }
            "lexical_declaration" | "variable_declaration" => Some(ConstructKind::Variable),
            _ => None,
        },
        Language::PythonFamily => match node_kind {
            "function_definition" => Some(ConstructKind::Function),
            "class_definition" => Some(ConstructKind::Class),
            "assignment" => Some(ConstructKind::Variable),
            _ => None,
        },
        Language::Unsupported => None,
    }
}

/// Name lookup order: `name` field, first declarator's name, first
/// identifier child, then "anonymous".
fn resolve_name(node: Node, source: &[u8]) -> String {
    if let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| node_text(n, source))
    {
        return name;
    }

    let mut cursor = node.walk();
    let declarator_name = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "variable_declarator")
        .and_then(|declarator| declarator.child_by_field_name("name"))
        .and_then(|n| node_text(n, source));
    if let Some(name) = declarator_name {
        return name;
    }

    let mut cursor = node.walk();
    let identifier = node
        .children(&mut cursor)
        .find(|child| child.kind() == "identifier")
        .and_then(|n| node_text(n, source));
    if let Some(name) = identifier {
        return name;
    }

    ANONYMOUS.to_string()
}

fn node_text(node: Node, source: &[u8]) -> Option<String> {
    let text = node.utf8_text(source).ok()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
