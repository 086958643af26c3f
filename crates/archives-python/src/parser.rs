//! Parsing Python source with tree-sitter.

use std::collections::HashSet;

use thiserror::Error;
use tracing::trace;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::node::{declared_name, PyNode};

/// Errors produced while parsing Python source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bundled grammar does not match the tree-sitter runtime.
    #[error("incompatible tree-sitter grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser gave up without producing a tree.
    #[error("parser produced no tree")]
    NoTree,

    /// The source is not valid Python.
    #[error("{line}:{column}: {message}")]
    Syntax {
        /// Line of the first error (1-indexed).
        line: usize,
        /// Column of the first error (0-indexed).
        column: usize,
        /// What went wrong.
        message: String,
    },
}

impl ParseError {
    /// Position of the error, `(0, 0)` when the source was never read.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        match self {
            Self::Syntax { line, column, .. } => (*line, *column),
            Self::Language(_) | Self::NoTree => (0, 0),
        }
    }
}

/// Parses Python 3 source into a [`ParsedSource`].
pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    /// Creates a parser for the bundled Python grammar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] at the first error or missing token if
    /// the source is not valid Python 3. Python 2 `print`/`exec` statements
    /// and repeated parameter names are rejected too, though the grammar
    /// accepts them.
    pub fn parse(&self, source: impl Into<String>) -> Result<ParsedSource, ParseError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let tree = parser.parse(source.as_bytes(), None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            if let Some(error) = first_error(root) {
                let start = error.start_position();
                return Err(ParseError::Syntax {
                    line: start.row + 1,
                    column: start.column,
                    message: describe(error),
                });
            }
        }
        if let Some((node, message)) = first_rejected(root, &source) {
            let start = node.start_position();
            return Err(ParseError::Syntax {
                line: start.row + 1,
                column: start.column,
                message,
            });
        }
        trace!("Parsed {} bytes", source.len());

        Ok(ParsedSource { tree, source })
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A successfully parsed file. Owns both the text and its tree.
pub struct ParsedSource {
    tree: Tree,
    source: String,
}

impl ParsedSource {
    /// The module node.
    #[must_use]
    pub fn root(&self) -> PyNode<'_> {
        PyNode::root(self.tree.root_node(), &self.source)
    }

    /// The source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// First error or missing node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// First node in document order that Python 3 rejects but the grammar
/// accepts.
fn first_rejected<'t>(root: Node<'t>, source: &str) -> Option<(Node<'t>, String)> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if let Some(found) = rejected(node, source) {
            return Some(found);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn rejected<'t>(node: Node<'t>, source: &str) -> Option<(Node<'t>, String)> {
    match node.kind() {
        "print_statement" => Some((node, "Missing parentheses in call to 'print'".to_string())),
        "exec_statement" => Some((node, "Missing parentheses in call to 'exec'".to_string())),
        "parameters" | "lambda_parameters" => duplicate_parameter(node, source),
        _ => None,
    }
}

fn duplicate_parameter<'t>(parameters: Node<'t>, source: &str) -> Option<(Node<'t>, String)> {
    let mut seen = HashSet::new();
    let mut cursor = parameters.walk();
    let duplicate = parameters
        .named_children(&mut cursor)
        .filter_map(declared_name)
        .find_map(|name| {
            let text = name.utf8_text(source.as_bytes()).unwrap_or_default();
            (!seen.insert(text)).then(|| {
                let message = format!("duplicate argument '{text}' in function definition");
                (name, message)
            })
        });
    duplicate
}

fn describe(node: Node<'_>) -> String {
    if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        "invalid syntax".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archives_core::syntax::{NodeKind, SyntaxNode};

    #[test]
    fn parses_valid_source() {
        let parsed = PythonParser::new().parse("def f():\n    pass\n").unwrap();
        assert_eq!(parsed.root().kind(), NodeKind::Module);
        assert_eq!(parsed.root().body().len(), 1);
        assert!(parsed.source().starts_with("def"));
    }

    #[test]
    fn empty_source_is_an_empty_module() {
        let parsed = PythonParser::new().parse("").unwrap();
        assert!(parsed.root().body().is_empty());
    }

    #[test]
    fn reports_first_error_position() {
        let err = PythonParser::new()
            .parse("x = 1\ndef broken(:\n    pass\n")
            .err()
            .unwrap();
        let (line, _) = err.position();
        assert_eq!(line, 2);
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn python2_statements_are_rejected() {
        let err = PythonParser::new()
            .parse("x = 1\nprint 'hello'\n")
            .err()
            .unwrap();
        assert_eq!(err.position(), (2, 0));
        assert!(err.to_string().contains("'print'"));

        assert!(PythonParser::new().parse("print('hello')\n").is_ok());
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        let err = PythonParser::new()
            .parse("def f(a, a): pass\n")
            .err()
            .unwrap();
        assert_eq!(err.position(), (1, 9));
        assert!(err.to_string().contains("duplicate argument 'a'"));

        for src in [
            "def g(a, *, b: int = 1, **a): pass\n",
            "class C:\n    def m(self, x, y=1, x=2): pass\n",
            "h = lambda a, a: a\n",
        ] {
            assert!(PythonParser::new().parse(src).is_err(), "{src}");
        }
        assert!(PythonParser::new().parse("def f(a, /, b, *args, c, **kw): pass\n").is_ok());
    }

    #[test]
    fn missing_colon_is_rejected() {
        let err = PythonParser::new().parse("if x\n    pass\n").err().unwrap();
        assert_eq!(err.position().0, 1);
    }
}
