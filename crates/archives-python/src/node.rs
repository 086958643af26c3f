//! [`SyntaxNode`] over a tree-sitter Python tree.

use archives_core::syntax::{AnnotationNode, NodeKind, ParameterNode, Position, SyntaxNode};
use tree_sitter::Node;

use crate::literal;

/// A statement or definition in a parsed Python file.
///
/// Decorated definitions are unwrapped: the handle points at the
/// `function_definition` / `class_definition` and remembers the
/// `decorated_definition` around it.
#[derive(Debug, Clone, Copy)]
pub struct PyNode<'t> {
    node: Node<'t>,
    decorated: Option<Node<'t>>,
    source: &'t str,
}

impl<'t> PyNode<'t> {
    pub(crate) fn root(node: Node<'t>, source: &'t str) -> Self {
        Self {
            node,
            decorated: None,
            source,
        }
    }

    fn statement(node: Node<'t>, source: &'t str) -> Self {
        if node.kind() == "decorated_definition" {
            if let Some(definition) = node.child_by_field_name("definition") {
                return Self {
                    node: definition,
                    decorated: Some(node),
                    source,
                };
            }
        }
        Self::root(node, source)
    }

    /// The underlying tree-sitter node.
    #[must_use]
    pub fn ts_node(&self) -> Node<'t> {
        self.node
    }

    /// Whether this definition sits directly in a class body.
    #[must_use]
    pub fn is_in_class_body(&self) -> bool {
        self.decorated
            .unwrap_or(self.node)
            .parent()
            .filter(|block| block.kind() == "block")
            .and_then(|block| block.parent())
            .is_some_and(|owner| owner.kind() == "class_definition")
    }

    fn text(&self, node: Node<'_>) -> &'t str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn single_string(&self) -> Option<Node<'t>> {
        if self.node.kind() != "expression_statement" {
            return None;
        }
        let mut cursor = self.node.walk();
        let mut children = self
            .node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment");
        match (children.next(), children.next()) {
            (Some(only), None) => string_expression(only),
            _ => None,
        }
    }

    /// Value of a string expression. Implicit concatenations are joined and
    /// yield nothing if any part is bytes or an f-string.
    fn literal_value(&self, node: Node<'t>) -> Option<String> {
        match node.kind() {
            "string" => literal::docstring_value(self.text(node)),
            "concatenated_string" => {
                let mut cursor = node.walk();
                let parts: Option<Vec<String>> = node
                    .named_children(&mut cursor)
                    .filter(|part| part.kind() == "string")
                    .map(|part| literal::docstring_value(self.text(part)))
                    .collect();
                parts.map(|parts| parts.concat())
            }
            _ => None,
        }
    }

    fn parameter(&self, node: Node<'t>) -> Option<ParameterNode> {
        let name = declared_name(node)?;
        let annotation = match node.kind() {
            "typed_parameter" | "typed_default_parameter" => node.child_by_field_name("type"),
            _ => None,
        };
        Some(ParameterNode {
            name: self.text(name).to_owned(),
            position: position(name),
            annotation: annotation.map(|ty| self.annotation(ty)),
        })
    }

    fn annotation(&self, node: Node<'t>) -> AnnotationNode {
        AnnotationNode {
            text: self.text(node).to_owned(),
            position: position(node),
        }
    }
}

/// The string or concatenation inside `node`, looking through parentheses.
fn string_expression(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "string" | "concatenated_string" => Some(node),
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let mut inner = node
                .named_children(&mut cursor)
                .filter(|child| child.kind() != "comment");
            match (inner.next(), inner.next()) {
                (Some(only), None) => string_expression(only),
                _ => None,
            }
        }
        _ => None,
    }
}

/// The identifier a parameter binds. `None` for the `*` and `/` separators.
pub(crate) fn declared_name(param: Node<'_>) -> Option<Node<'_>> {
    match param.kind() {
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => parameter_name(param),
        "default_parameter" | "typed_default_parameter" => param.child_by_field_name("name"),
        "typed_parameter" => {
            let mut cursor = param.walk();
            let target = param
                .named_children(&mut cursor)
                .find(|child| child.kind() != "type" && child.kind() != "comment")?;
            parameter_name(target)
        }
        _ => None,
    }
}

fn parameter_name(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier" => Some(node),
        "list_splat_pattern" | "dictionary_splat_pattern" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "identifier");
            inner
        }
        _ => None,
    }
}

fn position(node: Node<'_>) -> Position {
    let start = node.start_position();
    Position::new(start.row + 1, start.column)
}

impl SyntaxNode for PyNode<'_> {
    fn kind(&self) -> NodeKind {
        match self.node.kind() {
            "module" => NodeKind::Module,
            "class_definition" => NodeKind::Class,
            "function_definition" => NodeKind::Function,
            "expression_statement" if self.single_string().is_some() => NodeKind::StringExpr,
            _ => NodeKind::Other,
        }
    }

    fn name(&self) -> Option<String> {
        self.node
            .child_by_field_name("name")
            .map(|name| self.text(name).to_owned())
    }

    fn position(&self) -> Position {
        position(self.node)
    }

    fn body(&self) -> Vec<Self> {
        let block = match self.node.kind() {
            "module" => Some(self.node),
            "class_definition" | "function_definition" => self.node.child_by_field_name("body"),
            _ => None,
        };
        let Some(block) = block else {
            return Vec::new();
        };
        let mut cursor = block.walk();
        let statements = block
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .map(|child| Self::statement(child, self.source))
            .collect();
        statements
    }

    fn decorators(&self) -> Vec<String> {
        let Some(decorated) = self.decorated else {
            return Vec::new();
        };
        let mut cursor = decorated.walk();
        let decorators = decorated
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|decorator| {
                let text = self.text(decorator).trim();
                text.strip_prefix('@').unwrap_or(text).trim().to_owned()
            })
            .collect();
        decorators
    }

    fn parameters(&self) -> Vec<ParameterNode> {
        let Some(parameters) = self.node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = parameters.walk();
        let declared = parameters
            .named_children(&mut cursor)
            .filter_map(|param| self.parameter(param))
            .collect();
        declared
    }

    fn return_annotation(&self) -> Option<AnnotationNode> {
        self.node
            .child_by_field_name("return_type")
            .map(|ty| self.annotation(ty))
    }

    fn string_value(&self) -> Option<String> {
        self.single_string()
            .and_then(|string| self.literal_value(string))
    }

    fn is_async(&self) -> bool {
        if self.node.kind() != "function_definition" {
            return false;
        }
        let mut cursor = self.node.walk();
        let is_async = self
            .node
            .children(&mut cursor)
            .any(|child| child.kind() == "async");
        is_async
    }
}
