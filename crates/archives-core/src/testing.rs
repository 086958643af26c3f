//! In-memory syntax tree for unit tests.

use std::cell::Cell;

use crate::syntax::{AnnotationNode, Complexity, ComplexityOracle, NodeKind, ParameterNode, Position, SyntaxNode};

#[derive(Debug, Clone)]
pub(crate) struct FakeNode {
    kind: NodeKind,
    name: Option<String>,
    position: Position,
    body: Vec<FakeNode>,
    params: Vec<ParameterNode>,
    returns: Option<AnnotationNode>,
    value: Option<String>,
}

impl FakeNode {
    fn new(kind: NodeKind, name: Option<&str>, body: Vec<FakeNode>) -> Self {
        Self {
            kind,
            name: name.map(str::to_owned),
            position: Position::new(1, 0),
            body,
            params: Vec::new(),
            returns: None,
            value: None,
        }
    }

    pub(crate) fn module(body: Vec<FakeNode>) -> Self {
        Self::new(NodeKind::Module, None, body)
    }

    pub(crate) fn class(name: &str, body: Vec<FakeNode>) -> Self {
        Self::new(NodeKind::Class, Some(name), body)
    }

    pub(crate) fn function(name: &str, body: Vec<FakeNode>) -> Self {
        Self::new(NodeKind::Function, Some(name), body)
    }

    pub(crate) fn string(value: &str) -> Self {
        let mut node = Self::new(NodeKind::StringExpr, None, Vec::new());
        node.value = Some(value.to_owned());
        node
    }

    pub(crate) fn other() -> Self {
        Self::new(NodeKind::Other, None, Vec::new())
    }

    pub(crate) fn at(mut self, line: usize, column: usize) -> Self {
        self.position = Position::new(line, column);
        self
    }

    /// Parameters as `(name, annotation)`; each one sits on the definition line.
    pub(crate) fn with_params(mut self, params: &[(&str, Option<&str>)]) -> Self {
        let line = self.position.line;
        self.params = params
            .iter()
            .enumerate()
            .map(|(i, (name, annotation))| {
                let position = Position::new(line, 6 + i * 8);
                ParameterNode {
                    name: (*name).to_owned(),
                    position,
                    annotation: annotation.map(|text| AnnotationNode {
                        text: text.to_owned(),
                        position,
                    }),
                }
            })
            .collect();
        self
    }

    pub(crate) fn with_returns(mut self, text: &str) -> Self {
        self.returns = Some(AnnotationNode {
            text: text.to_owned(),
            position: self.position,
        });
        self
    }
}

impl SyntaxNode for FakeNode {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn body(&self) -> Vec<Self> {
        self.body.clone()
    }

    fn parameters(&self) -> Vec<ParameterNode> {
        self.params.clone()
    }

    fn return_annotation(&self) -> Option<AnnotationNode> {
        self.returns.clone()
    }

    fn string_value(&self) -> Option<String> {
        self.value.clone()
    }
}

/// Scores every function the same and counts how often it was asked.
#[derive(Debug)]
pub(crate) struct FixedOracle {
    score: u32,
    calls: Cell<usize>,
}

impl FixedOracle {
    pub(crate) fn new(score: u32) -> Self {
        Self {
            score,
            calls: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Default for FixedOracle {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ComplexityOracle<FakeNode> for FixedOracle {
    fn measure(&self, _function: &FakeNode) -> Complexity {
        self.calls.set(self.calls.get() + 1);
        Complexity {
            score: self.score,
            is_method: false,
        }
    }
}

/// Builds a model from a fake tree scored at complexity 1.
pub(crate) fn build_module(root: &FakeNode, path: &str) -> crate::model::Module {
    crate::model::ModelBuilder::new(&FixedOracle::default()).build(root, path)
}
