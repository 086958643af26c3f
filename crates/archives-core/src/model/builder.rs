//! Builds the structural model from a syntax tree.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::trace;

use super::{Annotation, Argument, Class, EntityKind, Function, Module, ModuleKey};
use crate::docstring::Docstring;
use crate::syntax::{AnnotationNode, ComplexityOracle, NodeKind, SyntaxNode};

/// Walks a syntax tree once and produces a [`Module`].
///
/// The oracle is asked exactly once per function node, however deeply the
/// function is nested.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder<'o, O> {
    oracle: &'o O,
}

impl<'o, O> ModelBuilder<'o, O> {
    /// Creates a builder scoring functions with `oracle`.
    #[must_use]
    pub fn new(oracle: &'o O) -> Self {
        Self { oracle }
    }

    /// Builds the model of the file rooted at `root`.
    pub fn build<N>(&self, root: &N, path: impl Into<PathBuf>) -> Module
    where
        N: SyntaxNode,
        O: ComplexityOracle<N>,
    {
        let key = ModuleKey::new(path);
        let name = key.path().file_name().map_or_else(
            || key.path().to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        );
        let body = root.body();
        let doc = docstring_of(&body, EntityKind::Module);
        let (functions, classes) = self.definitions(&body, &key);

        Module {
            key,
            name,
            functions,
            classes,
            doc,
        }
    }

    fn definitions<N>(&self, body: &[N], key: &ModuleKey) -> (Vec<Function>, Vec<Class>)
    where
        N: SyntaxNode,
        O: ComplexityOracle<N>,
    {
        let mut functions = Vec::new();
        let mut classes = Vec::new();
        for node in body {
            match node.kind() {
                NodeKind::Function => functions.push(self.function(node, key)),
                NodeKind::Class => classes.push(self.class(node, key)),
                NodeKind::Module | NodeKind::StringExpr | NodeKind::Other => {}
            }
        }
        (functions, classes)
    }

    fn function<N>(&self, node: &N, key: &ModuleKey) -> Function
    where
        N: SyntaxNode,
        O: ComplexityOracle<N>,
    {
        let name = node.name().unwrap_or_default();
        let body = node.body();
        let doc = docstring_of(&body, EntityKind::Function);

        let arguments: Vec<Argument> = node
            .parameters()
            .into_iter()
            .map(|p| Argument::new(p.name, p.position, p.annotation.map(annotation)))
            .collect();

        let declared: BTreeSet<String> = arguments
            .iter()
            .filter(|arg| !arg.is_receiver())
            .map(|arg| arg.name().to_owned())
            .collect();
        let documented: BTreeSet<String> = doc
            .as_ref()
            .map(|d| d.argument_docs().keys().cloned().collect())
            .unwrap_or_default();
        let missing_args = declared.difference(&documented).cloned().collect();
        let unexpected_args = documented.difference(&declared).cloned().collect();

        let complexity = self.oracle.measure(node);
        trace!(function = %name, complexity = complexity.score, "scored function");

        let (functions, classes) = self.definitions(&body, key);

        Function {
            name,
            position: node.position(),
            module: key.clone(),
            decorators: node.decorators(),
            arguments,
            functions,
            classes,
            doc,
            complexity: complexity.score,
            is_method: complexity.is_method,
            is_async: node.is_async(),
            returns: node.return_annotation().map(annotation),
            missing_args,
            unexpected_args,
        }
    }

    fn class<N>(&self, node: &N, key: &ModuleKey) -> Class
    where
        N: SyntaxNode,
        O: ComplexityOracle<N>,
    {
        let body = node.body();
        let doc = docstring_of(&body, EntityKind::Class);
        let (functions, classes) = self.definitions(&body, key);

        Class {
            name: node.name().unwrap_or_default(),
            position: node.position(),
            module: key.clone(),
            decorators: node.decorators(),
            functions,
            classes,
            doc,
        }
    }
}

fn annotation(node: AnnotationNode) -> Annotation {
    Annotation::new(&node.text, node.position)
}

/// A docstring is a bare string expression as the first body statement.
fn docstring_of<N: SyntaxNode>(body: &[N], kind: EntityKind) -> Option<Docstring> {
    body.first()
        .filter(|node| node.kind() == NodeKind::StringExpr)
        .and_then(SyntaxNode::string_value)
        .map(|text| Docstring::parse(&text, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNode, FixedOracle};

    fn build(root: &FakeNode) -> Module {
        ModelBuilder::new(&FixedOracle::default()).build(root, "pkg/sample.py")
    }

    #[test]
    fn module_name_is_final_path_component() {
        let module = build(&FakeNode::module(vec![]));
        assert_eq!(module.name(), "sample.py");
        assert!(module.doc().is_none());
    }

    #[test]
    fn first_string_statement_is_docstring() {
        let module = build(&FakeNode::module(vec![
            FakeNode::string("@desc the module\n@author me"),
            FakeNode::function("f", vec![FakeNode::other(), FakeNode::string("@desc not a doc")]),
        ]));
        assert_eq!(module.doc().map(Docstring::description), Some("the module"));
        assert!(module.functions()[0].doc().is_none());
    }

    #[test]
    fn nested_definitions_are_owned_by_their_parent() {
        let module = build(&FakeNode::module(vec![FakeNode::class(
            "Outer",
            vec![
                FakeNode::class("Inner", vec![FakeNode::function("deep", vec![])]),
                FakeNode::function("method", vec![FakeNode::function("closure", vec![])]),
            ],
        )]));

        let outer = &module.classes()[0];
        assert_eq!(outer.classes()[0].name(), "Inner");
        assert_eq!(outer.classes()[0].functions()[0].name(), "deep");
        assert_eq!(outer.functions()[0].functions()[0].name(), "closure");
        assert_eq!(outer.functions()[0].module().path(), module.path());
        assert_eq!(module.entity_count(), 6);
    }

    #[test]
    fn reconciles_documented_and_declared_arguments() {
        let module = build(&FakeNode::module(vec![FakeNode::function(
            "f",
            vec![FakeNode::string("@arg a: doc\n@arg ghost: not declared")],
        )
        .with_params(&[("self", None), ("a", Some("int")), ("b", None)])]));

        let f = &module.functions()[0];
        assert_eq!(f.missing_args().iter().collect::<Vec<_>>(), ["b"]);
        assert_eq!(f.unexpected_args().iter().collect::<Vec<_>>(), ["ghost"]);
        assert_eq!(f.untyped_args().map(Argument::name).collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn undocumented_function_misses_every_non_receiver_argument() {
        let module = build(&FakeNode::module(vec![FakeNode::function("f", vec![])
            .with_params(&[("cls", None), ("x", None), ("y", Some("str"))])]));

        let f = &module.functions()[0];
        assert_eq!(f.missing_args().iter().collect::<Vec<_>>(), ["x", "y"]);
        assert!(f.unexpected_args().is_empty());
    }

    #[test]
    fn records_return_annotation_and_complexity() {
        let oracle = FixedOracle::new(4);
        let root = FakeNode::module(vec![
            FakeNode::function("typed", vec![]).with_returns("None"),
            FakeNode::function("untyped", vec![]),
        ]);
        let module = ModelBuilder::new(&oracle).build(&root, "m.py");

        let typed = &module.functions()[0];
        assert!(typed.is_return_typed());
        assert!(typed.returns().is_some_and(Annotation::is_no_value));
        assert_eq!(typed.complexity(), 4);
        assert!(!module.functions()[1].is_return_typed());
        assert_eq!(oracle.calls(), 2);
    }
}
