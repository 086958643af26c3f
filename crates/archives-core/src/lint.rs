//! The lint walker.
//!
//! Walks a [`Module`] depth-first in source order and evaluates the active
//! rules at every entity. Issues of an entity always precede the issues of
//! its children.

use std::ops::AddAssign;

use serde::Serialize;
use tracing::debug;

use crate::issue::Issue;
use crate::model::{Class, Entity, EntityKind, Function, Module};
use crate::rules::{RuleKind, RuleSet};

/// Visit counters for one or more lint runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintStats {
    /// Modules visited.
    pub modules: usize,
    /// Classes visited.
    pub classes: usize,
    /// Functions visited.
    pub functions: usize,
    /// Modules skipped by `@nolint`.
    pub modules_suppressed: usize,
    /// Classes skipped by `@nolint`.
    pub classes_suppressed: usize,
    /// Functions skipped by `@nolint`.
    pub functions_suppressed: usize,
}

impl LintStats {
    /// Folds another run's counters into this one.
    pub fn merge(&mut self, other: &Self) {
        self.modules += other.modules;
        self.classes += other.classes;
        self.functions += other.functions;
        self.modules_suppressed += other.modules_suppressed;
        self.classes_suppressed += other.classes_suppressed;
        self.functions_suppressed += other.functions_suppressed;
    }

    /// Entities visited, suppressed ones included.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.modules + self.classes + self.functions
    }

    /// Entities skipped by `@nolint`.
    #[must_use]
    pub fn suppressed(&self) -> usize {
        self.modules_suppressed + self.classes_suppressed + self.functions_suppressed
    }

    fn visit(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Module => self.modules += 1,
            EntityKind::Class => self.classes += 1,
            EntityKind::Function => self.functions += 1,
        }
    }

    fn suppress(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Module => self.modules_suppressed += 1,
            EntityKind::Class => self.classes_suppressed += 1,
            EntityKind::Function => self.functions_suppressed += 1,
        }
    }
}

impl AddAssign<&LintStats> for LintStats {
    fn add_assign(&mut self, other: &LintStats) {
        self.merge(other);
    }
}

/// Mutable state of a lint run.
///
/// Passed explicitly through the walk; nothing is kept in globals, so
/// independent runs never share counters.
#[derive(Debug, Default)]
pub struct LintContext {
    issues: Vec<Issue>,
    stats: LintStats,
}

impl LintContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues collected so far, in walk order.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Counters collected so far.
    #[must_use]
    pub fn stats(&self) -> &LintStats {
        &self.stats
    }

    /// Consumes the context into a report.
    #[must_use]
    pub fn into_report(self) -> LintReport {
        LintReport {
            issues: self.issues,
            stats: self.stats,
        }
    }

    /// Counts the entity and returns whether its own rules should run.
    fn enter(&mut self, entity: Entity<'_>) -> bool {
        self.stats.visit(entity.kind());
        if entity.is_lint_suppressed() {
            debug!("Suppressed {} '{}'", entity.kind(), entity.name());
            self.stats.suppress(entity.kind());
            return false;
        }
        true
    }
}

/// Result of linting one module.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// Issues in walk order.
    pub issues: Vec<Issue>,
    /// Visit counters.
    pub stats: LintStats,
}

impl LintReport {
    /// Returns true if no rule fired.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Lints `module` with `rules`, or with the whole catalog when `None`.
#[must_use]
pub fn lint(module: &Module, rules: Option<&RuleSet>) -> LintReport {
    let mut ctx = LintContext::new();
    lint_with(module, rules.unwrap_or(RuleSet::all()), &mut ctx);
    ctx.into_report()
}

/// Lints `module` into an existing context.
///
/// Issues and counters accumulate, so one context can span several modules.
pub fn lint_with(module: &Module, rules: &RuleSet, ctx: &mut LintContext) {
    debug!("Linting: {}", module.path().display());
    let entity = Entity::Module(module);
    if ctx.enter(entity) {
        apply(rules, RuleKind::Module, entity, ctx);
    }
    walk_children(module.classes(), module.functions(), rules, ctx);
}

fn walk_children(classes: &[Class], functions: &[Function], rules: &RuleSet, ctx: &mut LintContext) {
    for class in classes {
        walk_class(class, rules, ctx);
    }
    for function in functions {
        walk_function(function, rules, ctx);
    }
}

fn walk_class(class: &Class, rules: &RuleSet, ctx: &mut LintContext) {
    let entity = Entity::Class(class);
    if ctx.enter(entity) {
        apply(rules, RuleKind::Class, entity, ctx);
    }
    walk_children(class.classes(), class.functions(), rules, ctx);
}

fn walk_function(function: &Function, rules: &RuleSet, ctx: &mut LintContext) {
    let entity = Entity::Function(function);
    if ctx.enter(entity) {
        apply(rules, RuleKind::Function, entity, ctx);
        for rule in rules.of_kind(RuleKind::Argument) {
            for arg in rule.offending_args(function) {
                ctx.issues.push(Issue::new(rule, entity, Some(arg)));
            }
        }
    }
    walk_children(function.classes(), function.functions(), rules, ctx);
}

fn apply(rules: &RuleSet, kind: RuleKind, entity: Entity<'_>, ctx: &mut LintContext) {
    for rule in rules.of_kind(kind) {
        if rule.is_violated_by(entity) {
            ctx.issues.push(Issue::new(rule, entity, None));
        }
    }
}
