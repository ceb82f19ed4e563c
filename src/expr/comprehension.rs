use crate::expr::{ExprArena, ExprId};
use std::fmt::{self, Display};

/// One `var in iterable [if condition]*` clause of the source expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub var: String,
    pub iterable: ExprId,
    pub conditions: Vec<ExprId>,
}

impl Qualifier {
    pub fn new(var: impl Into<String>, iterable: ExprId) -> Self {
        Self { var: var.into(), iterable, conditions: Vec::new() }
    }

    pub fn filter(mut self, condition: ExprId) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A captured filtering-iteration expression: the selected root expression
/// plus its qualifiers, with all nodes owned by one arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub arena: ExprArena,
    pub root: ExprId,
    pub qualifiers: Vec<Qualifier>,
}

impl Comprehension {
    pub fn new(arena: ExprArena, root: ExprId, qualifiers: Vec<Qualifier>) -> Self {
        Self { arena, root, qualifiers }
    }
}

/// Shapes the capture collaborator refuses to produce. Propagated to the
/// caller unchanged when translation is driven straight from capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    MultipleTargets,
    DestructuringTarget,
    NestedComprehension,
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::MultipleTargets => write!(f, "qualifier has more than one assignment target"),
            CaptureError::DestructuringTarget => write!(f, "destructuring loop targets are not supported"),
            CaptureError::NestedComprehension => write!(f, "nested comprehensions are not supported"),
        }
    }
}

impl std::error::Error for CaptureError {}
