use std::fmt::{self, Display};

use crate::expr::{CaptureError, CompareOp};
use crate::translator::SemanticType;

/// All the ways one translation can fail. Fail-fast: the first error aborts
/// the whole translation, nothing is retried internally.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// Unsupported expression shape, surfaced by the capture collaborator.
    Capture(CaptureError),
    UnboundVariable(String),
    NotIterable { var: String, found: SemanticType },
    NonBooleanCondition { var: String, found: SemanticType },
    NonBooleanOperand(SemanticType),
    IncomparableTypes { op: CompareOp, left: SemanticType, right: SemanticType },
    UnknownAttribute { entity: String, attribute: String },
    /// A to-many attribute used outside an iteration source position.
    CollectionAttributeMisuse(String),
    /// Composite operands with differing column counts.
    ArityMismatch { left: usize, right: usize },
    /// A literal or resolved value of a native type with no canonical mapping.
    UnsupportedType(String),
    ChainedComparison,
    /// The selected expression is not a bare loop variable.
    ProjectionExpression,
    /// Membership test against something other than a literal element list.
    UnsupportedMembership(String),
    /// Attribute path not rooted at a loop variable.
    AttributePath(String),
    Other(String),
}

impl Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Capture(err) => write!(f, "capture error: {}", err),
            TranslateError::UnboundVariable(name) => write!(f, "unbound variable `{}`", name),
            TranslateError::NotIterable { var, found } => {
                write!(f, "iteration source of `{}` is not an entity collection (found {})", var, found)
            }
            TranslateError::NonBooleanCondition { var, found } => {
                write!(f, "filter condition on `{}` is not boolean (found {})", var, found)
            }
            TranslateError::NonBooleanOperand(found) => {
                write!(f, "logical operator applied to non-boolean operand (found {})", found)
            }
            TranslateError::IncomparableTypes { op, left, right } => {
                write!(f, "types {} and {} cannot be compared with `{}`", left, right, op)
            }
            TranslateError::UnknownAttribute { entity, attribute } => {
                write!(f, "entity {} has no attribute `{}`", entity, attribute)
            }
            TranslateError::CollectionAttributeMisuse(what) => {
                write!(f, "collection `{}` can only be used as an iteration source", what)
            }
            TranslateError::ArityMismatch { left, right } => {
                write!(f, "composite key operands have {} and {} columns", left, right)
            }
            TranslateError::UnsupportedType(what) => {
                write!(f, "`{}` has no canonical query type", what)
            }
            TranslateError::ChainedComparison => {
                write!(f, "chained comparisons are not supported")
            }
            TranslateError::ProjectionExpression => {
                write!(f, "only a bare loop variable can be selected")
            }
            TranslateError::UnsupportedMembership(what) => {
                write!(f, "unsupported membership test against `{}`", what)
            }
            TranslateError::AttributePath(path) => {
                write!(f, "unsupported attribute path `{}`", path)
            }
            TranslateError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<CaptureError> for TranslateError {
    fn from(err: CaptureError) -> Self {
        TranslateError::Capture(err)
    }
}
