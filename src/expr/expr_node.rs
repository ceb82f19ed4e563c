use crate::expr::Literal;
use std::fmt::{self, Write};

/// Index of a node inside an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

/// Comparison operator of a captured comparison node.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CompareOp {
    pub fn is_ordering(self) -> bool {
        matches!(self, CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq)
    }

    pub fn is_membership(self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::LtEq => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::GtEq => write!(f, ">="),
            CompareOp::In => write!(f, "in"),
            CompareOp::NotIn => write!(f, "not in"),
            CompareOp::Is => write!(f, "is"),
            CompareOp::IsNot => write!(f, "is not"),
        }
    }
}

impl fmt::Debug for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompareOp({})", self)
    }
}

/// One node of the captured expression tree.
///
/// Children are referenced by arena index; nodes themselves are immutable
/// after capture. Inferred types live in a side table, not on the node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// A bare name: loop variable or free variable.
    Name(String),
    /// `base.name`
    Attribute { base: ExprId, name: String },
    Const(Literal),
    /// `left op right [op right]*` — more than one pair is captured as-is
    /// and rejected during annotation.
    Compare { left: ExprId, ops: Vec<(CompareOp, ExprId)> },
    And(Vec<ExprId>),
    Or(Vec<ExprId>),
    Not(ExprId),
    List(Vec<ExprId>),
    Tuple(Vec<ExprId>),
}

/// Flat store for expression nodes of one captured comprehension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: ExprNode) -> ExprId {
        let id = ExprId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Capture-side constructors. Tests and the capture collaborator build
    // trees through these.

    pub fn name(&mut self, name: impl Into<String>) -> ExprId {
        self.push(ExprNode::Name(name.into()))
    }

    pub fn attr(&mut self, base: ExprId, name: impl Into<String>) -> ExprId {
        self.push(ExprNode::Attribute { base, name: name.into() })
    }

    pub fn lit(&mut self, literal: Literal) -> ExprId {
        self.push(ExprNode::Const(literal))
    }

    pub fn compare(&mut self, left: ExprId, op: CompareOp, right: ExprId) -> ExprId {
        self.push(ExprNode::Compare { left, ops: vec![(op, right)] })
    }

    pub fn and(&mut self, operands: Vec<ExprId>) -> ExprId {
        self.push(ExprNode::And(operands))
    }

    pub fn or(&mut self, operands: Vec<ExprId>) -> ExprId {
        self.push(ExprNode::Or(operands))
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        self.push(ExprNode::Not(operand))
    }

    pub fn list(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(ExprNode::List(items))
    }

    pub fn tuple(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(ExprNode::Tuple(items))
    }

    /// Render a node as source-like text, for error messages.
    pub fn describe(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.describe_into(id, &mut out);
        out
    }

    fn describe_into(&self, id: ExprId, out: &mut String) {
        match self.node(id) {
            ExprNode::Name(name) => out.push_str(name),
            ExprNode::Attribute { base, name } => {
                self.describe_into(*base, out);
                out.push('.');
                out.push_str(name);
            }
            ExprNode::Const(lit) => {
                let _ = write!(out, "{}", lit);
            }
            ExprNode::Compare { left, ops } => {
                self.describe_into(*left, out);
                for (op, right) in ops {
                    let _ = write!(out, " {} ", op);
                    self.describe_into(*right, out);
                }
            }
            ExprNode::And(items) => self.describe_joined(items, " and ", out),
            ExprNode::Or(items) => self.describe_joined(items, " or ", out),
            ExprNode::Not(operand) => {
                out.push_str("not ");
                self.describe_into(*operand, out);
            }
            ExprNode::List(items) => {
                out.push('[');
                self.describe_joined(items, ", ", out);
                out.push(']');
            }
            ExprNode::Tuple(items) => {
                out.push('(');
                self.describe_joined(items, ", ", out);
                out.push(')');
            }
        }
    }

    fn describe_joined(&self, items: &[ExprId], sep: &str, out: &mut String) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.describe_into(*item, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_push_and_lookup() {
        let mut arena = ExprArena::new();
        let a = arena.name("p");
        let b = arena.attr(a, "age");
        assert_eq!(arena.len(), 2);
        match arena.node(b) {
            ExprNode::Attribute { base, name } => {
                assert_eq!(*base, a);
                assert_eq!(name, "age");
            }
            _ => panic!(),
        }
    }

    #[test]
    fn test_describe_comparison() {
        let mut arena = ExprArena::new();
        let p = arena.name("p");
        let age = arena.attr(p, "age");
        let thirty = arena.lit(Literal::Int(30));
        let cmp = arena.compare(age, CompareOp::GtEq, thirty);
        assert_eq!(arena.describe(cmp), "p.age >= 30");
    }

    #[test]
    fn test_describe_membership_tuple() {
        let mut arena = ExprArena::new();
        let x = arena.name("x");
        let one = arena.lit(Literal::Int(1));
        let two = arena.lit(Literal::Int(2));
        let tup = arena.tuple(vec![one, two]);
        let cmp = arena.compare(x, CompareOp::In, tup);
        assert_eq!(arena.describe(cmp), "x in (1, 2)");
    }
}
