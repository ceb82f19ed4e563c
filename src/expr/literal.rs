use ordered_float::NotNan;
use serde_json::{json, Value};
use std::fmt::{self, Display};

/// A constant captured from the source expression, before normalization.
///
/// Every native literal form is representable here; whether it has a
/// canonical semantic type is decided later by the annotator.
#[derive(Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// A markup-wrapped string (safe-HTML and friends). Treated as a plain
    /// string by normalization.
    Markup(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Tuple(Vec<Literal>),
    Null,
}

impl Literal {
    /// Convert into the value shape used by the query AST and parameter table.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) | Literal::Markup(s) => Value::String(s.clone()),
            Literal::Int(i) => json!(i),
            Literal::Float(n) => json!(n.into_inner()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Tuple(items) => Value::Array(items.iter().map(Literal::to_value).collect()),
            Literal::Null => Value::Null,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Markup(s) => write!(f, "markup(\"{}\")", s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Literal::Null => write!(f, "None"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Markup(_) => write!(f, "Markup({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Tuple(_) => write!(f, "Tuple({})", self),
            Literal::Null => write!(f, "Null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_to_value() {
        assert_eq!(Literal::Int(42).to_value(), json!(42));
        assert_eq!(Literal::String("a".into()).to_value(), json!("a"));
        assert_eq!(Literal::Markup("<b>a</b>".into()).to_value(), json!("<b>a</b>"));
        assert_eq!(Literal::Null.to_value(), Value::Null);
    }

    #[test]
    fn test_literal_tuple_display() {
        let lit = Literal::Tuple(vec![Literal::Int(1), Literal::String("x".into())]);
        assert_eq!(lit.to_string(), "(1, \"x\")");
    }
}
