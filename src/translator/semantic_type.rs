use std::fmt::{self, Display};

use crate::schema::EntityId;

/// Inferred type of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    /// Type of the null constant; comparable with anything under equality.
    None,
    /// Result type of comparisons and logical operators.
    Bool,
    Int,
    Str,
    /// Reference to a schema entity.
    Entity(EntityId),
    /// To-many relationship over an entity. Usable only as an iteration
    /// source, never as a comparison operand.
    Collection(EntityId),
    /// Ordered element types of a list/tuple literal.
    Tuple(Vec<SemanticType>),
}

impl SemanticType {
    /// Canonical primitives are the only types ordering operators accept.
    pub fn is_primitive(&self) -> bool {
        matches!(self, SemanticType::Int | SemanticType::Str)
    }
}

impl Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::None => write!(f, "none"),
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::Int => write!(f, "int"),
            SemanticType::Str => write!(f, "str"),
            SemanticType::Entity(id) => write!(f, "entity#{}", id.0),
            SemanticType::Collection(id) => write!(f, "collection<entity#{}>", id.0),
            SemanticType::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
