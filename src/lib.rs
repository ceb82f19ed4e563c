pub mod expr;
pub use expr::{Bindings, BoundValue, CompareOp, Comprehension, EntityRef, ExprArena, ExprId, ExprNode, Literal, Qualifier};

pub mod schema;
pub use schema::{AttributeDescriptor, AttributeType, Catalog, EntityId, SchemaProvider};

pub mod translator;
pub use translator::{translate, AnnotatedTree, SemanticType, TranslateError};

pub mod sql;
pub use sql::{ParamTable, SqlPredicate, SqlQuery};
