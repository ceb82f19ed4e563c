pub mod sql_ast;
pub use sql_ast::*;

pub mod params;
pub use params::*;

pub mod composite;
pub use composite::*;

pub mod query_builder;
pub use query_builder::*;
