pub mod literal;
pub use literal::*;

pub mod expr_node;
pub use expr_node::*;

pub mod comprehension;
pub use comprehension::*;

pub mod bindings;
pub use bindings::*;
