use serde::{Deserialize, Serialize};

use crate::schema::AttributeDescriptor;

/// Handle to an entity type registered in a schema catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// Definition of one entity type: its mapped table, inheritance root and
/// attributes in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    /// Root of the inheritance hierarchy; the entity itself when it is not
    /// derived from anything.
    pub root: EntityId,
    pub attributes: Vec<AttributeDescriptor>,
}
