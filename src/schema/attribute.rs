use serde::{Deserialize, Serialize};

use crate::schema::EntityId;

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    Int,
    Str,
    /// Entity-valued attribute (to-one reference, or the element type of a
    /// to-many attribute).
    Entity(EntityId),
}

/// Schema metadata for one attribute of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub ty: AttributeType,
    /// To-many collection attribute; `ty` is the element type. Usable only
    /// as an iteration source.
    pub to_many: bool,
    pub in_pk: bool,
    /// Column name(s) this attribute maps to, in declared order. Entity
    /// references to composite-key targets expand to several columns.
    pub columns: Vec<String>,
}

impl AttributeDescriptor {
    pub fn int(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { columns: vec![name.clone()], name, ty: AttributeType::Int, to_many: false, in_pk: false }
    }

    pub fn str(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { columns: vec![name.clone()], name, ty: AttributeType::Str, to_many: false, in_pk: false }
    }

    pub fn entity(name: impl Into<String>, target: EntityId) -> Self {
        let name = name.into();
        Self { columns: vec![name.clone()], name, ty: AttributeType::Entity(target), to_many: false, in_pk: false }
    }

    pub fn set(name: impl Into<String>, target: EntityId) -> Self {
        let name = name.into();
        // A to-many attribute has no columns of its own; it lives on the
        // other side of the relationship.
        Self { columns: Vec::new(), name, ty: AttributeType::Entity(target), to_many: true, in_pk: false }
    }

    pub fn primary_key(mut self) -> Self {
        self.in_pk = true;
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// The attribute's primary mapped column name.
    pub fn column(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or(&self.name)
    }
}
