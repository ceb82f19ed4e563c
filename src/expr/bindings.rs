use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::EntityId;

/// Handle to a persisted entity instance, as seen by the translator: just
/// enough to identify the row — its type and expanded primary-key values.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    pub entity: EntityId,
    pk: Vec<Value>,
}

impl EntityRef {
    pub fn new(entity: EntityId, pk: Vec<Value>) -> Self {
        Self { entity, pk }
    }

    /// Primary-key component values, in the entity's declared key column order.
    pub fn expanded_primary_key(&self) -> &[Value] {
        &self.pk
    }
}

/// A runtime value a free variable resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// A plain value (number, string, null, ...).
    Value(Value),
    /// A markup-wrapped string; normalizes to a plain string.
    Markup(String),
    /// A persisted entity instance.
    Entity(EntityRef),
    /// The entity type itself, usable for attribute lookups.
    EntityClass(EntityId),
    /// A to-many handle over an entity, usable as an iteration source.
    Collection(EntityId),
}

/// Explicit free-variable environment for one translation.
///
/// The capture collaborator materializes the caller's scope into ordered
/// `(name, value)` pairs; the translator never inspects live scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(IndexMap<String, BoundValue>);

impl Bindings {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn bind(&mut self, name: impl Into<String>, value: BoundValue) {
        self.0.insert(name.into(), value);
    }

    pub fn resolve(&self, name: &str) -> Option<&BoundValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, BoundValue)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (String, BoundValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bindings_resolve() {
        let mut bindings = Bindings::new();
        bindings.bind("x", BoundValue::Value(json!(30)));
        assert_eq!(bindings.resolve("x"), Some(&BoundValue::Value(json!(30))));
        assert_eq!(bindings.resolve("y"), None);
    }

    #[test]
    fn test_entity_ref_expanded_pk_order() {
        let entity = EntityRef::new(EntityId(0), vec![json!("north"), json!(7)]);
        assert_eq!(entity.expanded_primary_key(), &[json!("north"), json!(7)]);
    }
}
