use crate::schema::{AttributeDescriptor, EntityDef, EntityId, SchemaProvider};

/// In-memory schema catalog: a closed world of entity definitions.
///
/// The reference `SchemaProvider` implementation, used by tests and by
/// embedders that declare their model programmatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entities: Vec<EntityDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { entities: Vec::new() }
    }

    pub fn add_entity(&mut self, name: impl Into<String>, table: impl Into<String>) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(EntityDef {
            name: name.into(),
            table: table.into(),
            root: id,
            attributes: Vec::new(),
        });
        id
    }

    /// Register an entity derived from `root`'s hierarchy. Derived entities
    /// share the root's identity for equality comparisons.
    pub fn add_subentity(&mut self, name: impl Into<String>, table: impl Into<String>, root: EntityId) -> EntityId {
        let id = EntityId(self.entities.len());
        let root = self.entities.get(root.0).map(|e| e.root).unwrap_or(root);
        self.entities.push(EntityDef {
            name: name.into(),
            table: table.into(),
            root,
            attributes: Vec::new(),
        });
        id
    }

    pub fn add_attribute(&mut self, entity: EntityId, attribute: AttributeDescriptor) {
        if let Some(def) = self.entities.get_mut(entity.0) {
            def.attributes.push(attribute);
        }
    }

    /// Find an entity by name.
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.entities.iter().position(|e| e.name == name).map(EntityId)
    }
}

impl SchemaProvider for Catalog {
    fn entity_name(&self, entity: EntityId) -> &str {
        &self.entities[entity.0].name
    }

    fn table_name(&self, entity: EntityId) -> &str {
        &self.entities[entity.0].table
    }

    fn inheritance_root(&self, entity: EntityId) -> EntityId {
        self.entities[entity.0].root
    }

    fn attributes(&self, entity: EntityId) -> &[AttributeDescriptor] {
        &self.entities[entity.0].attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_attribute() {
        let mut catalog = Catalog::new();
        let person = catalog.add_entity("Person", "persons");
        catalog.add_attribute(person, AttributeDescriptor::int("id").primary_key());
        catalog.add_attribute(person, AttributeDescriptor::str("name"));

        assert_eq!(catalog.entity("Person"), Some(person));
        assert!(catalog.lookup_attribute(person, "name").is_some());
        assert!(catalog.lookup_attribute(person, "missing").is_none());
    }

    #[test]
    fn test_primary_key_columns_declared_order() {
        let mut catalog = Catalog::new();
        let order = catalog.add_entity("Order", "orders");
        catalog.add_attribute(order, AttributeDescriptor::str("region").primary_key());
        catalog.add_attribute(order, AttributeDescriptor::int("number").primary_key());
        catalog.add_attribute(order, AttributeDescriptor::int("total"));

        assert_eq!(catalog.primary_key_columns(order), vec!["region".to_string(), "number".to_string()]);
    }

    #[test]
    fn test_subentity_shares_root() {
        let mut catalog = Catalog::new();
        let person = catalog.add_entity("Person", "persons");
        let student = catalog.add_subentity("Student", "persons", person);
        let phd = catalog.add_subentity("PhdStudent", "persons", student);

        assert_eq!(catalog.inheritance_root(student), person);
        assert_eq!(catalog.inheritance_root(phd), person);
        assert_eq!(catalog.inheritance_root(person), person);
    }
}
