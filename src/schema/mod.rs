pub mod entity;
pub use entity::*;

pub mod attribute;
pub use attribute::*;

pub mod catalog;
pub use catalog::*;

/// Read-only access to entity metadata, queried by the translator.
///
/// Implementations must be consistent: `EntityId`s handed out by one
/// provider are only meaningful against that provider.
pub trait SchemaProvider {
    fn entity_name(&self, entity: EntityId) -> &str;

    /// Name of the table the entity is mapped to.
    fn table_name(&self, entity: EntityId) -> &str;

    /// Root of the entity's inheritance hierarchy (itself when not derived).
    fn inheritance_root(&self, entity: EntityId) -> EntityId;

    /// All attributes of the entity, in declared order.
    fn attributes(&self, entity: EntityId) -> &[AttributeDescriptor];

    fn lookup_attribute(&self, entity: EntityId, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes(entity).iter().find(|a| a.name == name)
    }

    /// Primary-key column names in declared key attribute order. This
    /// ordering is load-bearing: composite expansion zips against it.
    fn primary_key_columns(&self, entity: EntityId) -> Vec<String> {
        self.attributes(entity)
            .iter()
            .filter(|a| a.in_pk)
            .flat_map(|a| a.columns.iter().cloned())
            .collect()
    }
}
