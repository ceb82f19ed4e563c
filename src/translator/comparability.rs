use crate::expr::CompareOp;
use crate::schema::SchemaProvider;
use crate::translator::SemanticType;

/// Decide whether two operand types can be compared with `op`.
///
/// Pure predicate over the annotated types; the schema is consulted only
/// for inheritance roots of entity pairs.
pub fn is_comparable(op: CompareOp, left: &SemanticType, right: &SemanticType, schema: &dyn SchemaProvider) -> bool {
    match op {
        CompareOp::Is | CompareOp::IsNot => *right == SemanticType::None,

        CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq => {
            left == right && left.is_primitive()
        }

        CompareOp::Eq | CompareOp::NotEq => {
            if *left == SemanticType::None || *right == SemanticType::None {
                return true;
            }
            if left.is_primitive() {
                return left == right;
            }
            match (left, right) {
                (SemanticType::Entity(a), SemanticType::Entity(b)) => {
                    schema.inheritance_root(*a) == schema.inheritance_root(*b)
                }
                _ => false,
            }
        }

        CompareOp::In | CompareOp::NotIn => match left {
            SemanticType::Int | SemanticType::Str => match right {
                // Every element must already have the left type; an empty
                // list has no element type and is rejected.
                SemanticType::Tuple(items) => {
                    !items.is_empty() && items.iter().all(|t| t == left)
                }
                _ => false,
            },
            SemanticType::Entity(a) => {
                let root = schema.inheritance_root(*a);
                match right {
                    SemanticType::Tuple(items) => {
                        !items.is_empty()
                            && items.iter().all(|t| match t {
                                SemanticType::Entity(b) => schema.inheritance_root(*b) == root,
                                _ => false,
                            })
                    }
                    SemanticType::Collection(b) => schema.inheritance_root(*b) == root,
                    _ => false,
                }
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Catalog;

    fn catalog() -> (Catalog, crate::schema::EntityId, crate::schema::EntityId, crate::schema::EntityId) {
        let mut catalog = Catalog::new();
        let person = catalog.add_entity("Person", "persons");
        let student = catalog.add_subentity("Student", "persons", person);
        let city = catalog.add_entity("City", "cities");
        (catalog, person, student, city)
    }

    #[test]
    fn test_ordering_requires_identical_primitives() {
        let (catalog, ..) = catalog();
        assert!(is_comparable(CompareOp::Lt, &SemanticType::Int, &SemanticType::Int, &catalog));
        assert!(is_comparable(CompareOp::GtEq, &SemanticType::Str, &SemanticType::Str, &catalog));
        assert!(!is_comparable(CompareOp::Lt, &SemanticType::Int, &SemanticType::Str, &catalog));
        assert!(!is_comparable(CompareOp::Lt, &SemanticType::None, &SemanticType::None, &catalog));
        assert!(!is_comparable(CompareOp::Gt, &SemanticType::Bool, &SemanticType::Bool, &catalog));
    }

    #[test]
    fn test_is_requires_none_on_the_right() {
        let (catalog, person, ..) = catalog();
        assert!(is_comparable(CompareOp::Is, &SemanticType::Entity(person), &SemanticType::None, &catalog));
        assert!(is_comparable(CompareOp::IsNot, &SemanticType::Int, &SemanticType::None, &catalog));
        assert!(!is_comparable(CompareOp::Is, &SemanticType::Int, &SemanticType::Int, &catalog));
    }

    #[test]
    fn test_equality_allows_none_and_same_root_entities() {
        let (catalog, person, student, city) = catalog();
        assert!(is_comparable(CompareOp::Eq, &SemanticType::None, &SemanticType::Int, &catalog));
        assert!(is_comparable(CompareOp::NotEq, &SemanticType::Entity(person), &SemanticType::None, &catalog));
        assert!(is_comparable(CompareOp::Eq, &SemanticType::Entity(person), &SemanticType::Entity(student), &catalog));
        assert!(!is_comparable(CompareOp::Eq, &SemanticType::Entity(person), &SemanticType::Entity(city), &catalog));
        assert!(!is_comparable(CompareOp::Eq, &SemanticType::Entity(person), &SemanticType::Int, &catalog));
        assert!(!is_comparable(CompareOp::Eq, &SemanticType::Int, &SemanticType::Str, &catalog));
    }

    #[test]
    fn test_membership_primitive_left() {
        let (catalog, ..) = catalog();
        let ints = SemanticType::Tuple(vec![SemanticType::Int, SemanticType::Int]);
        let mixed = SemanticType::Tuple(vec![SemanticType::Int, SemanticType::Str]);
        let empty = SemanticType::Tuple(vec![]);
        assert!(is_comparable(CompareOp::In, &SemanticType::Int, &ints, &catalog));
        assert!(!is_comparable(CompareOp::In, &SemanticType::Int, &mixed, &catalog));
        assert!(!is_comparable(CompareOp::In, &SemanticType::Int, &empty, &catalog));
        assert!(!is_comparable(CompareOp::In, &SemanticType::Int, &SemanticType::Int, &catalog));
    }

    #[test]
    fn test_membership_entity_left() {
        let (catalog, person, student, city) = catalog();
        let same_root = SemanticType::Tuple(vec![SemanticType::Entity(person), SemanticType::Entity(student)]);
        let foreign = SemanticType::Tuple(vec![SemanticType::Entity(city)]);
        assert!(is_comparable(CompareOp::In, &SemanticType::Entity(person), &same_root, &catalog));
        assert!(!is_comparable(CompareOp::NotIn, &SemanticType::Entity(person), &foreign, &catalog));
        assert!(is_comparable(
            CompareOp::In,
            &SemanticType::Entity(student),
            &SemanticType::Collection(person),
            &catalog
        ));
        assert!(!is_comparable(
            CompareOp::In,
            &SemanticType::Entity(city),
            &SemanticType::Collection(person),
            &catalog
        ));
    }
}
