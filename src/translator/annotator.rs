use indexmap::IndexMap;
use serde_json::Value;

use crate::expr::{Bindings, BoundValue, CompareOp, Comprehension, ExprId, ExprNode, Literal};
use crate::schema::{AttributeType, EntityId, SchemaProvider};
use crate::translator::{is_comparable, SemanticType, TranslateError};

/// Immutable side table mapping arena index -> inferred type. Nodes are
/// never stamped in place; both passes read types from here.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTable(Vec<Option<SemanticType>>);

impl TypeTable {
    fn with_capacity(len: usize) -> Self {
        Self(vec![None; len])
    }

    fn set(&mut self, id: ExprId, ty: SemanticType) {
        self.0[id.0] = Some(ty);
    }

    pub fn get(&self, id: ExprId) -> Option<&SemanticType> {
        self.0.get(id.0).and_then(Option::as_ref)
    }
}

/// Output of the typing pass: node types plus per-variable type maps.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTree {
    pub types: TypeTable,
    /// loop variable -> entity it iterates over, in qualifier order
    pub iter_types: IndexMap<String, EntityId>,
    /// free variable -> inferred type, in first-use order
    pub var_types: IndexMap<String, SemanticType>,
}

/// Single bottom-up typing pass over a captured comprehension.
pub struct Annotator<'a> {
    comp: &'a Comprehension,
    bindings: &'a Bindings,
    schema: &'a dyn SchemaProvider,
    types: TypeTable,
    iter_types: IndexMap<String, EntityId>,
    var_types: IndexMap<String, SemanticType>,
}

impl<'a> Annotator<'a> {
    pub fn annotate(
        comp: &'a Comprehension,
        bindings: &'a Bindings,
        schema: &'a dyn SchemaProvider,
    ) -> Result<AnnotatedTree, TranslateError> {
        let mut annotator = Self {
            comp,
            bindings,
            schema,
            types: TypeTable::with_capacity(comp.arena.len()),
            iter_types: IndexMap::new(),
            var_types: IndexMap::new(),
        };

        for qual in &comp.qualifiers {
            let iter_ty = annotator.annotate_node(qual.iterable)?;
            let SemanticType::Collection(entity) = iter_ty else {
                return Err(TranslateError::NotIterable { var: qual.var.clone(), found: iter_ty });
            };
            if annotator.iter_types.insert(qual.var.clone(), entity).is_some() {
                return Err(TranslateError::Other(format!("duplicate loop variable `{}`", qual.var)));
            }
            for &condition in &qual.conditions {
                let ty = annotator.annotate_node(condition)?;
                if ty != SemanticType::Bool {
                    return Err(TranslateError::NonBooleanCondition { var: qual.var.clone(), found: ty });
                }
            }
        }
        annotator.annotate_node(comp.root)?;

        tracing::trace!(
            nodes = comp.arena.len(),
            loop_vars = annotator.iter_types.len(),
            free_vars = annotator.var_types.len(),
            "annotated comprehension"
        );
        Ok(AnnotatedTree {
            types: annotator.types,
            iter_types: annotator.iter_types,
            var_types: annotator.var_types,
        })
    }

    fn annotate_node(&mut self, id: ExprId) -> Result<SemanticType, TranslateError> {
        let node = self.comp.arena.node(id).clone();
        let ty = match node {
            ExprNode::Name(name) => self.annotate_name(&name)?,
            ExprNode::Attribute { base, name } => self.annotate_attribute(base, &name)?,
            ExprNode::Const(literal) => normalize_literal(&literal)?,
            ExprNode::Compare { left, ops } => self.annotate_compare(left, &ops)?,
            ExprNode::And(items) | ExprNode::Or(items) => {
                for item in items {
                    let ty = self.annotate_node(item)?;
                    if ty != SemanticType::Bool {
                        return Err(TranslateError::NonBooleanOperand(ty));
                    }
                }
                SemanticType::Bool
            }
            ExprNode::Not(operand) => {
                let ty = self.annotate_node(operand)?;
                if ty != SemanticType::Bool {
                    return Err(TranslateError::NonBooleanOperand(ty));
                }
                SemanticType::Bool
            }
            ExprNode::List(items) | ExprNode::Tuple(items) => {
                let mut element_types = Vec::with_capacity(items.len());
                for item in items {
                    // Element lists only occur as membership right-hand
                    // sides; anything but a name or constant has no lowering.
                    if !matches!(self.comp.arena.node(item), ExprNode::Name(_) | ExprNode::Const(_)) {
                        return Err(TranslateError::UnsupportedMembership(self.comp.arena.describe(item)));
                    }
                    element_types.push(self.annotate_node(item)?);
                }
                SemanticType::Tuple(element_types)
            }
        };
        self.types.set(id, ty.clone());
        Ok(ty)
    }

    /// Resolution order: loop bindings, then previously inferred free
    /// variables, then the explicit environment.
    fn annotate_name(&mut self, name: &str) -> Result<SemanticType, TranslateError> {
        if let Some(entity) = self.iter_types.get(name) {
            return Ok(SemanticType::Entity(*entity));
        }
        if let Some(ty) = self.var_types.get(name) {
            return Ok(ty.clone());
        }
        let Some(value) = self.bindings.resolve(name) else {
            return Err(TranslateError::UnboundVariable(name.to_string()));
        };
        match value {
            BoundValue::Collection(entity) => Ok(SemanticType::Collection(*entity)),
            // The class handle itself: a type for attribute lookups, not a
            // value, so it is not recorded as a query variable.
            BoundValue::EntityClass(entity) => Ok(SemanticType::Entity(*entity)),
            BoundValue::Entity(entity_ref) => {
                let ty = SemanticType::Entity(entity_ref.entity);
                self.var_types.insert(name.to_string(), ty.clone());
                Ok(ty)
            }
            BoundValue::Markup(_) => {
                self.var_types.insert(name.to_string(), SemanticType::Str);
                Ok(SemanticType::Str)
            }
            BoundValue::Value(value) => {
                let ty = normalize_value(name, value)?;
                self.var_types.insert(name.to_string(), ty.clone());
                Ok(ty)
            }
        }
    }

    fn annotate_attribute(&mut self, base: ExprId, name: &str) -> Result<SemanticType, TranslateError> {
        let base_ty = self.annotate_node(base)?;
        let entity = match base_ty {
            SemanticType::Entity(entity) => entity,
            SemanticType::Collection(_) => {
                return Err(TranslateError::CollectionAttributeMisuse(self.comp.arena.describe(base)));
            }
            other => {
                return Err(TranslateError::Other(format!(
                    "attribute `{}` looked up on non-entity type {}",
                    name, other
                )));
            }
        };
        let Some(attr) = self.schema.lookup_attribute(entity, name) else {
            return Err(TranslateError::UnknownAttribute {
                entity: self.schema.entity_name(entity).to_string(),
                attribute: name.to_string(),
            });
        };
        if attr.to_many {
            let AttributeType::Entity(target) = attr.ty else {
                return Err(TranslateError::Other(format!(
                    "collection attribute `{}` has a non-entity element type",
                    name
                )));
            };
            return Ok(SemanticType::Collection(target));
        }
        Ok(match attr.ty {
            AttributeType::Int => SemanticType::Int,
            AttributeType::Str => SemanticType::Str,
            AttributeType::Entity(target) => SemanticType::Entity(target),
        })
    }

    fn annotate_compare(&mut self, left: ExprId, ops: &[(CompareOp, ExprId)]) -> Result<SemanticType, TranslateError> {
        let [(op, right)] = ops else {
            return Err(TranslateError::ChainedComparison);
        };
        let left_ty = self.annotate_node(left)?;
        let right_ty = self.annotate_node(*right)?;
        // A to-many operand is only legal as the right side of a membership
        // test; everywhere else it gets the precise diagnosis.
        if matches!(left_ty, SemanticType::Collection(_)) {
            return Err(TranslateError::CollectionAttributeMisuse(self.comp.arena.describe(left)));
        }
        if matches!(right_ty, SemanticType::Collection(_)) && !op.is_membership() {
            return Err(TranslateError::CollectionAttributeMisuse(self.comp.arena.describe(*right)));
        }
        if !is_comparable(*op, &left_ty, &right_ty, self.schema) {
            return Err(TranslateError::IncomparableTypes { op: *op, left: left_ty, right: right_ty });
        }
        Ok(SemanticType::Bool)
    }
}

/// Collapse a literal's native form into its canonical semantic type.
pub fn normalize_literal(literal: &Literal) -> Result<SemanticType, TranslateError> {
    match literal {
        Literal::Null => Ok(SemanticType::None),
        Literal::Int(_) => Ok(SemanticType::Int),
        Literal::String(_) | Literal::Markup(_) => Ok(SemanticType::Str),
        Literal::Tuple(items) => {
            let types = items.iter().map(normalize_literal).collect::<Result<Vec<_>, _>>()?;
            Ok(SemanticType::Tuple(types))
        }
        Literal::Bool(_) | Literal::Float(_) => {
            Err(TranslateError::UnsupportedType(literal.to_string()))
        }
    }
}

/// Canonical type of a plain bound value.
fn normalize_value(name: &str, value: &Value) -> Result<SemanticType, TranslateError> {
    match value {
        Value::Null => Ok(SemanticType::None),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(SemanticType::Int),
        Value::String(_) => Ok(SemanticType::Str),
        _ => Err(TranslateError::UnsupportedType(format!("{} = {}", name, value))),
    }
}
