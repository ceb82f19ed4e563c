use serde_json::Value;

use crate::expr::{Bindings, BoundValue, CompareOp, Comprehension, ExprId, ExprNode, Literal};
use crate::schema::{EntityId, SchemaProvider};
use crate::sql::{
    ComparatorOp, Composite, Lowered, ParamTable, SqlColumn, SqlOperand, SqlPredicate, SqlQuery, TableRef,
};
use crate::translator::{AnnotatedTree, SemanticType, TranslateError};

/// Lowers an annotated comprehension into the query AST and parameter
/// table. All working state lives for one translation only.
pub struct QueryBuilder<'a> {
    comp: &'a Comprehension,
    tree: &'a AnnotatedTree,
    bindings: &'a Bindings,
    schema: &'a dyn SchemaProvider,
    params: ParamTable,
}

impl<'a> QueryBuilder<'a> {
    pub fn build(
        comp: &'a Comprehension,
        tree: &'a AnnotatedTree,
        bindings: &'a Bindings,
        schema: &'a dyn SchemaProvider,
    ) -> Result<(SqlQuery, ParamTable), TranslateError> {
        let mut builder = Self { comp, tree, bindings, schema, params: ParamTable::new() };
        let select = builder.build_select()?;
        let from = builder.build_from()?;
        let criteria = builder.build_where()?;
        Ok((SqlQuery { select, from, criteria }, builder.params))
    }

    fn node_type(&self, id: ExprId) -> Result<SemanticType, TranslateError> {
        self.tree
            .types
            .get(id)
            .cloned()
            .ok_or_else(|| TranslateError::Other("expression reached lowering without a type".into()))
    }

    /// The selected expression must be a bare loop variable; the select list
    /// is every non-collection attribute of its entity, aliased by the
    /// variable.
    fn build_select(&self) -> Result<Vec<SqlColumn>, TranslateError> {
        let ExprNode::Name(name) = self.comp.arena.node(self.comp.root) else {
            return Err(TranslateError::ProjectionExpression);
        };
        let Some(&entity) = self.tree.iter_types.get(name) else {
            return Err(TranslateError::ProjectionExpression);
        };
        Ok(self
            .schema
            .attributes(entity)
            .iter()
            .filter(|attr| !attr.to_many)
            .map(|attr| SqlColumn::new(name.clone(), attr.column()))
            .collect())
    }

    fn build_from(&self) -> Result<Vec<TableRef>, TranslateError> {
        let mut from = Vec::with_capacity(self.comp.qualifiers.len());
        for qual in &self.comp.qualifiers {
            // Relationship traversal as an iteration source would need a
            // join; only directly bound collections map to table refs.
            if !matches!(self.comp.arena.node(qual.iterable), ExprNode::Name(_)) {
                return Err(TranslateError::Other(format!(
                    "iteration source of `{}` must be a directly bound collection",
                    qual.var
                )));
            }
            let Some(&entity) = self.tree.iter_types.get(&qual.var) else {
                return Err(TranslateError::Other(format!("loop variable `{}` has no entity", qual.var)));
            };
            from.push(TableRef { alias: qual.var.clone(), table: self.schema.table_name(entity).to_string() });
        }
        Ok(from)
    }

    /// Every filter condition across all qualifiers, in source order, ANDed.
    fn build_where(&mut self) -> Result<Option<SqlPredicate>, TranslateError> {
        let mut criteria = Vec::new();
        for qual in &self.comp.qualifiers {
            for &condition in &qual.conditions {
                criteria.push(self.build_predicate(condition)?);
            }
        }
        if criteria.is_empty() {
            return Ok(None);
        }
        Ok(Some(SqlPredicate::conjunction(criteria)))
    }

    fn build_predicate(&mut self, id: ExprId) -> Result<SqlPredicate, TranslateError> {
        let node = self.comp.arena.node(id).clone();
        match node {
            ExprNode::And(items) => {
                let mut lowered = Vec::with_capacity(items.len());
                for item in items {
                    lowered.push(self.build_predicate(item)?);
                }
                Ok(SqlPredicate::And(lowered))
            }
            ExprNode::Or(items) => {
                let mut lowered = Vec::with_capacity(items.len());
                for item in items {
                    lowered.push(self.build_predicate(item)?);
                }
                Ok(SqlPredicate::Or(lowered))
            }
            ExprNode::Not(operand) => Ok(SqlPredicate::Not(Box::new(self.build_predicate(operand)?))),
            ExprNode::Compare { left, ops } => {
                let [(op, right)] = ops.as_slice() else {
                    return Err(TranslateError::ChainedComparison);
                };
                self.build_compare(left, *op, *right)
            }
            _ => Err(TranslateError::Other(format!(
                "`{}` is not a predicate",
                self.comp.arena.describe(id)
            ))),
        }
    }

    fn build_compare(&mut self, left: ExprId, op: CompareOp, right: ExprId) -> Result<SqlPredicate, TranslateError> {
        match op {
            CompareOp::Is | CompareOp::IsNot => {
                // Annotation guarantees the right side is the null constant.
                Ok(null_check(self.lower_operand(left)?, op == CompareOp::IsNot))
            }
            CompareOp::In | CompareOp::NotIn => self.build_membership(left, right, op == CompareOp::NotIn),
            _ => self.build_comparison(left, op, right),
        }
    }

    fn build_membership(&mut self, left: ExprId, right: ExprId, negated: bool) -> Result<SqlPredicate, TranslateError> {
        match self.lower_operand(left)? {
            Lowered::Composite(key) => {
                let candidates = match self.comp.arena.node(right) {
                    ExprNode::List(items) | ExprNode::Tuple(items) => items.clone(),
                    _ => return Err(TranslateError::UnsupportedMembership(self.comp.arena.describe(right))),
                };
                let mut alternatives = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    if !matches!(self.comp.arena.node(candidate), ExprNode::Name(_)) {
                        return Err(TranslateError::UnsupportedMembership(self.comp.arena.describe(candidate)));
                    }
                    let Lowered::Composite(other) = self.lower_operand(candidate)? else {
                        return Err(TranslateError::ArityMismatch { left: key.width(), right: 1 });
                    };
                    if key.width() != other.width() {
                        return Err(TranslateError::ArityMismatch { left: key.width(), right: other.width() });
                    }
                    let equalities = key
                        .items
                        .iter()
                        .cloned()
                        .zip(other.items)
                        .map(|(a, b)| SqlPredicate::Compare { left: a, op: ComparatorOp::Eq, right: b })
                        .collect();
                    alternatives.push(SqlPredicate::conjunction(equalities));
                }
                let matched = SqlPredicate::Or(alternatives);
                Ok(if negated { SqlPredicate::Not(Box::new(matched)) } else { matched })
            }
            Lowered::Single(operand) => {
                let items = match self.comp.arena.node(right).clone() {
                    ExprNode::Const(Literal::Tuple(values)) => {
                        values.iter().map(|value| SqlOperand::Value(value.to_value())).collect()
                    }
                    ExprNode::List(elements) | ExprNode::Tuple(elements) => {
                        let mut items = Vec::with_capacity(elements.len());
                        for element in elements {
                            match self.lower_operand(element)? {
                                Lowered::Single(item) => items.push(item),
                                Lowered::Composite(composite) => {
                                    return Err(TranslateError::ArityMismatch { left: 1, right: composite.width() });
                                }
                            }
                        }
                        items
                    }
                    _ => return Err(TranslateError::UnsupportedMembership(self.comp.arena.describe(right))),
                };
                Ok(SqlPredicate::InList { operand, items, negated })
            }
        }
    }

    fn build_comparison(&mut self, left: ExprId, op: CompareOp, right: ExprId) -> Result<SqlPredicate, TranslateError> {
        let left_ty = self.node_type(left)?;
        let right_ty = self.node_type(right)?;
        let lowered_left = self.lower_operand(left)?;
        let lowered_right = self.lower_operand(right)?;

        // A null operand turns any equality into a null check on the other
        // side, whatever its shape.
        if left_ty == SemanticType::None || right_ty == SemanticType::None {
            let negated = match op {
                CompareOp::Eq => false,
                CompareOp::NotEq => true,
                _ => return Err(TranslateError::IncomparableTypes { op, left: left_ty, right: right_ty }),
            };
            let target = if right_ty == SemanticType::None { lowered_left } else { lowered_right };
            return Ok(null_check(target, negated));
        }

        match (lowered_left, lowered_right) {
            (Lowered::Single(a), Lowered::Single(b)) => {
                Ok(SqlPredicate::Compare { left: a, op: comparator(op)?, right: b })
            }
            (Lowered::Composite(a), Lowered::Composite(b)) => {
                if a.width() != b.width() {
                    return Err(TranslateError::ArityMismatch { left: a.width(), right: b.width() });
                }
                let pairs = a.items.into_iter().zip(b.items);
                match op {
                    CompareOp::Eq => Ok(SqlPredicate::conjunction(
                        pairs
                            .map(|(a, b)| SqlPredicate::Compare { left: a, op: ComparatorOp::Eq, right: b })
                            .collect(),
                    )),
                    CompareOp::NotEq => Ok(SqlPredicate::Or(
                        pairs
                            .map(|(a, b)| SqlPredicate::Compare { left: a, op: ComparatorOp::NotEq, right: b })
                            .collect(),
                    )),
                    _ => Err(TranslateError::IncomparableTypes { op, left: left_ty, right: right_ty }),
                }
            }
            (a, b) => Err(TranslateError::ArityMismatch { left: a.width(), right: b.width() }),
        }
    }

    fn lower_operand(&mut self, id: ExprId) -> Result<Lowered, TranslateError> {
        let node = self.comp.arena.node(id).clone();
        match node {
            ExprNode::Const(literal) => Ok(Lowered::Single(SqlOperand::Value(literal.to_value()))),
            ExprNode::Attribute { base, name } => self.lower_attribute(id, base, &name),
            ExprNode::Name(name) => self.lower_name(id, &name),
            _ => Err(TranslateError::Other(format!(
                "`{}` cannot be lowered to a comparison operand",
                self.comp.arena.describe(id)
            ))),
        }
    }

    fn lower_attribute(&mut self, id: ExprId, base: ExprId, name: &str) -> Result<Lowered, TranslateError> {
        let ExprNode::Name(var) = self.comp.arena.node(base) else {
            return Err(TranslateError::AttributePath(self.comp.arena.describe(id)));
        };
        let Some(&entity) = self.tree.iter_types.get(var) else {
            return Err(TranslateError::AttributePath(self.comp.arena.describe(id)));
        };
        let Some(attr) = self.schema.lookup_attribute(entity, name) else {
            return Err(TranslateError::UnknownAttribute {
                entity: self.schema.entity_name(entity).to_string(),
                attribute: name.to_string(),
            });
        };
        if attr.to_many {
            return Err(TranslateError::CollectionAttributeMisuse(self.comp.arena.describe(id)));
        }
        Ok(Lowered::Single(SqlOperand::Column(SqlColumn::new(var.clone(), attr.column()))))
    }

    fn lower_name(&mut self, id: ExprId, name: &str) -> Result<Lowered, TranslateError> {
        match self.node_type(id)? {
            SemanticType::None => Ok(Lowered::Single(SqlOperand::Value(Value::Null))),
            SemanticType::Int | SemanticType::Str => {
                let value = self.bound_scalar(name)?;
                self.params.insert(name, value);
                Ok(Lowered::Single(SqlOperand::Param(name.to_string())))
            }
            SemanticType::Entity(entity) => self.lower_entity_name(name, entity),
            SemanticType::Collection(_) => Err(TranslateError::CollectionAttributeMisuse(name.to_string())),
            other => Err(TranslateError::Other(format!(
                "variable `{}` of type {} cannot appear as an operand",
                name, other
            ))),
        }
    }

    fn bound_scalar(&self, name: &str) -> Result<Value, TranslateError> {
        match self.bindings.resolve(name) {
            Some(BoundValue::Value(value)) => Ok(value.clone()),
            Some(BoundValue::Markup(text)) => Ok(Value::String(text.clone())),
            _ => Err(TranslateError::UnboundVariable(name.to_string())),
        }
    }

    /// An entity-typed name is either a loop variable (key columns) or a
    /// bound instance (key parameters); composite keys expand either way.
    fn lower_entity_name(&mut self, name: &str, entity: EntityId) -> Result<Lowered, TranslateError> {
        let key_columns = self.schema.primary_key_columns(entity);
        if key_columns.is_empty() {
            return Err(TranslateError::Other(format!(
                "entity {} has no primary key",
                self.schema.entity_name(entity)
            )));
        }
        if self.tree.iter_types.contains_key(name) {
            if key_columns.len() == 1 {
                return Ok(Lowered::Single(SqlOperand::Column(SqlColumn::new(name, &key_columns[0]))));
            }
            return Ok(Lowered::Composite(Composite::from_loop_var(name, &key_columns)));
        }
        match self.bindings.resolve(name).cloned() {
            Some(BoundValue::Entity(entity_ref)) => {
                let key_values = entity_ref.expanded_primary_key();
                if key_columns.len() == 1 {
                    let value = key_values
                        .first()
                        .cloned()
                        .ok_or(TranslateError::ArityMismatch { left: 1, right: 0 })?;
                    self.params.insert(name, value);
                    return Ok(Lowered::Single(SqlOperand::Param(name.to_string())));
                }
                let composite = Composite::from_bound(name, &key_columns, key_values, &mut self.params)?;
                Ok(Lowered::Composite(composite))
            }
            Some(BoundValue::EntityClass(_)) => Err(TranslateError::Other(format!(
                "entity type `{}` cannot be used as a value",
                name
            ))),
            _ => Err(TranslateError::UnboundVariable(name.to_string())),
        }
    }
}

/// `IS [NOT] NULL` over a lowered operand; composites check every key
/// column individually.
fn null_check(target: Lowered, negated: bool) -> SqlPredicate {
    match target {
        Lowered::Single(operand) => SqlPredicate::IsNull { operand, negated },
        Lowered::Composite(composite) => SqlPredicate::conjunction(
            composite
                .items
                .into_iter()
                .map(|operand| SqlPredicate::IsNull { operand, negated })
                .collect(),
        ),
    }
}

fn comparator(op: CompareOp) -> Result<ComparatorOp, TranslateError> {
    match op {
        CompareOp::Eq => Ok(ComparatorOp::Eq),
        CompareOp::NotEq => Ok(ComparatorOp::NotEq),
        CompareOp::Lt => Ok(ComparatorOp::Lt),
        CompareOp::LtEq => Ok(ComparatorOp::LtEq),
        CompareOp::Gt => Ok(ComparatorOp::Gt),
        CompareOp::GtEq => Ok(ComparatorOp::GtEq),
        _ => Err(TranslateError::Other(format!("`{}` is not a scalar comparison operator", op))),
    }
}
