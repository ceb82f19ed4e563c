use serde_json::Value;

use crate::sql::{ParamTable, SqlColumn, SqlOperand};
use crate::translator::TranslateError;

/// Ordered column/parameter references standing in for a multi-column-key
/// operand. Length always equals the owning entity's primary-key column
/// count, in declared key order; every pairwise zip relies on that.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub items: Vec<SqlOperand>,
}

impl Composite {
    /// Key columns of a loop variable, one aliased column per key column.
    pub fn from_loop_var(alias: &str, key_columns: &[String]) -> Self {
        let items = key_columns
            .iter()
            .map(|column| SqlOperand::Column(SqlColumn::new(alias, column)))
            .collect();
        Self { items }
    }

    /// Key of a bound entity instance: one parameter per key column, named
    /// `var_column` and registered with the matching key component value.
    pub fn from_bound(
        var: &str,
        key_columns: &[String],
        key_values: &[Value],
        params: &mut ParamTable,
    ) -> Result<Self, TranslateError> {
        if key_columns.len() != key_values.len() {
            return Err(TranslateError::ArityMismatch {
                left: key_columns.len(),
                right: key_values.len(),
            });
        }
        let mut items = Vec::with_capacity(key_columns.len());
        for (column, value) in key_columns.iter().zip(key_values) {
            let param = format!("{}_{}", var, column);
            params.insert(param.clone(), value.clone());
            items.push(SqlOperand::Param(param));
        }
        Ok(Self { items })
    }

    pub fn width(&self) -> usize {
        self.items.len()
    }
}

/// A lowered comparison operand: either a plain leaf or a composite-key
/// expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    Single(SqlOperand),
    Composite(Composite),
}

impl Lowered {
    pub fn width(&self) -> usize {
        match self {
            Lowered::Single(_) => 1,
            Lowered::Composite(composite) => composite.width(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_composite_from_loop_var_order() {
        let columns = vec!["region".to_string(), "number".to_string()];
        let composite = Composite::from_loop_var("o", &columns);
        assert_eq!(
            composite.items,
            vec![
                SqlOperand::Column(SqlColumn::new("o", "region")),
                SqlOperand::Column(SqlColumn::new("o", "number")),
            ]
        );
    }

    #[test]
    fn test_composite_from_bound_registers_params() {
        let columns = vec!["region".to_string(), "number".to_string()];
        let values = vec![json!("north"), json!(7)];
        let mut params = ParamTable::new();
        let composite = Composite::from_bound("o", &columns, &values, &mut params).expect("Failed to expand");
        assert_eq!(
            composite.items,
            vec![SqlOperand::Param("o_region".into()), SqlOperand::Param("o_number".into())]
        );
        assert_eq!(params.get("o_region"), Some(&json!("north")));
        assert_eq!(params.get("o_number"), Some(&json!(7)));
    }

    #[test]
    fn test_composite_from_bound_arity_check() {
        let columns = vec!["region".to_string(), "number".to_string()];
        let values = vec![json!("north")];
        let mut params = ParamTable::new();
        let result = Composite::from_bound("o", &columns, &values, &mut params);
        assert_eq!(result.unwrap_err(), TranslateError::ArityMismatch { left: 2, right: 1 });
    }
}
