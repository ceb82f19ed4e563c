use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display};

/// SQL comparison operator carried by a lowered predicate.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparatorOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Display for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorOp::Eq => write!(f, "="),
            ComparatorOp::NotEq => write!(f, "<>"),
            ComparatorOp::Lt => write!(f, "<"),
            ComparatorOp::LtEq => write!(f, "<="),
            ComparatorOp::Gt => write!(f, ">"),
            ComparatorOp::GtEq => write!(f, ">="),
        }
    }
}

impl fmt::Debug for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparatorOp({})", self)
    }
}

/// An aliased column reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlColumn {
    pub alias: String,
    pub name: String,
}

impl SqlColumn {
    pub fn new(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self { alias: alias.into(), name: name.into() }
    }
}

impl Display for SqlColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.name)
    }
}

/// One aliased table reference of the FROM clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRef {
    pub alias: String,
    pub table: String,
}

impl Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.table, self.alias)
    }
}

/// Leaf operand of the predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlOperand {
    Column(SqlColumn),
    Param(String),
    Value(Value),
}

impl Display for SqlOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlOperand::Column(column) => write!(f, "{}", column),
            SqlOperand::Param(name) => write!(f, ":{}", name),
            SqlOperand::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Boolean-valued node of the WHERE tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlPredicate {
    And(Vec<SqlPredicate>),
    Or(Vec<SqlPredicate>),
    Not(Box<SqlPredicate>),
    Compare { left: SqlOperand, op: ComparatorOp, right: SqlOperand },
    IsNull { operand: SqlOperand, negated: bool },
    InList { operand: SqlOperand, items: Vec<SqlOperand>, negated: bool },
}

impl SqlPredicate {
    /// AND of `predicates`; a single predicate collapses to itself.
    pub fn conjunction(mut predicates: Vec<SqlPredicate>) -> SqlPredicate {
        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            SqlPredicate::And(predicates)
        }
    }
}

impl Display for SqlPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlPredicate::And(items) => write_joined(f, items, " AND "),
            SqlPredicate::Or(items) => write_joined(f, items, " OR "),
            SqlPredicate::Not(inner) => write!(f, "NOT ({})", inner),
            SqlPredicate::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            SqlPredicate::IsNull { operand, negated } => {
                write!(f, "{} IS {}NULL", operand, if *negated { "NOT " } else { "" })
            }
            SqlPredicate::InList { operand, items, negated } => {
                write!(f, "{} {}IN (", operand, if *negated { "NOT " } else { "" })?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[SqlPredicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

/// The lowered query: SELECT columns, FROM tables, optional WHERE tree.
///
/// Dialect-specific SQL text is the renderer's job; the `Display` impl is a
/// debugging aid only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub select: Vec<SqlColumn>,
    pub from: Vec<TableRef>,
    pub criteria: Option<SqlPredicate>,
}

impl Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, column) in self.select.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, " FROM ")?;
        for (i, table) in self.from.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", table)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conjunction_collapses_single() {
        let single = SqlPredicate::IsNull {
            operand: SqlOperand::Column(SqlColumn::new("p", "age")),
            negated: false,
        };
        assert_eq!(SqlPredicate::conjunction(vec![single.clone()]), single);
    }

    #[test]
    fn test_query_display() {
        let query = SqlQuery {
            select: vec![SqlColumn::new("p", "id"), SqlColumn::new("p", "age")],
            from: vec![TableRef { alias: "p".into(), table: "persons".into() }],
            criteria: Some(SqlPredicate::Compare {
                left: SqlOperand::Column(SqlColumn::new("p", "age")),
                op: ComparatorOp::Eq,
                right: SqlOperand::Value(json!(30)),
            }),
        };
        assert_eq!(query.to_string(), "SELECT p.id, p.age FROM persons AS p WHERE p.age = 30");
    }
}
