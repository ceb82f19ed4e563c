pub mod semantic_type;
pub use semantic_type::*;

pub mod translate_error;
pub use translate_error::*;

pub mod comparability;
pub use comparability::*;

pub mod annotator;
pub use annotator::*;


use crate::expr::{Bindings, Comprehension};
use crate::schema::SchemaProvider;
use crate::sql::{ParamTable, QueryBuilder, SqlQuery};

/// Translate a captured comprehension into a query AST and parameter table.
///
/// Runs the typing pass and then the lowering pass; the first error aborts
/// the translation and nothing partial is returned. The call is purely
/// functional over its inputs; repeated translation of the same inputs
/// yields structurally identical output.
pub fn translate(
    comp: &Comprehension,
    bindings: &Bindings,
    schema: &dyn SchemaProvider,
) -> Result<(SqlQuery, ParamTable), TranslateError> {
    let tree = Annotator::annotate(comp, bindings, schema)?;
    tracing::debug!(
        qualifiers = comp.qualifiers.len(),
        free_vars = tree.var_types.len(),
        "typed comprehension"
    );
    let (query, params) = QueryBuilder::build(comp, &tree, bindings, schema)?;
    tracing::debug!(columns = query.select.len(), params = params.len(), "built query ast");
    Ok((query, params))
}
