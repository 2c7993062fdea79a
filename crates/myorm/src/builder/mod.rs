//! Statement builders.
//!
//! Pure functions from a resolved [`Schema`] and [`ParsedArgs`] to SQL text.
//! Nothing here touches an executor.
//!
//! - Identifiers are backquoted, values are encoded literals.
//! - Clauses are joined by single spaces; absent clauses leave no gap.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
pub mod upsert;

pub use delete::delete;
pub use insert::{insert, insert_many};
pub use select::{select, select_by_id};
pub use update::{Assignments, update};
pub use upsert::{insert_on_duplicate_key_update, select_or_insert};

use crate::entity::{Entity, flatten_cells};
use crate::error::{OrmError, OrmResult};
use crate::ident::quote_idents;
use crate::model::Schema;
use crate::value::Value;

/// A record flattened into column values, aligned with its schema's fields.
pub fn record_values<T: Entity>(schema: &Schema, record: &T) -> OrmResult<Vec<Value>> {
    let mut values = Vec::with_capacity(schema.fields().len());
    flatten_cells(record.cells(), &mut values);
    if values.len() != schema.fields().len() {
        return Err(OrmError::Config(format!(
            "record yields {} values for {} columns",
            values.len(),
            schema.fields().len()
        )));
    }
    Ok(values)
}

/// Insertable columns of one record (as field positions) and their encoded
/// values.
///
/// The auto-increment field is left out, as is any value that cannot be
/// encoded for its column.
pub(crate) fn insert_pairs(schema: &Schema, values: &[Value]) -> (Vec<usize>, Vec<String>) {
    let mut positions = Vec::with_capacity(values.len());
    let mut literals = Vec::with_capacity(values.len());
    for (i, (field, value)) in schema.fields().iter().zip(values).enumerate() {
        if field.auto_increment {
            continue;
        }
        match value.encode(&field.name, Some(&field.sql_type)) {
            Ok(literal) => {
                positions.push(i);
                literals.push(literal);
            }
            Err(err) => {
                tracing::debug!(
                    target: "myorm.builder",
                    column = %field.name,
                    error = %err,
                    "skipping column in INSERT"
                );
            }
        }
    }
    (positions, literals)
}

/// Encode `values` at the given field positions; every value must encode.
pub(crate) fn encode_at(schema: &Schema, positions: &[usize], values: &[Value]) -> OrmResult<Vec<String>> {
    positions
        .iter()
        .map(|&i| {
            let field = &schema.fields()[i];
            match values.get(i) {
                Some(v) => v.encode(&field.name, Some(&field.sql_type)),
                None => Err(OrmError::unsupported_value(&field.name, "missing")),
            }
        })
        .collect()
}

/// Backquoted names of the fields at `positions`.
pub(crate) fn column_list(schema: &Schema, positions: &[usize]) -> String {
    quote_idents(positions.iter().map(|&i| schema.fields()[i].name.as_str()))
}

/// Join the present clauses with single spaces.
pub(crate) fn join_clauses<'a>(clauses: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let mut out = String::new();
    for clause in clauses.into_iter().flatten() {
        if clause.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(clause);
    }
    out
}
