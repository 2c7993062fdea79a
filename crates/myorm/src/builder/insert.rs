use super::{column_list, encode_at, insert_pairs};
use crate::error::{OrmError, OrmResult};
use crate::ident::quote_ident;
use crate::model::Schema;
use crate::value::Value;

/// `INSERT INTO <table> (<keys>) VALUES (<values>)` for one flattened record.
pub fn insert(schema: &Schema, table: &str, values: &[Value]) -> String {
    let (positions, literals) = insert_pairs(schema, values);
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list(schema, &positions),
        literals.join(", ")
    )
}

/// Multi-row INSERT. The column list comes from the first record.
pub fn insert_many(schema: &Schema, table: &str, records: &[Vec<Value>]) -> OrmResult<String> {
    let (positions, rows) = encode_rows(schema, records)?;
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table),
        column_list(schema, &positions),
        rows.join(", ")
    ))
}

/// Column positions from the first record and one `(...)` tuple per record.
pub(crate) fn encode_rows(
    schema: &Schema,
    records: &[Vec<Value>],
) -> OrmResult<(Vec<usize>, Vec<String>)> {
    let Some((first, rest)) = records.split_first() else {
        return Err(OrmError::NoRecordsProvided);
    };
    let (positions, first_literals) = insert_pairs(schema, first);

    let mut rows = Vec::with_capacity(records.len());
    rows.push(format!("({})", first_literals.join(", ")));
    for record in rest {
        let literals = encode_at(schema, &positions, record)?;
        rows.push(format!("({})", literals.join(", ")));
    }
    Ok((positions, rows))
}
