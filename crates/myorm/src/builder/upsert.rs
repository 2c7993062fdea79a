use super::insert::encode_rows;
use super::{column_list, insert_pairs};
use crate::args::ParsedArgs;
use crate::builder::Assignments;
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_ident, write_ident};
use crate::model::Schema;
use crate::value::Value;

/// Guarded insert: the row is inserted only when no row matches the
/// conditions.
///
/// ```text
/// INSERT INTO `t` (`a`, `b`) SELECT * FROM (SELECT 1 AS `a`, 'x' AS `b`) AS tmp
/// WHERE NOT EXISTS (SELECT `id` FROM `t` WHERE <conditions>) LIMIT 1
/// ```
///
/// A record with no insertable column fails with [`OrmError::NoValueSpecified`].
pub fn select_or_insert(schema: &Schema, args: &ParsedArgs, values: &[Value]) -> OrmResult<String> {
    if args.conditions.is_empty() {
        return Err(OrmError::NoConditionsGiven);
    }
    let table = args.table();
    let increment = schema.require_increment(table)?;
    let (positions, literals) = insert_pairs(schema, values);
    if positions.is_empty() {
        return Err(OrmError::NoValueSpecified);
    }

    let mut projection = String::new();
    for (i, (&pos, literal)) in positions.iter().zip(&literals).enumerate() {
        if i > 0 {
            projection.push_str(", ");
        }
        projection.push_str(literal);
        projection.push_str(" AS ");
        write_ident(&mut projection, &schema.fields()[pos].name);
    }

    let quoted_table = quote_ident(table);
    Ok(format!(
        "INSERT INTO {quoted_table} ({}) SELECT * FROM (SELECT {projection}) AS tmp \
         WHERE NOT EXISTS (SELECT {} FROM {quoted_table} WHERE {}) LIMIT 1",
        column_list(schema, &positions),
        quote_ident(&increment.name),
        args.conditions.join(" AND ")
    ))
}

/// `INSERT INTO <table> (<keys>) VALUES (...)[, (...)] ON DUPLICATE KEY UPDATE <assignments>`
pub fn insert_on_duplicate_key_update(
    schema: &Schema,
    table: &str,
    records: &[Vec<Value>],
    assignments: &Assignments,
) -> OrmResult<String> {
    let (positions, rows) = encode_rows(schema, records)?;
    let updates = assignments.to_sql(schema)?;
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {} ON DUPLICATE KEY UPDATE {updates}",
        quote_ident(table),
        column_list(schema, &positions),
        rows.join(", ")
    ))
}
