use super::create::column_clause;
use super::live::LiveIndexes;
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_ident, quote_idents};
use crate::model::{Field, Schema, TableOptions};
use std::collections::HashSet;

/// ALTER statements that bring a live table up to the schema.
///
/// Missing columns are added in model order, each placed `FIRST` or
/// `AFTER` its model predecessor. Declared indexes and unique keys whose
/// names are absent live are added afterwards. Columns and keys present
/// live but not in the model are left alone.
pub fn alter_statements(
    schema: &Schema,
    options: &TableOptions,
    live_fields: &[Field],
    live_indexes: &LiveIndexes,
) -> OrmResult<Vec<String>> {
    let table = quote_ident(&options.table_name);
    let mut present: HashSet<&str> = live_fields.iter().map(|f| f.name.as_str()).collect();
    let mut statements = Vec::new();

    for i in 0..schema.fields().len() {
        add_column(schema, &options.table_name, &table, i, &mut present, &mut statements)?;
    }

    for idx in &options.indexes {
        if !live_indexes.contains(&idx.name) {
            statements.push(format!(
                "ALTER TABLE {table} ADD INDEX {} ({})",
                quote_ident(&idx.name),
                quote_idents(idx.fields.iter().map(String::as_str))
            ));
        }
    }
    for uniq in &options.uniques {
        if !live_indexes.contains(&uniq.name) {
            statements.push(format!(
                "ALTER TABLE {table} ADD UNIQUE {} ({})",
                quote_ident(&uniq.name),
                quote_idents(uniq.fields.iter().map(String::as_str))
            ));
        }
    }
    Ok(statements)
}

fn add_column<'a>(
    schema: &'a Schema,
    table_name: &str,
    table: &str,
    pos: usize,
    present: &mut HashSet<&'a str>,
    statements: &mut Vec<String>,
) -> OrmResult<()> {
    let field = &schema.fields()[pos];
    if present.contains(field.name.as_str()) {
        return Ok(());
    }
    if field.auto_increment {
        return Err(OrmError::NewPrimaryKeyNotAllowed {
            table: table_name.to_string(),
            column: field.name.clone(),
        });
    }

    let placement = match pos.checked_sub(1) {
        None => "FIRST".to_string(),
        Some(prev) => {
            add_column(schema, table_name, table, prev, present, statements)?;
            format!("AFTER {}", quote_ident(&schema.fields()[prev].name))
        }
    };
    statements.push(format!(
        "ALTER TABLE {table} ADD COLUMN {} {placement}",
        column_clause(field)
    ));
    present.insert(field.name.as_str());
    Ok(())
}
