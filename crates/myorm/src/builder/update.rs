use super::join_clauses;
use crate::args::ParsedArgs;
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_ident, write_ident};
use crate::model::Schema;
use crate::value::Value;

/// Ordered `column = value` assignments for UPDATE and
/// `ON DUPLICATE KEY UPDATE`.
///
/// A [`Value::Raw`] is spliced after the column verbatim:
/// `set("hits", Value::raw("= `hits` + 1"))` renders `` `hits` = `hits` + 1 ``.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    items: Vec<(String, Value)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.items.push((column.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render `` `col` = literal `` items.
    ///
    /// Entries with an empty column name are dropped. Unknown columns fail
    /// with [`OrmError::UnrecognizedField`]; nothing left to assign fails with
    /// [`OrmError::NoValueSpecified`].
    pub fn to_sql(&self, schema: &Schema) -> OrmResult<String> {
        let mut parts = Vec::with_capacity(self.items.len());
        for (column, value) in &self.items {
            if column.is_empty() {
                continue;
            }
            let field = schema
                .field(column)
                .ok_or_else(|| OrmError::UnrecognizedField(column.clone()))?;

            let mut part = String::with_capacity(column.len() + 16);
            write_ident(&mut part, column);
            match value {
                Value::Raw(raw) => {
                    part.push(' ');
                    part.push_str(raw);
                }
                other => {
                    part.push_str(" = ");
                    part.push_str(&other.encode(column, Some(&field.sql_type))?);
                }
            }
            parts.push(part);
        }
        if parts.is_empty() {
            return Err(OrmError::NoValueSpecified);
        }
        Ok(parts.join(", "))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// `UPDATE <table> SET <assignments> [WHERE] [ORDER BY] [LIMIT]`
pub fn update(schema: &Schema, args: &ParsedArgs, assignments: &Assignments) -> OrmResult<String> {
    let set = assignments.to_sql(schema)?;
    let head = format!("UPDATE {} SET {set}", quote_ident(args.table()));
    let where_clause = args.where_clause();
    let order_clause = args.order_clause();
    let limit = args.limit.map(|n| format!("LIMIT {n}"));
    Ok(join_clauses([
        Some(head.as_str()),
        where_clause.as_deref(),
        order_clause.as_deref(),
        limit.as_deref(),
    ]))
}
