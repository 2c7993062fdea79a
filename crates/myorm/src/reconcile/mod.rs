//! Schema reconciliation.
//!
//! Compares the schema derived from an entity with the live table and
//! produces the statements that reconcile them: one `CREATE TABLE` when the
//! table does not exist, otherwise zero or more `ALTER TABLE` statements.
//!
//! Decoding of live metadata lives in [`live`]; statement rendering in
//! [`create`] and [`alter`]. [`plan`] ties them together and is pure, so
//! callers decide how the metadata is fetched.

pub mod alter;
pub mod create;
pub mod live;

pub use alter::alter_statements;
pub use create::{TableDefaults, column_clause, create_table};
pub use live::{
    LiveIndexes, decode_columns, decode_indexes, describe_columns_sql, describe_indexes_sql,
};

use crate::error::OrmResult;
use crate::model::{Field, Schema, TableOptions};

/// Live state of a table as seen by the reconciler.
#[derive(Debug, Clone, Default)]
pub enum LiveTable {
    /// `DESC` failed with "table doesn't exist".
    #[default]
    Missing,
    Present {
        fields: Vec<Field>,
        indexes: LiveIndexes,
    },
}

/// Result of comparing a schema with the live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPlan {
    pub exists: bool,
    pub statements: Vec<String>,
}

impl SchemaPlan {
    /// True when the live table already matches.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Statements reconciling `live` with `schema`.
///
/// `options` must be checked.
pub fn plan(
    schema: &Schema,
    options: &TableOptions,
    live: &LiveTable,
    defaults: &TableDefaults,
) -> OrmResult<SchemaPlan> {
    match live {
        LiveTable::Missing => Ok(SchemaPlan {
            exists: false,
            statements: vec![create_table(schema, options, defaults)],
        }),
        LiveTable::Present { fields, indexes } => Ok(SchemaPlan {
            exists: true,
            statements: alter_statements(schema, options, fields, indexes)?,
        }),
    }
}

#[cfg(test)]
mod tests;
