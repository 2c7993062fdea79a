//! Executor trait for unified database access.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// `LAST_INSERT_ID()` reported for the statement; 0 when none.
    pub last_insert_id: u64,
}

/// A trait that unifies connections, pools and transactions.
///
/// Statements are complete SQL text with literals already encoded, so an
/// executor needs no parameter binding.
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows.
    fn exec(&self, sql: &str) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`OrmError::NotFound`] if no rows are returned. Extra rows are
    /// ignored.
    fn query_one(&self, sql: &str) -> impl Future<Output = OrmResult<Row>> + Send {
        async move {
            self.query(sql)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
        }
    }

    /// Execute a query and return the first row, if any.
    fn query_opt(&self, sql: &str) -> impl Future<Output = OrmResult<Option<Row>>> + Send {
        async move { Ok(self.query(sql).await?.into_iter().next()) }
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn exec(&self, sql: &str) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(sql)
    }

    fn query(&self, sql: &str) -> impl Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(sql)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn exec(&self, sql: &str) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(sql)
    }

    fn query(&self, sql: &str) -> impl Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(sql)
    }
}
