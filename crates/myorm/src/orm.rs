//! The execution facade.
//!
//! [`Orm`] resolves an entity's schema, builds a statement and either runs
//! it on its [`Executor`] or, when the merged options ask for a dry run,
//! hands the statement back as [`Outcome::Statement`].
//!
//! # Example
//!
//! ```ignore
//! use myorm::prelude::*;
//!
//! #[derive(Debug, Entity)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(increment)]
//!     id: u64,
//!     #[orm(sql_type = "varchar(32)")]
//!     name: String,
//! }
//!
//! let orm = Orm::new(MySqlExecutor::connect(&url).await?);
//! let adults = orm
//!     .select::<User>(&args![Cond::gte("age", 18), Order::asc("id"), Limit(10)])
//!     .await?;
//! ```

use crate::args::{Arg, ArgRules, ParsedArgs};
use crate::builder::{self, Assignments};
use crate::client::{ExecResult, Executor};
use crate::config::OrmConfig;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::keepalive::KeepAliveState;
use crate::model::{Field, Schema, SchemaRegistry, TableOptions};
use crate::reconcile::{self, LiveIndexes, LiveTable, SchemaPlan};
use crate::row::{FromRow, Row};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Result of a facade call: the executed outcome, or the statement that a
/// dry run would have executed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Statement(String),
}

impl<T> Outcome<T> {
    /// The dry-run statement, if this is one.
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Statement(sql) => Some(sql),
            Self::Done(_) => None,
        }
    }

    pub fn into_statement(self) -> Option<String> {
        match self {
            Self::Statement(sql) => Some(sql),
            Self::Done(_) => None,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement(_))
    }

    /// The executed value, if the statement ran.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::Statement(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(v) => Outcome::Done(f(v)),
            Self::Statement(sql) => Outcome::Statement(sql),
        }
    }
}

/// State shared by every facade cloned from, or re-targeted by, one `Orm`.
#[derive(Debug)]
struct Shared {
    config: OrmConfig,
    registry: SchemaRegistry,
    auto_create: AtomicBool,
    keep_alive: Arc<KeepAliveState>,
}

/// ORM facade over an [`Executor`].
///
/// Cloning is cheap when `E` is; clones share the schema cache, the
/// known-created table set and the keep-alive state.
#[derive(Debug)]
pub struct Orm<E> {
    executor: E,
    shared: Arc<Shared>,
}

impl<E: Clone> Clone for Orm<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: Executor> Orm<E> {
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, OrmConfig::default())
    }

    pub fn with_config(executor: E, config: OrmConfig) -> Self {
        let auto_create = AtomicBool::new(config.auto_create_table);
        Self {
            executor,
            shared: Arc::new(Shared {
                config,
                registry: SchemaRegistry::new(),
                auto_create,
                keep_alive: Arc::new(KeepAliveState::default()),
            }),
        }
    }

    /// A facade running on `executor` (typically a transaction) that shares
    /// this facade's caches and settings.
    pub fn with_executor<X: Executor>(&self, executor: X) -> Orm<X> {
        Orm {
            executor,
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn config(&self) -> &OrmConfig {
        &self.shared.config
    }

    /// The cached schema of `T`.
    pub fn schema<T: Entity>(&self) -> OrmResult<Arc<Schema>> {
        self.shared.registry.schema::<T>()
    }

    /// Backquoted, comma separated column list of `T`.
    pub fn select_fields<T: Entity>(&self) -> OrmResult<String> {
        Ok(self.schema::<T>()?.select_columns().to_string())
    }

    /// Column descriptors of `T`, embedded entities flattened.
    pub fn struct_fields<T: Entity>(&self) -> OrmResult<Vec<Field>> {
        Ok(self.schema::<T>()?.fields().to_vec())
    }

    /// Backquoted column names and encoded literals `INSERT` would use for
    /// `record`.
    pub fn insert_fields<T: Entity>(&self, record: &T) -> OrmResult<(Vec<String>, Vec<String>)> {
        let schema = self.schema::<T>()?;
        let values = builder::record_values(&schema, record)?;
        let (positions, literals) = builder::insert_pairs(&schema, &values);
        let keys = positions
            .iter()
            .map(|&i| crate::ident::quote_ident(&schema.fields()[i].name))
            .collect();
        Ok((keys, literals))
    }

    /// Reconcile each table before the first write to it.
    ///
    /// SELECT never triggers reconciliation. A table is reconciled at most
    /// once per facade family.
    pub fn auto_create_table(&self) {
        self.set_auto_create_table(true);
    }

    pub fn set_auto_create_table(&self, enabled: bool) {
        self.shared.auto_create.store(enabled, Ordering::Release);
    }

    pub fn is_auto_create_table(&self) -> bool {
        self.shared.auto_create.load(Ordering::Acquire)
    }

    /// Whether `table` was created or altered by this facade family.
    pub fn is_table_created(&self, table: &str) -> bool {
        self.shared.registry.is_created(table)
    }

    // ==================== Statements ====================

    /// `SELECT` rows of `T`.
    ///
    /// Accepts options, conditions, [`crate::Order`], [`crate::Limit`],
    /// [`crate::Offset`] and [`crate::ForUpdate`].
    pub async fn select<T: Entity + FromRow>(&self, args: &[Arg]) -> OrmResult<Outcome<Vec<T>>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::SELECT)?;
        let sql = builder::select(&schema, &parsed);
        if parsed.dry_run() {
            return Ok(Outcome::Statement(sql));
        }
        let rows = self.query_sql(&sql).await?;
        Ok(Outcome::Done(decode_rows(&rows)?))
    }

    /// `INSERT` one record. The auto-increment column is left to the server.
    pub async fn insert<T: Entity>(&self, record: &T, args: &[Arg]) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::INSERT)?;
        let values = builder::record_values(&schema, record)?;
        let sql = builder::insert(&schema, parsed.table(), &values);
        self.write(&schema, &parsed.options, sql).await
    }

    /// Multi-row `INSERT`; the column list comes from the first record.
    pub async fn insert_many<T: Entity>(
        &self,
        records: &[T],
        args: &[Arg],
    ) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::INSERT)?;
        let rows = records_values(&schema, records)?;
        let sql = builder::insert_many(&schema, parsed.table(), &rows)?;
        self.write(&schema, &parsed.options, sql).await
    }

    /// `UPDATE` rows of `T`'s table.
    pub async fn update<T: Entity>(
        &self,
        assignments: &Assignments,
        args: &[Arg],
    ) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::UPDATE)?;
        let sql = builder::update(&schema, &parsed, assignments)?;
        self.write(&schema, &parsed.options, sql).await
    }

    /// `DELETE` rows of `T`'s table. Without conditions every row goes.
    pub async fn delete<T: Entity>(&self, args: &[Arg]) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::DELETE)?;
        let sql = builder::delete(&parsed);
        self.write(&schema, &parsed.options, sql).await
    }

    /// Insert `record` unless a row matches the conditions, then read back
    /// the inserted row (by id) or the matching rows.
    pub async fn select_or_insert<T: Entity + FromRow>(
        &self,
        record: &T,
        args: &[Arg],
    ) -> OrmResult<Outcome<Vec<T>>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::UPSERT)?;
        let values = builder::record_values(&schema, record)?;
        let sql = builder::select_or_insert(&schema, &parsed, &values)?;
        if parsed.dry_run() {
            return Ok(Outcome::Statement(sql));
        }

        self.ensure_table(&schema, &parsed.options).await?;
        let res = self.exec_sql(&sql).await?;
        let increment = schema.require_increment(parsed.table())?;
        let follow_up = if res.rows_affected > 0 && res.last_insert_id > 0 {
            builder::select_by_id(&schema, parsed.table(), increment, res.last_insert_id)
        } else {
            builder::select(&schema, &parsed)
        };
        let rows = self.query_sql(&follow_up).await?;
        Ok(Outcome::Done(decode_rows(&rows)?))
    }

    /// Insert `record` unless a row matches the conditions.
    ///
    /// `rows_affected` is 0 when a matching row already existed.
    pub async fn insert_if_not_exists<T: Entity>(
        &self,
        record: &T,
        args: &[Arg],
    ) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::UPSERT)?;
        let values = builder::record_values(&schema, record)?;
        let sql = builder::select_or_insert(&schema, &parsed, &values)?;
        self.write(&schema, &parsed.options, sql).await
    }

    /// `INSERT ... ON DUPLICATE KEY UPDATE` for one record.
    pub async fn insert_on_duplicate_key_update<T: Entity>(
        &self,
        record: &T,
        assignments: &Assignments,
        args: &[Arg],
    ) -> OrmResult<Outcome<ExecResult>> {
        self.insert_many_on_duplicate_key_update(std::slice::from_ref(record), assignments, args)
            .await
    }

    /// Multi-row `INSERT ... ON DUPLICATE KEY UPDATE`.
    pub async fn insert_many_on_duplicate_key_update<T: Entity>(
        &self,
        records: &[T],
        assignments: &Assignments,
        args: &[Arg],
    ) -> OrmResult<Outcome<ExecResult>> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::INSERT)?;
        let rows = records_values(&schema, records)?;
        let sql =
            builder::insert_on_duplicate_key_update(&schema, parsed.table(), &rows, assignments)?;
        self.write(&schema, &parsed.options, sql).await
    }

    // ==================== Schema ====================

    /// The statements that would bring `T`'s table in line with `T`.
    ///
    /// Accepts options only. Nothing is executed.
    pub async fn create_or_alter_statements<T: Entity>(&self, args: &[Arg]) -> OrmResult<SchemaPlan> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::INSERT)?;
        self.plan(&schema, &parsed.options).await
    }

    /// Create `T`'s table, or alter it to add missing columns and keys.
    ///
    /// On a dry run the plan is returned unexecuted.
    pub async fn create_table<T: Entity>(&self, args: &[Arg]) -> OrmResult<SchemaPlan> {
        let schema = self.schema::<T>()?;
        let parsed = ParsedArgs::parse(&schema, T::table_options(), args, ArgRules::INSERT)?;
        if parsed.dry_run() {
            return self.plan(&schema, &parsed.options).await;
        }
        self.reconcile(&schema, &parsed.options).await
    }

    /// Live columns of `table` (`DESC`).
    pub async fn read_table_fields(&self, table: &str) -> OrmResult<Vec<Field>> {
        let rows = self.query_sql(&reconcile::describe_columns_sql(table)).await?;
        reconcile::decode_columns(&rows)
    }

    /// Live secondary indexes and unique keys of `table` (`SHOW INDEX`).
    pub async fn read_table_indexes(&self, table: &str) -> OrmResult<LiveIndexes> {
        let rows = self.query_sql(&reconcile::describe_indexes_sql(table)).await?;
        reconcile::decode_indexes(&rows)
    }

    /// The connection's current database, `None` when none is selected.
    pub async fn current_database(&self) -> OrmResult<Option<String>> {
        let row = self.query_one_sql("SELECT DATABASE() AS `db`").await?;
        row.try_get("db")
    }

    // ==================== Keep-alive ====================

    /// Poll the server with `SHOW TABLES` every configured interval.
    ///
    /// Returns the task handle, or `None` when a poll task is already
    /// running. Must be called inside a tokio runtime.
    pub fn keep_alive(&self) -> Option<JoinHandle<()>>
    where
        E: Clone + 'static,
    {
        self.shared
            .keep_alive
            .start(self.executor.clone(), self.shared.config.keep_alive_interval)
    }

    /// Ask the poll task to stop after its current sleep.
    pub fn stop_keep_alive(&self) {
        self.shared.keep_alive.stop();
    }

    pub fn is_keeping_alive(&self) -> bool {
        self.shared.keep_alive.is_running()
    }

    // ==================== Internals ====================

    async fn write(
        &self,
        schema: &Schema,
        options: &TableOptions,
        sql: String,
    ) -> OrmResult<Outcome<ExecResult>> {
        if options.dry_run {
            return Ok(Outcome::Statement(sql));
        }
        self.ensure_table(schema, options).await?;
        Ok(Outcome::Done(self.exec_sql(&sql).await?))
    }

    async fn ensure_table(&self, schema: &Schema, options: &TableOptions) -> OrmResult<()> {
        if !self.is_auto_create_table() || self.shared.registry.is_created(&options.table_name) {
            return Ok(());
        }
        self.reconcile(schema, options).await.map(|_| ())
    }

    async fn live_table(&self, table: &str) -> OrmResult<LiveTable> {
        let fields = match self.read_table_fields(table).await {
            Ok(fields) => fields,
            Err(err) if err.is_table_missing() => return Ok(LiveTable::Missing),
            Err(err) => return Err(err),
        };
        if fields.is_empty() {
            return Ok(LiveTable::Missing);
        }
        let indexes = self.read_table_indexes(table).await?;
        Ok(LiveTable::Present { fields, indexes })
    }

    async fn plan(&self, schema: &Schema, options: &TableOptions) -> OrmResult<SchemaPlan> {
        let live = self.live_table(&options.table_name).await?;
        reconcile::plan(schema, options, &live, &self.shared.config.table_defaults)
    }

    async fn reconcile(&self, schema: &Schema, options: &TableOptions) -> OrmResult<SchemaPlan> {
        let plan = self.plan(schema, options).await?;
        for sql in &plan.statements {
            tracing::info!(
                target: "myorm.schema",
                table = %options.table_name,
                sql = %sql,
                "reconciling table"
            );
            self.exec_sql(sql).await?;
        }
        self.shared.registry.mark_created(&options.table_name);
        Ok(plan)
    }

    async fn exec_sql(&self, sql: &str) -> OrmResult<ExecResult> {
        tracing::debug!(target: "myorm.sql", sql = %self.shared.config.truncate_sql(sql), "exec");
        self.executor.exec(sql).await.map_err(|e| e.with_sql(sql))
    }

    async fn query_sql(&self, sql: &str) -> OrmResult<Vec<Row>> {
        tracing::debug!(target: "myorm.sql", sql = %self.shared.config.truncate_sql(sql), "query");
        self.executor.query(sql).await.map_err(|e| e.with_sql(sql))
    }

    async fn query_one_sql(&self, sql: &str) -> OrmResult<Row> {
        self.query_sql(sql)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::not_found("Expected one row, got none").with_sql(sql))
    }
}

fn decode_rows<T: FromRow>(rows: &[Row]) -> OrmResult<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}

fn records_values<T: Entity>(schema: &Schema, records: &[T]) -> OrmResult<Vec<Vec<crate::Value>>> {
    records
        .iter()
        .map(|r| builder::record_values(schema, r))
        .collect()
}
