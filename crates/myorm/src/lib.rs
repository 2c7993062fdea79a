//! # myorm
//!
//! A struct-annotation ORM for MySQL.
//!
//! ## Features
//!
//! - **Schema from structs**: `#[derive(Entity)]` describes a table; field
//!   annotations carry SQL type, nullability, defaults and auto-increment
//! - **Structured arguments**: conditions, ordering, limits and options are
//!   values, not SQL fragments
//! - **Literal SQL**: values are escaped into the statement text; no
//!   parameter binding
//! - **Dry runs**: any call can return its statement instead of executing it
//! - **Schema reconciliation**: create missing tables, add missing columns
//!   and keys, never drop anything
//! - **Transaction-friendly**: every call runs on an [`Executor`]; a
//!   transaction is just another executor
//!
//! ## Conditions
//!
//! ```ignore
//! use myorm::prelude::*;
//!
//! let rows = orm
//!     .select::<User>(&args![
//!         and![
//!             Cond::gt("age", 18),
//!             or![Cond::eq("city", "NYC"), Cond::eq("city", "LA")],
//!         ],
//!         Order::desc("id"),
//!         Limit(20),
//!     ])
//!     .await?;
//! ```
//!
//! ## Dry run
//!
//! ```ignore
//! let sql = orm
//!     .delete::<User>(&args![TableOptions::default().dry_run(true), Cond::eq("id", 5)])
//!     .await?
//!     .into_statement();
//! ```

extern crate self as myorm;

pub mod args;
pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod entity;
pub mod error;
pub mod ident;
pub mod keepalive;
pub mod model;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod orm;
pub mod prelude;
pub mod reconcile;
pub mod row;
pub mod value;

pub use args::{Arg, ForUpdate, Limit, Offset, Order};
pub use builder::Assignments;
pub use client::{ExecResult, Executor};
pub use condition::{And, Cond, Node, Operator, Or};
pub use config::{ConnectParams, OrmConfig};
pub use entity::{
    Annotations, Category, Cell, ColumnMember, ColumnType, Entity, Member, ScalarKind, StorageKind,
};
pub use error::{ErrorKind, OrmError, OrmResult};
pub use model::{Field, Index, Schema, SchemaRegistry, TableOptions, Unique};
pub use orm::{Orm, Outcome};
pub use reconcile::{LiveIndexes, SchemaPlan, TableDefaults};
pub use row::{FromRow, Row};
pub use value::Value;

#[cfg(feature = "mysql")]
pub use mysql::{MySqlExecutor, MySqlTransaction};

#[cfg(feature = "derive")]
pub use myorm_derive::Entity;
