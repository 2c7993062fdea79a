//! Convenient imports for typical `myorm` usage.
//!
//! ```ignore
//! use myorm::prelude::*;
//! ```

pub use crate::{
    Arg, Assignments, Cond, Entity, ExecResult, Executor, ForUpdate, FromRow, Limit, Offset,
    Order, Orm, OrmConfig, OrmError, OrmResult, Outcome, TableOptions, Value, and, args, or,
};

#[cfg(feature = "mysql")]
pub use crate::{ConnectParams, MySqlExecutor, MySqlTransaction};
