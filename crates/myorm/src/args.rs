//! Statement arguments.
//!
//! Every statement takes a list of [`Arg`]s: table option overrides, limit,
//! offset, condition trees, orderings and the `FOR UPDATE` marker. Each
//! statement accepts a subset; anything else fails with
//! [`OrmError::UnsupportedArgument`].
//!
//! ```ignore
//! use myorm::{args, Cond, Limit, Order};
//!
//! let a = args![Cond::eq("city", "LA"), Order::desc("age"), Limit(10)];
//! ```

use crate::condition::{And, Cond, Node, Or};
use crate::error::{OrmError, OrmResult};
use crate::ident::write_ident;
use crate::model::{Schema, TableOptions};

/// `LIMIT n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub u64);

/// `OFFSET n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset(pub u64);

/// Appends `FOR UPDATE` to a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForUpdate;

/// One `ORDER BY` item. The direction is passed through as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: String,
}

impl Order {
    pub fn new(column: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: direction.into(),
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, "ASC")
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, "DESC")
    }

    /// `` `column` DIRECTION ``, or `None` without a column.
    pub fn to_sql(&self) -> Option<String> {
        if self.column.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(self.column.len() + self.direction.len() + 3);
        write_ident(&mut out, &self.column);
        let direction = self.direction.trim();
        if !direction.is_empty() {
            out.push(' ');
            out.push_str(direction);
        }
        Some(out)
    }
}

/// A statement argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Options(TableOptions),
    Limit(u64),
    Offset(u64),
    Cond(Node),
    Order(Order),
    ForUpdate,
}

impl Arg {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Arg::Options(_) => "options",
            Arg::Limit(_) => "limit",
            Arg::Offset(_) => "offset",
            Arg::Cond(_) => "condition",
            Arg::Order(_) => "order",
            Arg::ForUpdate => "for update",
        }
    }
}

impl From<TableOptions> for Arg {
    fn from(o: TableOptions) -> Self {
        Arg::Options(o)
    }
}

impl From<Limit> for Arg {
    fn from(l: Limit) -> Self {
        Arg::Limit(l.0)
    }
}

impl From<Offset> for Arg {
    fn from(o: Offset) -> Self {
        Arg::Offset(o.0)
    }
}

impl From<ForUpdate> for Arg {
    fn from(_: ForUpdate) -> Self {
        Arg::ForUpdate
    }
}

impl From<Order> for Arg {
    fn from(o: Order) -> Self {
        Arg::Order(o)
    }
}

impl From<Node> for Arg {
    fn from(n: Node) -> Self {
        Arg::Cond(n)
    }
}

impl From<Cond> for Arg {
    fn from(c: Cond) -> Self {
        Arg::Cond(Node::Cond(c))
    }
}

impl From<And> for Arg {
    fn from(a: And) -> Self {
        Arg::Cond(Node::And(a))
    }
}

impl From<Or> for Arg {
    fn from(o: Or) -> Self {
        Arg::Cond(Node::Or(o))
    }
}

/// Build a `Vec<Arg>` from arguments of mixed kinds.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::args::Arg::from($arg)),*]
    };
}

/// Which argument kinds a statement accepts. Options are always accepted.
#[derive(Debug, Clone, Copy)]
pub struct ArgRules {
    pub statement: &'static str,
    pub limit: bool,
    pub offset: bool,
    pub conditions: bool,
    pub order: bool,
    pub for_update: bool,
}

impl ArgRules {
    pub const SELECT: Self = Self {
        statement: "SELECT",
        limit: true,
        offset: true,
        conditions: true,
        order: true,
        for_update: true,
    };

    pub const UPDATE: Self = Self {
        statement: "UPDATE",
        limit: true,
        offset: false,
        conditions: true,
        order: true,
        for_update: false,
    };

    pub const DELETE: Self = Self {
        statement: "DELETE",
        limit: true,
        offset: false,
        conditions: true,
        order: true,
        for_update: false,
    };

    pub const INSERT: Self = Self {
        statement: "INSERT",
        limit: false,
        offset: false,
        conditions: false,
        order: false,
        for_update: false,
    };

    pub const UPSERT: Self = Self {
        statement: "UPSERT",
        limit: false,
        offset: false,
        conditions: true,
        order: false,
        for_update: false,
    };

    fn accepts(&self, arg: &Arg) -> bool {
        match arg {
            Arg::Options(_) => true,
            Arg::Limit(_) => self.limit,
            Arg::Offset(_) => self.offset,
            Arg::Cond(_) => self.conditions,
            Arg::Order(_) => self.order,
            Arg::ForUpdate => self.for_update,
        }
    }
}

/// Arguments resolved against a schema.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    /// Merged table options; the table name is guaranteed non-empty.
    pub options: TableOptions,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Compiled top-level condition fragments, in argument order.
    pub conditions: Vec<String>,
    /// Compiled ORDER BY items, in argument order.
    pub orders: Vec<String>,
    pub for_update: bool,
}

impl ParsedArgs {
    /// Resolve `args` on top of the entity's `base` options.
    pub fn parse(
        schema: &Schema,
        base: TableOptions,
        args: &[Arg],
        rules: ArgRules,
    ) -> OrmResult<Self> {
        let mut out = ParsedArgs {
            options: base,
            ..Default::default()
        };

        for arg in args {
            if !rules.accepts(arg) {
                return Err(OrmError::UnsupportedArgument {
                    statement: rules.statement,
                    argument: arg.kind_name(),
                });
            }
            match arg {
                Arg::Options(o) => out.options.merge(o),
                // Zero means unset.
                Arg::Limit(n) => out.limit = Some(*n).filter(|n| *n > 0),
                Arg::Offset(n) => out.offset = Some(*n).filter(|n| *n > 0),
                Arg::Cond(node) => {
                    if let Some(fragment) = node.compile_fragment(schema) {
                        out.conditions.push(fragment);
                    }
                }
                Arg::Order(order) => {
                    if let Some(sql) = order.to_sql() {
                        out.orders.push(sql);
                    }
                }
                Arg::ForUpdate => out.for_update = true,
            }
        }

        out.options.check()?;
        Ok(out)
    }

    pub fn table(&self) -> &str {
        &self.options.table_name
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// `WHERE a AND b`, or `None` without conditions.
    pub fn where_clause(&self) -> Option<String> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(format!("WHERE {}", self.conditions.join(" AND ")))
        }
    }

    /// `ORDER BY a, b`, or `None` without orderings.
    pub fn order_clause(&self) -> Option<String> {
        if self.orders.is_empty() {
            None
        } else {
            Some(format!("ORDER BY {}", self.orders.join(", ")))
        }
    }
}
