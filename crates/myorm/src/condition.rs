//! Condition algebra.
//!
//! A [`Cond`] is one comparison. [`And`] and [`Or`] group [`Node`]s into
//! trees of any depth. Leaves compile strictly (`OrmResult<String>`); trees
//! compile to `Option<String>` and drop every leaf that fails, so a tree can
//! mix best-effort fragments. A tree without any surviving leaf compiles to
//! `None` and contributes nothing to the WHERE clause.
//!
//! # Example
//! ```ignore
//! use myorm::{and, or, Cond};
//!
//! let filter = and![
//!     Cond::gt("age", 18),
//!     or![Cond::eq("city", "NYC"), Cond::eq("city", "LA")],
//! ];
//! // (`age` > 18 AND (`city` = 'NYC' OR `city` = 'LA'))
//! ```

use crate::error::{OrmError, OrmResult};
use crate::ident::write_ident;
use crate::model::Schema;
use crate::value::{Value, ValueList, escape_like, format_float, format_time, quote};

/// Normalized comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    /// `<>`, kept distinct from `!=` in the output.
    Diamond,
    Lt,
    Gt,
    Le,
    Ge,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
}

impl Operator {
    /// Parse an operator, case-insensitively.
    ///
    /// `==` is read as `=` and a bare `NOT` as `IS NOT`.
    pub fn parse(op: &str) -> OrmResult<Self> {
        let normalized = op
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        Ok(match normalized.as_str() {
            "=" | "==" => Self::Eq,
            "!=" => Self::Ne,
            "<>" => Self::Diamond,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "IS" => Self::Is,
            "IS NOT" | "NOT" => Self::IsNot,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "LIKE" => Self::Like,
            _ => return Err(OrmError::InvalidOperator(op.to_string())),
        })
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Diamond => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
        }
    }

    /// Operator to use when the value is NULL. `<>` is left as written.
    fn for_null(self) -> Self {
        match self {
            Self::Eq => Self::Is,
            Self::Ne => Self::IsNot,
            other => other,
        }
    }
}

/// A leaf comparison: `` `column` OPERATOR value ``.
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

impl Cond {
    pub fn new(column: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, "=", value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, "!=", value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, ">", value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, ">=", value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, "<", value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, "<=", value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, "IS", Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, "IS NOT", Value::Null)
    }

    pub fn in_list(column: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::new(column, "IN", values)
    }

    pub fn not_in(column: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::new(column, "NOT IN", values)
    }

    /// LIKE with a pattern used as-is; `%` and `_` keep their wildcard meaning.
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, "LIKE", Value::Str(pattern.into()))
    }

    /// LIKE built from literal parts joined by `%`.
    ///
    /// `["", "abc", ""]` matches anything containing `abc`. Each part is
    /// escaped, so a `%` inside a part matches a literal percent sign.
    pub fn like_parts<S: Into<String>>(column: impl Into<String>, parts: impl IntoIterator<Item = S>) -> Self {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        Self::new(column, "LIKE", Value::List(ValueList::Str(parts)))
    }

    /// Compile against `schema`, which supplies column types for temporal values.
    pub fn compile(&self, schema: &Schema) -> OrmResult<String> {
        if self.column.is_empty() {
            return Err(OrmError::EmptyColumnName);
        }
        let mut op = Operator::parse(&self.operator)?;
        let sql_type = schema.sql_type(&self.column);

        let rhs = match op {
            Operator::In | Operator::NotIn => encode_in(&self.column, &self.value, sql_type)?,
            Operator::Like => encode_like(&self.column, &self.value)?,
            _ => {
                if self.value.is_null() {
                    op = op.for_null();
                }
                self.value.encode(&self.column, sql_type)?
            }
        };

        let mut out = String::with_capacity(self.column.len() + rhs.len() + 12);
        write_ident(&mut out, &self.column);
        out.push(' ');
        out.push_str(op.as_sql());
        out.push(' ');
        out.push_str(&rhs);
        Ok(out)
    }
}

fn encode_in(column: &str, value: &Value, sql_type: Option<&str>) -> OrmResult<String> {
    let Value::List(list) = value else {
        return Err(OrmError::unsupported_value(column, value.kind_name()));
    };
    if list.is_empty() {
        return Err(OrmError::EmptyInSet(column.to_string()));
    }
    let items: Vec<String> = match list {
        ValueList::Int(v) => v.iter().map(ToString::to_string).collect(),
        ValueList::UInt(v) => v.iter().map(ToString::to_string).collect(),
        ValueList::Float(v) => {
            if v.iter().any(|f| !f.is_finite()) {
                return Err(OrmError::unsupported_value(column, "non-finite float"));
            }
            v.iter().map(|f| format_float(*f)).collect()
        }
        ValueList::Str(v) => v.iter().map(|s| quote(s)).collect(),
        ValueList::Time(v) => {
            let ty = sql_type.ok_or_else(|| OrmError::UnknownColumn(column.to_string()))?;
            v.iter().map(|t| format_time(t, ty)).collect()
        }
    };
    Ok(format!("({})", items.join(", ")))
}

fn encode_like(column: &str, value: &Value) -> OrmResult<String> {
    match value {
        Value::Str(s) => Ok(quote(s)),
        Value::List(ValueList::Str(parts)) if !parts.is_empty() => {
            let escaped: Vec<String> = parts.iter().map(|p| escape_like(p)).collect();
            Ok(format!("'{}'", escaped.join("%")))
        }
        _ => Err(OrmError::InvalidLikeValue(column.to_string())),
    }
}

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Cond(Cond),
    And(And),
    Or(Or),
}

/// All children must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct And(pub Vec<Node>);

/// Any child may hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Or(pub Vec<Node>);

impl Node {
    /// Compile this node as a child of a tree. Leaves are not parenthesized.
    ///
    /// A failing leaf yields `None`; the failure is logged at debug level.
    pub fn compile(&self, schema: &Schema) -> Option<String> {
        match self {
            Node::Cond(c) => match c.compile(schema) {
                Ok(sql) => Some(sql),
                Err(err) => {
                    tracing::debug!(
                        target: "myorm.condition",
                        column = %c.column,
                        operator = %c.operator,
                        error = %err,
                        "dropping condition"
                    );
                    None
                }
            },
            Node::And(and) => and.compile(schema),
            Node::Or(or) => or.compile(schema),
        }
    }

    /// Compile as a top-level WHERE fragment; a bare leaf gets parentheses.
    pub fn compile_fragment(&self, schema: &Schema) -> Option<String> {
        let sql = self.compile(schema)?;
        match self {
            Node::Cond(_) => Some(format!("({sql})")),
            _ => Some(sql),
        }
    }
}

fn join_group(nodes: &[Node], schema: &Schema, sep: &str) -> Option<String> {
    let parts: Vec<String> = nodes.iter().filter_map(|n| n.compile(schema)).collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("({})", parts.join(sep)))
}

impl And {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, node: impl Into<Node>) -> Self {
        self.0.push(node.into());
        self
    }

    pub fn compile(&self, schema: &Schema) -> Option<String> {
        join_group(&self.0, schema, " AND ")
    }
}

impl Or {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, node: impl Into<Node>) -> Self {
        self.0.push(node.into());
        self
    }

    pub fn compile(&self, schema: &Schema) -> Option<String> {
        join_group(&self.0, schema, " OR ")
    }
}

impl From<Cond> for Node {
    fn from(c: Cond) -> Self {
        Node::Cond(c)
    }
}

impl From<And> for Node {
    fn from(a: And) -> Self {
        Node::And(a)
    }
}

impl From<Or> for Node {
    fn from(o: Or) -> Self {
        Node::Or(o)
    }
}

impl<N: Into<Node>> FromIterator<N> for And {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        And(iter.into_iter().map(Into::into).collect())
    }
}

impl<N: Into<Node>> FromIterator<N> for Or {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Or(iter.into_iter().map(Into::into).collect())
    }
}

/// Build an [`And`] from nodes of mixed kinds.
#[macro_export]
macro_rules! and {
    ($($node:expr),* $(,)?) => {
        $crate::condition::And(vec![$($crate::condition::Node::from($node)),*])
    };
}

/// Build an [`Or`] from nodes of mixed kinds.
#[macro_export]
macro_rules! or {
    ($($node:expr),* $(,)?) => {
        $crate::condition::Or(vec![$($crate::condition::Node::from($node)),*])
    };
}
