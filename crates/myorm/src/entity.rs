//! Struct description: the [`Entity`] trait and its building blocks.
//!
//! An entity describes its members in declaration order. Each member is a
//! column (with a storage kind and optional annotations), an embedded entity
//! whose members are flattened into the parent, or a skipped member.
//!
//! `#[derive(Entity)]` implements this trait; a manual implementation looks like:
//!
//! ```ignore
//! impl Entity for User {
//!     fn members() -> Vec<Member> {
//!         vec![
//!             ColumnMember::of::<u64>("id").increment().into(),
//!             ColumnMember::of::<String>("name")
//!                 .annotations(Annotations::parse("type:varchar(20) null:false"))
//!                 .into(),
//!         ]
//!     }
//!
//!     fn cells(&self) -> Vec<Cell> {
//!         vec![Cell::of(&self.id), Cell::of(&self.name)]
//!     }
//! }
//! ```

use crate::error::{OrmError, OrmResult};
use crate::model::TableOptions;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A record type that maps onto a table.
pub trait Entity: Send + Sync + 'static {
    /// Members in declaration order.
    fn members() -> Vec<Member>;

    /// Type-level table options (table name, indexes, ...).
    fn table_options() -> TableOptions {
        TableOptions::default()
    }

    /// This record's values, aligned with [`Entity::members`].
    fn cells(&self) -> Vec<Cell>;
}

/// The scalar part of a column's storage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    Str,
    Time,
}

/// Value category, drives default literals and quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Integer,
    Float,
    Bool,
    String,
    DateTime,
}

impl ScalarKind {
    pub fn category(self) -> Category {
        match self {
            Self::I8
            | Self::U8
            | Self::I16
            | Self::U16
            | Self::I32
            | Self::U32
            | Self::I64
            | Self::U64 => Category::Integer,
            Self::F32 | Self::F64 => Category::Float,
            Self::Bool => Category::Bool,
            Self::Str => Category::String,
            Self::Time => Category::DateTime,
        }
    }

    /// SQL type used when no `type` annotation is given.
    ///
    /// Strings and floats have none.
    pub fn default_sql_type(self) -> Option<&'static str> {
        Some(match self {
            Self::I8 => "tinyint",
            Self::U8 => "tinyint unsigned",
            Self::I16 => "smallint",
            Self::U16 => "smallint unsigned",
            Self::I32 => "int",
            Self::U32 => "int unsigned",
            Self::I64 => "bigint",
            Self::U64 => "bigint unsigned",
            Self::Bool => "boolean",
            Self::Time => "datetime",
            Self::F32 | Self::F64 | Self::Str => return None,
        })
    }
}

/// Storage kind of a column: a scalar, possibly wrapped in `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKind {
    pub scalar: ScalarKind,
    pub optional: bool,
}

impl StorageKind {
    pub const fn required(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            optional: false,
        }
    }
}

/// Per-field annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub sql_type: Option<String>,
    pub nullable: Option<bool>,
    pub default: Option<String>,
    pub increment: bool,
    pub on_update: Option<String>,
    pub comment: Option<String>,
}

impl Annotations {
    /// Parse the space separated `key:value` form,
    /// e.g. `"type:varchar(20) null:true default:abc"`.
    ///
    /// Recognized keys: `type`, `null`, `default`, `increment`, `onupdate`.
    /// Unknown keys and malformed parts are ignored.
    pub fn parse(tag: &str) -> Self {
        let mut out = Self::default();
        for part in tag.split(' ') {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let key = key.trim_matches([' ', '\t']);
            let value = value.trim_matches([' ', '\t']);
            match key {
                "type" if !value.is_empty() => out.sql_type = Some(value.to_string()),
                "null" => out.nullable = parse_flag(value),
                "default" if !value.is_empty() => out.default = Some(value.to_string()),
                "increment" => out.increment = parse_flag(value).unwrap_or(false),
                "onupdate" if !value.is_empty() => out.on_update = Some(value.to_string()),
                _ => {}
            }
        }
        out
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// A column member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMember {
    pub name: String,
    pub kind: StorageKind,
    pub annotations: Annotations,
}

impl ColumnMember {
    pub fn new(name: impl Into<String>, kind: StorageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Annotations::default(),
        }
    }

    /// Column whose storage kind comes from the Rust type `T`.
    pub fn of<T: ColumnType>(name: impl Into<String>) -> Self {
        Self::new(name, T::KIND)
    }

    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.annotations.sql_type = Some(sql_type.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.annotations.nullable = Some(nullable);
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.annotations.default = Some(default.into());
        self
    }

    pub fn increment(mut self) -> Self {
        self.annotations.increment = true;
        self
    }

    pub fn on_update(mut self, clause: impl Into<String>) -> Self {
        self.annotations.on_update = Some(clause.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.annotations.comment = Some(comment.into());
        self
    }
}

/// One member of an entity.
#[derive(Debug, Clone)]
pub enum Member {
    Column(ColumnMember),
    /// A nested entity; its members are flattened into the parent.
    Embedded {
        name: String,
        members: fn() -> Vec<Member>,
    },
    Skipped(String),
}

impl Member {
    pub fn embedded<E: Entity>(name: impl Into<String>) -> Self {
        Self::Embedded {
            name: name.into(),
            members: E::members,
        }
    }
}

impl From<ColumnMember> for Member {
    fn from(c: ColumnMember) -> Self {
        Member::Column(c)
    }
}

/// One member's value in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Embedded(Vec<Cell>),
    Skipped,
}

impl Cell {
    pub fn of<T: ColumnType>(v: &T) -> Self {
        Cell::Value(v.to_value())
    }

    pub fn embedded<E: Entity>(e: &E) -> Self {
        Cell::Embedded(e.cells())
    }
}

/// Flatten cells into column values, in flattened member order.
pub(crate) fn flatten_cells(cells: Vec<Cell>, out: &mut Vec<Value>) {
    for cell in cells {
        match cell {
            Cell::Value(v) => out.push(v),
            Cell::Embedded(inner) => flatten_cells(inner, out),
            Cell::Skipped => {}
        }
    }
}

/// A Rust type storable in a single column.
pub trait ColumnType: Sized {
    const KIND: StorageKind;

    fn to_value(&self) -> Value;

    fn from_value(column: &str, value: Value) -> OrmResult<Self>;
}

fn unexpected(column: &str, expected: &str, got: &Value) -> OrmError {
    OrmError::decode(
        column,
        format!("expected {expected}, got {}", got.kind_name()),
    )
}

macro_rules! impl_int_column {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl ColumnType for $t {
                const KIND: StorageKind = StorageKind::required(ScalarKind::$kind);

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(column: &str, value: Value) -> OrmResult<Self> {
                    let out = match &value {
                        Value::Int(v) => <$t>::try_from(*v).ok(),
                        Value::UInt(v) => <$t>::try_from(*v).ok(),
                        Value::Bool(v) => Some(<$t>::from(*v)),
                        Value::Str(s) => s.trim().parse::<$t>().ok(),
                        _ => None,
                    };
                    out.ok_or_else(|| unexpected(column, stringify!($t), &value))
                }
            }
        )*
    };
}

impl_int_column!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);

macro_rules! impl_float_column {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl ColumnType for $t {
                const KIND: StorageKind = StorageKind::required(ScalarKind::$kind);

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(column: &str, value: Value) -> OrmResult<Self> {
                    let out = match &value {
                        Value::Float(v) => Some(*v as $t),
                        Value::Int(v) => Some(*v as $t),
                        Value::UInt(v) => Some(*v as $t),
                        Value::Str(s) => s.trim().parse::<$t>().ok(),
                        _ => None,
                    };
                    out.ok_or_else(|| unexpected(column, stringify!($t), &value))
                }
            }
        )*
    };
}

impl_float_column!(f32 => F32, f64 => F64);

impl ColumnType for bool {
    const KIND: StorageKind = StorageKind::required(ScalarKind::Bool);

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(column: &str, value: Value) -> OrmResult<Self> {
        match &value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::UInt(v) => Ok(*v != 0),
            Value::Str(s) => match s.trim() {
                "1" | "true" | "TRUE" => Ok(true),
                "0" | "false" | "FALSE" => Ok(false),
                _ => Err(unexpected(column, "bool", &value)),
            },
            _ => Err(unexpected(column, "bool", &value)),
        }
    }
}

impl ColumnType for String {
    const KIND: StorageKind = StorageKind::required(ScalarKind::Str);

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(column: &str, value: Value) -> OrmResult<Self> {
        match value {
            Value::Str(s) => Ok(s),
            Value::Int(v) => Ok(v.to_string()),
            Value::UInt(v) => Ok(v.to_string()),
            other => Err(unexpected(column, "string", &other)),
        }
    }
}

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

impl ColumnType for NaiveDateTime {
    const KIND: StorageKind = StorageKind::required(ScalarKind::Time);

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(column: &str, value: Value) -> OrmResult<Self> {
        match &value {
            Value::Time(t) => Ok(*t),
            Value::Str(s) => parse_time(s).ok_or_else(|| unexpected(column, "datetime", &value)),
            _ => Err(unexpected(column, "datetime", &value)),
        }
    }
}

impl ColumnType for DateTime<Utc> {
    const KIND: StorageKind = StorageKind::required(ScalarKind::Time);

    fn to_value(&self) -> Value {
        Value::Time(self.naive_utc())
    }

    fn from_value(column: &str, value: Value) -> OrmResult<Self> {
        NaiveDateTime::from_value(column, value).map(|t| t.and_utc())
    }
}

impl<T: ColumnType> ColumnType for Option<T> {
    const KIND: StorageKind = StorageKind {
        scalar: T::KIND.scalar,
        optional: true,
    };

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(column: &str, value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}
