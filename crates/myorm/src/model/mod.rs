//! Field and schema model.
//!
//! A [`Schema`] is the flattened column list derived from an [`Entity`]'s
//! members, plus the lookups every statement needs (column by name, the
//! auto-increment column, the backquoted SELECT list).

pub mod options;
pub mod registry;

pub use options::{Index, TableOptions, Unique};
pub use registry::SchemaRegistry;

use crate::entity::{Category, ColumnMember, Entity, Member};
use crate::error::{OrmError, OrmResult};
use crate::ident::quote_idents;
use crate::value::escape_string;
use std::collections::HashMap;

/// One column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    /// Default literal, already quoted for the dialect.
    pub default: String,
    pub auto_increment: bool,
    pub comment: String,
    pub on_update: Option<String>,
}

impl Field {
    /// Derive a field from a column member and its annotations.
    pub fn from_member(member: &ColumnMember) -> OrmResult<Self> {
        let ann = &member.annotations;
        let category = member.kind.scalar.category();

        let sql_type = match ann.sql_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => expand_unsigned(t),
            _ => member
                .kind
                .scalar
                .default_sql_type()
                .ok_or_else(|| OrmError::MissingTypeAnnotation(member.name.clone()))?
                .to_string(),
        };

        let nullable = ann.nullable.unwrap_or(member.kind.optional);
        let default = match ann.default.as_deref() {
            Some(d) => explicit_default(category, d),
            None => implicit_default(category, nullable, &sql_type),
        };

        Ok(Self {
            name: member.name.clone(),
            sql_type,
            nullable,
            default,
            auto_increment: ann.increment && category == Category::Integer,
            comment: ann.comment.as_deref().unwrap_or("").trim().to_string(),
            on_update: ann.on_update.clone(),
        })
    }
}

const INTEGER_TYPES: [&str; 5] = ["tinyint", "smallint", "mediumint", "int", "bigint"];

/// `uint` -> `int unsigned`, `ubigint(20)` -> `bigint(20) unsigned`.
fn expand_unsigned(t: &str) -> String {
    if let Some(rest) = t.strip_prefix(['u', 'U']) {
        let lower = rest.to_ascii_lowercase();
        if INTEGER_TYPES.iter().any(|i| lower.starts_with(i)) {
            return format!("{rest} unsigned");
        }
    }
    t.to_string()
}

fn explicit_default(category: Category, d: &str) -> String {
    match category {
        Category::String => format!("'{}'", escape_string(d)),
        Category::DateTime => {
            if d == "0" || d.to_ascii_uppercase().starts_with("CURRENT_TIMESTAMP") {
                d.to_string()
            } else {
                format!("'{}'", d.replace('_', " "))
            }
        }
        _ => d.to_string(),
    }
}

fn implicit_default(category: Category, nullable: bool, sql_type: &str) -> String {
    if nullable {
        return "NULL".to_string();
    }
    match category {
        Category::String => "''",
        Category::Integer | Category::Float => "0",
        Category::Bool => "FALSE",
        Category::DateTime => match sql_type.to_ascii_lowercase().as_str() {
            "timestamp" => "'1970-01-02 00:00:01'",
            "datetime" => "'1970-01-01 00:00:00'",
            "date" => "'1970-01-01'",
            "time" => "'00:00:00'",
            _ => "'1970-01-01'",
        },
    }
    .to_string()
}

/// Flatten members into fields, recursing into embedded entities.
pub fn derive_fields(members: &[Member]) -> OrmResult<Vec<Field>> {
    let mut out = Vec::new();
    collect_fields(members, &mut out)?;
    Ok(out)
}

fn collect_fields(members: &[Member], out: &mut Vec<Field>) -> OrmResult<()> {
    for member in members {
        match member {
            Member::Column(c) => out.push(Field::from_member(c)?),
            Member::Embedded { members, .. } => collect_fields(&members(), out)?,
            Member::Skipped(_) => {}
        }
    }
    Ok(())
}

/// The resolved column layout of an entity type.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    positions: HashMap<String, usize>,
    increment: Option<usize>,
    select_columns: String,
}

impl Schema {
    /// Build a schema from an ordered field list.
    ///
    /// Fails with [`OrmError::MultipleIncrementFields`] when more than one
    /// field is auto-increment.
    pub fn new(fields: Vec<Field>) -> OrmResult<Self> {
        let mut increment: Option<usize> = None;
        let mut positions = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            positions.insert(f.name.clone(), i);
            if f.auto_increment {
                if let Some(first) = increment {
                    return Err(OrmError::MultipleIncrementFields {
                        first: fields[first].name.clone(),
                        second: f.name.clone(),
                    });
                }
                increment = Some(i);
            }
        }
        let select_columns = quote_idents(fields.iter().map(|f| f.name.as_str()));
        Ok(Self {
            fields,
            positions,
            increment,
            select_columns,
        })
    }

    /// Derive the schema of `T`.
    pub fn of<T: Entity>() -> OrmResult<Self> {
        Self::new(derive_fields(&T::members())?)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.positions.get(name).map(|&i| &self.fields[i])
    }

    pub fn sql_type(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.sql_type.as_str())
    }

    pub fn increment_field(&self) -> Option<&Field> {
        self.increment.map(|i| &self.fields[i])
    }

    /// The auto-increment field, or [`OrmError::NoIncrementField`].
    pub fn require_increment(&self, table: &str) -> OrmResult<&Field> {
        self.increment_field()
            .ok_or_else(|| OrmError::NoIncrementField(table.to_string()))
    }

    /// Backquoted, comma separated column list.
    pub fn select_columns(&self) -> &str {
        &self.select_columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
