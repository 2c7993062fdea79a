//! Derive macros for myorm
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;

/// Derive `Entity` and `FromRow` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use myorm::Entity;
///
/// #[derive(Entity)]
/// #[orm(table = "users", comment = "registered users", unique = "email")]
/// struct User {
///     #[orm(increment)]
///     id: u64,
///     #[orm(sql_type = "varchar(64)")]
///     email: String,
///     #[orm(tag = "type:datetime(3) default:CURRENT_TIMESTAMP(3)")]
///     created_at: chrono::NaiveDateTime,
///     #[orm(embed)]
///     audit: Audit,
///     #[orm(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
///
/// # Struct attributes
///
/// - `table = "name"` - table name
/// - `comment = "text"` - table comment
/// - `index = "a,b"` / `unique = "a,b"` - secondary index / unique key (repeatable)
/// - `engine = "InnoDB"`, `charset = "utf8mb4"` - CREATE TABLE parameters
///
/// # Field attributes
///
/// Every named field is a column by default, even without an `#[orm(...)]`
/// attribute. Use `skip` to leave a field out of the table.
///
/// - `column = "name"` - column name (defaults to the field name)
/// - `sql_type = "varchar(20)"` - SQL type; a leading `u` on integer types means unsigned
/// - `tag = "type:.. null:.. default:.. increment:.. onupdate:.."` - compact form
/// - `nullable` / `not_null` - override the nullability implied by `Option`
/// - `default = "literal"`, `on_update = "CURRENT_TIMESTAMP"`, `comment = "text"`
/// - `increment` - auto-increment primary key
/// - `embed` - flatten another `Entity` into this one
/// - `skip` - not a column: left out of every statement and the table
///   schema, filled with `Default::default()` when reading rows
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
