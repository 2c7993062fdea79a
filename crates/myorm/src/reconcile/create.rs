use crate::ident::{quote_ident, quote_idents, write_ident};
use crate::model::{Field, Schema, TableOptions};
use crate::value::escape_string;

/// Engine and charset used when the table options do not name their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefaults {
    pub engine: String,
    pub charset: String,
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            engine: "InnoDB".to_string(),
            charset: "utf8mb4".to_string(),
        }
    }
}

/// Column definition as used by CREATE TABLE and `ADD COLUMN`.
///
/// ```text
/// `id` bigint unsigned NOT NULL AUTO_INCREMENT COMMENT 'pk'
/// `name` varchar(20) NOT NULL DEFAULT '' COMMENT ''
/// ```
pub fn column_clause(field: &Field) -> String {
    let mut out = String::with_capacity(field.name.len() + field.sql_type.len() + 48);
    write_ident(&mut out, &field.name);
    out.push(' ');
    out.push_str(&field.sql_type);
    out.push_str(if field.nullable { " NULL" } else { " NOT NULL" });
    if field.auto_increment {
        out.push_str(" AUTO_INCREMENT");
    } else {
        out.push_str(" DEFAULT ");
        out.push_str(&field.default);
        if let Some(on_update) = &field.on_update {
            out.push_str(" ON UPDATE ");
            out.push_str(on_update);
        }
    }
    out.push_str(" COMMENT '");
    out.push_str(&escape_string(&field.comment));
    out.push('\'');
    out
}

/// `CREATE TABLE IF NOT EXISTS` for the schema.
///
/// `options` must have passed [`TableOptions::check`] so every index is
/// named.
pub fn create_table(schema: &Schema, options: &TableOptions, defaults: &TableDefaults) -> String {
    let mut clauses: Vec<String> = schema.fields().iter().map(column_clause).collect();
    if let Some(inc) = schema.increment_field() {
        clauses.push(format!("PRIMARY KEY ({})", quote_ident(&inc.name)));
    }
    for idx in &options.indexes {
        clauses.push(format!(
            "KEY {} ({})",
            quote_ident(&idx.name),
            quote_idents(idx.fields.iter().map(String::as_str))
        ));
    }
    for uniq in &options.uniques {
        clauses.push(format!(
            "UNIQUE KEY {} ({})",
            quote_ident(&uniq.name),
            quote_idents(uniq.fields.iter().map(String::as_str))
        ));
    }

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        quote_ident(&options.table_name),
        clauses.join(",\n")
    );
    for param in table_params(schema, options, defaults) {
        sql.push(' ');
        sql.push_str(&param);
    }
    sql
}

fn table_params(schema: &Schema, options: &TableOptions, defaults: &TableDefaults) -> Vec<String> {
    let mut params = options.create_params.clone();
    let engine = params
        .remove("ENGINE")
        .unwrap_or_else(|| defaults.engine.clone());
    let increment = params.remove("AUTO_INCREMENT");
    let charset = params
        .remove("DEFAULT CHARSET")
        .or_else(|| params.remove("CHARSET"))
        .unwrap_or_else(|| defaults.charset.clone());
    params.remove("COMMENT");

    let mut out = vec![format!("ENGINE={engine}")];
    if schema.increment_field().is_some() {
        out.push(format!(
            "AUTO_INCREMENT={}",
            increment.as_deref().unwrap_or("1")
        ));
    }
    out.push(format!("DEFAULT CHARSET={charset}"));
    out.extend(params.into_iter().map(|(k, v)| format!("{k}={v}")));
    out.push(format!("COMMENT '{}'", escape_string(&options.description)));
    out
}
