//! Decoding of live table metadata (`DESC` and `SHOW INDEX`).

use crate::error::OrmResult;
use crate::ident::quote_ident;
use crate::model::{Field, Index, Unique};
use crate::row::Row;
use crate::value::escape_string;
use std::collections::BTreeMap;

/// `DESC <table>`
pub fn describe_columns_sql(table: &str) -> String {
    format!("DESC {}", quote_ident(table))
}

/// `SHOW INDEX FROM <table>`
pub fn describe_indexes_sql(table: &str) -> String {
    format!("SHOW INDEX FROM {}", quote_ident(table))
}

/// Secondary indexes and unique keys present on a live table, by name.
///
/// The primary key is not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveIndexes {
    pub indexes: BTreeMap<String, Index>,
    pub uniques: BTreeMap<String, Unique>,
}

impl LiveIndexes {
    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name) || self.uniques.contains_key(name)
    }
}

/// Decode `DESC` rows (`Field`, `Type`, `Null`, `Default`, `Key`, `Extra`).
pub fn decode_columns(rows: &[Row]) -> OrmResult<Vec<Field>> {
    rows.iter().map(decode_column).collect()
}

fn decode_column(row: &Row) -> OrmResult<Field> {
    let name: String = row.try_get("Field")?;
    let sql_type: String = row.try_get("Type")?;
    let null: String = row.try_get("Null")?;
    let default: Option<String> = row.try_get("Default")?;
    let extra: Option<String> = row.try_get("Extra")?;
    let extra = extra.unwrap_or_default();

    let nullable = matches!(null.to_ascii_uppercase().as_str(), "YES" | "TRUE");
    let default = match default {
        Some(d) if sql_type.contains("char") || sql_type.contains("text") => {
            format!("'{}'", escape_string(&d))
        }
        Some(d) => d,
        None => "NULL".to_string(),
    };
    let lower_extra = extra.to_ascii_lowercase();
    let on_update = lower_extra
        .find("on update ")
        .map(|i| extra[i + "on update ".len()..].trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Field {
        name,
        sql_type,
        nullable,
        default,
        auto_increment: lower_extra.contains("auto_increment"),
        comment: String::new(),
        on_update,
    })
}

/// Decode `SHOW INDEX` rows (`Key_name`, `Non_unique`, `Column_name`,
/// `Seq_in_index`), grouping columns per key in sequence order.
pub fn decode_indexes(rows: &[Row]) -> OrmResult<LiveIndexes> {
    let mut grouped: BTreeMap<String, (bool, Vec<(u32, String)>)> = BTreeMap::new();
    for row in rows {
        let key: String = row.try_get("Key_name")?;
        if key.eq_ignore_ascii_case("PRIMARY") {
            continue;
        }
        let non_unique: i64 = row.try_get("Non_unique")?;
        let column: String = row.try_get("Column_name")?;
        let seq: u32 = row.try_get("Seq_in_index")?;
        let entry = grouped
            .entry(key)
            .or_insert_with(|| (non_unique == 0, Vec::new()));
        entry.1.push((seq, column));
    }

    let mut out = LiveIndexes::default();
    for (name, (unique, mut columns)) in grouped {
        columns.sort_by_key(|(seq, _)| *seq);
        let fields = columns.into_iter().map(|(_, c)| c);
        if unique {
            out.uniques.insert(name.clone(), Unique::named(name, fields));
        } else {
            out.indexes.insert(name.clone(), Index::named(name, fields));
        }
    }
    Ok(out)
}
