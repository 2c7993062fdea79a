use super::join_clauses;
use crate::args::ParsedArgs;
use crate::ident::quote_ident;
use crate::model::{Field, Schema};

/// `SELECT <columns> FROM <table> [WHERE] [ORDER BY] [LIMIT] [OFFSET] [FOR UPDATE]`
pub fn select(schema: &Schema, args: &ParsedArgs) -> String {
    let head = format!(
        "SELECT {} FROM {}",
        schema.select_columns(),
        quote_ident(args.table())
    );
    let where_clause = args.where_clause();
    let order_clause = args.order_clause();
    let limit = args.limit.map(|n| format!("LIMIT {n}"));
    let offset = args.offset.map(|n| format!("OFFSET {n}"));
    join_clauses([
        Some(head.as_str()),
        where_clause.as_deref(),
        order_clause.as_deref(),
        limit.as_deref(),
        offset.as_deref(),
        args.for_update.then_some("FOR UPDATE"),
    ])
}

/// Select the row whose auto-increment column equals `id`.
pub fn select_by_id(schema: &Schema, table: &str, increment: &Field, id: u64) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = {id}",
        schema.select_columns(),
        quote_ident(table),
        quote_ident(&increment.name)
    )
}
