use super::join_clauses;
use crate::args::ParsedArgs;
use crate::ident::quote_ident;

/// `DELETE FROM <table> [WHERE] [ORDER BY] [LIMIT]`
pub fn delete(args: &ParsedArgs) -> String {
    let head = format!("DELETE FROM {}", quote_ident(args.table()));
    let where_clause = args.where_clause();
    let order_clause = args.order_clause();
    let limit = args.limit.map(|n| format!("LIMIT {n}"));
    join_clauses([
        Some(head.as_str()),
        where_clause.as_deref(),
        order_clause.as_deref(),
        limit.as_deref(),
    ])
}
