//! Backtick quoting for MySQL identifiers.
//!
//! Table, column and index names are always emitted quoted. An embedded
//! backtick is doubled.

/// Quote a single identifier: `users` -> `` `users` ``.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_ident(&mut out, name);
    out
}

pub(crate) fn write_ident(out: &mut String, name: &str) {
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
}

/// Quote each identifier and join with `", "`.
pub fn quote_idents<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_ident(&mut out, name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert_eq!(quote_ident("users"), "`users`");
    }

    #[test]
    fn ident_with_backtick() {
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn ident_list() {
        assert_eq!(quote_idents(["a", "b"]), "`a`, `b`");
        assert_eq!(quote_idents(Vec::<&str>::new()), "");
    }
}
