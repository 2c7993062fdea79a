//! Attribute parsing for the Entity derive macro.

use syn::{DeriveInput, LitStr, Result};

#[derive(Default)]
pub(crate) struct StructAttrs {
    pub table: Option<String>,
    pub comment: Option<String>,
    pub indexes: Vec<Vec<String>>,
    pub uniques: Vec<Vec<String>>,
    pub params: Vec<(&'static str, String)>,
}

pub(crate) fn parse_struct_attrs(input: &DeriveInput) -> Result<StructAttrs> {
    let mut out = StructAttrs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            let value = || -> Result<String> { Ok(meta.value()?.parse::<LitStr>()?.value()) };
            if meta.path.is_ident("table") {
                out.table = Some(value()?);
            } else if meta.path.is_ident("comment") {
                out.comment = Some(value()?);
            } else if meta.path.is_ident("index") {
                let cols = split_columns(&value()?);
                if cols.is_empty() {
                    return Err(meta.error("index needs at least one column"));
                }
                out.indexes.push(cols);
            } else if meta.path.is_ident("unique") {
                let cols = split_columns(&value()?);
                if cols.is_empty() {
                    return Err(meta.error("unique needs at least one column"));
                }
                out.uniques.push(cols);
            } else if meta.path.is_ident("engine") {
                out.params.push(("ENGINE", value()?));
            } else if meta.path.is_ident("charset") {
                out.params.push(("DEFAULT CHARSET", value()?));
            } else {
                return Err(meta.error("unknown orm struct attribute"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn split_columns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub column: Option<String>,
    pub tag: Option<String>,
    pub sql_type: Option<String>,
    pub nullable: Option<bool>,
    pub default: Option<String>,
    pub increment: bool,
    pub on_update: Option<String>,
    pub comment: Option<String>,
    pub embed: bool,
    pub skip: bool,
}

pub(crate) fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            let value = || -> Result<String> { Ok(meta.value()?.parse::<LitStr>()?.value()) };
            if meta.path.is_ident("column") {
                out.column = Some(value()?);
            } else if meta.path.is_ident("tag") {
                out.tag = Some(value()?);
            } else if meta.path.is_ident("sql_type") {
                out.sql_type = Some(value()?);
            } else if meta.path.is_ident("nullable") {
                out.nullable = Some(true);
            } else if meta.path.is_ident("not_null") {
                out.nullable = Some(false);
            } else if meta.path.is_ident("default") {
                out.default = Some(value()?);
            } else if meta.path.is_ident("increment") {
                out.increment = true;
            } else if meta.path.is_ident("on_update") {
                out.on_update = Some(value()?);
            } else if meta.path.is_ident("comment") {
                out.comment = Some(value()?);
            } else if meta.path.is_ident("embed") {
                out.embed = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error("unknown orm field attribute"));
            }
            Ok(())
        })?;
    }

    if out.skip && out.embed {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` and `embed` cannot be combined",
        ));
    }
    Ok(out)
}
