//! Entity derive macro implementation

use crate::attrs::{FieldAttrs, parse_field_attrs, parse_struct_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(&input)?;

    let mut members = Vec::with_capacity(fields.len());
    let mut cells = Vec::with_capacity(fields.len());
    let mut reads = Vec::with_capacity(fields.len());

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let ty = &field.ty;
        let attrs = parse_field_attrs(field)?;
        let column = attrs.column.clone().unwrap_or_else(|| ident.to_string());

        if attrs.skip {
            members.push(quote! { myorm::Member::Skipped(#column.to_string()) });
            cells.push(quote! { myorm::Cell::Skipped });
            reads.push(quote! { #ident: ::core::default::Default::default() });
        } else if attrs.embed {
            members.push(quote! { myorm::Member::embedded::<#ty>(#column) });
            cells.push(quote! { myorm::Cell::embedded(&self.#ident) });
            reads.push(quote! { #ident: <#ty as myorm::FromRow>::from_row(row)? });
        } else {
            let builder = column_builder(&attrs);
            members.push(quote! {
                myorm::Member::Column(myorm::ColumnMember::of::<#ty>(#column) #builder)
            });
            cells.push(quote! { myorm::Cell::of(&self.#ident) });
            reads.push(quote! { #ident: row.try_get::<#ty>(#column)? });
        }
    }

    let table_options = table_options(&struct_attrs);

    Ok(quote! {
        impl #impl_generics myorm::Entity for #name #ty_generics #where_clause {
            fn members() -> ::std::vec::Vec<myorm::Member> {
                vec![#(#members),*]
            }

            fn table_options() -> myorm::TableOptions {
                #table_options
            }

            fn cells(&self) -> ::std::vec::Vec<myorm::Cell> {
                vec![#(#cells),*]
            }
        }

        impl #impl_generics myorm::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &myorm::Row) -> myorm::OrmResult<Self> {
                Ok(Self {
                    #(#reads),*
                })
            }
        }
    })
}

fn column_builder(attrs: &FieldAttrs) -> TokenStream {
    let mut out = TokenStream::new();
    if let Some(tag) = &attrs.tag {
        out.extend(quote! { .annotations(myorm::Annotations::parse(#tag)) });
    }
    if let Some(t) = &attrs.sql_type {
        out.extend(quote! { .sql_type(#t) });
    }
    if let Some(n) = attrs.nullable {
        out.extend(quote! { .nullable(#n) });
    }
    if let Some(d) = &attrs.default {
        out.extend(quote! { .default_value(#d) });
    }
    if attrs.increment {
        out.extend(quote! { .increment() });
    }
    if let Some(u) = &attrs.on_update {
        out.extend(quote! { .on_update(#u) });
    }
    if let Some(c) = &attrs.comment {
        out.extend(quote! { .comment(#c) });
    }
    out
}

fn table_options(attrs: &crate::attrs::StructAttrs) -> TokenStream {
    let table = attrs.table.clone().unwrap_or_default();
    let mut out = quote! { myorm::TableOptions::new(#table) };
    if let Some(c) = &attrs.comment {
        out.extend(quote! { .description(#c) });
    }
    for cols in &attrs.indexes {
        out.extend(quote! { .index(myorm::Index::new([#(#cols),*])) });
    }
    for cols in &attrs.uniques {
        out.extend(quote! { .unique(myorm::Unique::new([#(#cols),*])) });
    }
    for (k, v) in &attrs.params {
        out.extend(quote! { .param(#k, #v) });
    }
    out
}
