use crate::error::{OrmError, OrmResult};
use std::collections::BTreeMap;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub name: String,
            pub fields: Vec<String>,
        }

        impl $name {
            /// Unnamed; the name is derived from the fields.
            pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
                Self {
                    name: String::new(),
                    fields: fields.into_iter().map(Into::into).collect(),
                }
            }

            pub fn named<S: Into<String>>(
                name: impl Into<String>,
                fields: impl IntoIterator<Item = S>,
            ) -> Self {
                Self {
                    name: name.into(),
                    fields: fields.into_iter().map(Into::into).collect(),
                }
            }

            /// Check the declaration and fill in a missing name.
            pub fn check(&mut self) -> OrmResult<()> {
                if self.fields.is_empty() {
                    return Err(OrmError::InvalidIndex(format!(
                        "{} '{}' has no fields",
                        stringify!($name),
                        self.name
                    )));
                }
                if self.name.is_empty() {
                    self.name = format!(concat!($prefix, "_{}"), self.fields.join("_"));
                }
                Ok(())
            }
        }
    };
}

index_type!(
    /// A secondary index declaration.
    Index,
    "index"
);

index_type!(
    /// A unique key declaration.
    Unique,
    "uniq"
);

/// Table-level options.
///
/// Options come from the entity type and may be overridden per call; see
/// [`TableOptions::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub table_name: String,
    pub description: String,
    pub indexes: Vec<Index>,
    pub uniques: Vec<Unique>,
    /// CREATE TABLE parameters, keyed by the uppercased keyword.
    pub create_params: BTreeMap<String, String>,
    pub dry_run: bool,
}

impl TableOptions {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn unique(mut self, unique: Unique) -> Self {
        self.uniques.push(unique);
        self
    }

    /// Add a CREATE TABLE parameter such as `ENGINE` or `DEFAULT CHARSET`.
    pub fn param(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.create_params
            .insert(key.as_ref().trim().to_ascii_uppercase(), value.into());
        self
    }

    /// Statements are returned instead of executed.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Overlay `other` onto `self`.
    ///
    /// Populated scalar fields and non-empty lists of `other` replace those
    /// of `self`; create params merge key-wise with `other` winning; `dry_run`
    /// stays set once either side sets it.
    pub fn merge(&mut self, other: &TableOptions) {
        if !other.table_name.is_empty() {
            self.table_name = other.table_name.clone();
        }
        if !other.description.is_empty() {
            self.description = other.description.clone();
        }
        if !other.indexes.is_empty() {
            self.indexes = other.indexes.clone();
        }
        if !other.uniques.is_empty() {
            self.uniques = other.uniques.clone();
        }
        for (k, v) in &other.create_params {
            self.create_params.insert(k.clone(), v.clone());
        }
        self.dry_run |= other.dry_run;
    }

    /// Require a table name and check every index declaration.
    pub fn check(&mut self) -> OrmResult<()> {
        if self.table_name.is_empty() {
            return Err(OrmError::MissingTableName);
        }
        for idx in &mut self.indexes {
            idx.check()?;
        }
        for uniq in &mut self.uniques {
            uniq.check()?;
        }
        Ok(())
    }
}
