use super::Schema;
use crate::entity::Entity;
use crate::error::OrmResult;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide cache of derived schemas and of tables known to exist.
///
/// Schemas are keyed by the entity's [`TypeId`], derived on first use and
/// never invalidated. Concurrent first uses may both derive; the first insert
/// wins and both callers get the same `Arc`.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<Schema>>>,
    created: RwLock<HashSet<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached schema for `T`, deriving it on first use.
    pub fn schema<T: Entity>(&self) -> OrmResult<Arc<Schema>> {
        let id = TypeId::of::<T>();
        if let Some(schema) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(schema));
        }

        let derived = Arc::new(Schema::of::<T>()?);
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(schemas.entry(id).or_insert(derived)))
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_created(&self, table: &str) -> bool {
        self.created
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(table)
    }

    pub fn mark_created(&self, table: &str) {
        self.created
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table.to_string());
    }
}
