//! In-memory class source.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use metamodel_core::{
    application::{ApplicationError, ports::ClassSource},
    domain::{RawClass, TypeName},
    error::MetamodelResult,
};

/// Thread-safe in-memory class source, for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemoryClassSource {
    inner: Arc<RwLock<BTreeMap<TypeName, RawClass>>>,
}

impl InMemoryClassSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `classes`. A later class replaces an earlier
    /// one with the same name.
    pub fn with_classes(classes: impl IntoIterator<Item = RawClass>) -> Self {
        let inner = classes
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Add or replace a class description.
    pub fn insert(&self, class: RawClass) -> MetamodelResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory class source",
            })?;
        inner.insert(class.name.clone(), class);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClassSource for InMemoryClassSource {
    fn describe(&self, type_name: &TypeName) -> MetamodelResult<Option<RawClass>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory class source",
            })?;
        Ok(inner.get(type_name).cloned())
    }

    fn type_names(&self) -> MetamodelResult<Vec<TypeName>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory class source",
            })?;
        Ok(inner.keys().cloned().collect())
    }
}
