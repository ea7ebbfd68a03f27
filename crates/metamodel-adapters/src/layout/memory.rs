//! In-memory layout documents, for tests and embedding.

use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use metamodel_core::{
    application::{ApplicationError, ports::LayoutResourceProvider},
    domain::{DomainObjectLayout, TypeName},
    error::{MetamodelError, MetamodelResult},
};

#[derive(Debug, Default)]
struct Inner {
    documents: RwLock<HashMap<TypeName, String>>,
    reads: AtomicUsize,
}

/// Thread-safe layout store that counts every lookup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLayoutProvider {
    inner: Arc<Inner>,
}

impl InMemoryLayoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document, replacing any previous one.
    pub fn insert(&self, type_name: impl Into<TypeName>, json: impl Into<String>) -> MetamodelResult<()> {
        let mut documents = self
            .inner
            .documents
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory layouts",
            })?;
        documents.insert(type_name.into(), json.into());
        Ok(())
    }

    /// Store `layout` serialised as JSON.
    pub fn insert_layout(
        &self,
        type_name: impl Into<TypeName>,
        layout: &DomainObjectLayout,
    ) -> MetamodelResult<()> {
        let json = serde_json::to_string(layout).map_err(|e| MetamodelError::Internal {
            message: format!("failed to serialise layout: {e}"),
        })?;
        self.insert(type_name, json)
    }

    pub fn remove(&self, type_name: &TypeName) -> MetamodelResult<Option<String>> {
        let mut documents = self
            .inner
            .documents
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory layouts",
            })?;
        Ok(documents.remove(type_name))
    }

    /// Number of `load` calls so far.
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }
}

impl LayoutResourceProvider for InMemoryLayoutProvider {
    fn load(&self, type_name: &TypeName) -> MetamodelResult<Option<String>> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self
            .inner
            .documents
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "in-memory layouts",
            })?;
        Ok(documents.get(type_name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamodel_core::domain::{Tab, TabGroup};

    #[test]
    fn counts_reads_and_round_trips_layouts() {
        let provider = InMemoryLayoutProvider::new();
        let mut layout = DomainObjectLayout::default();
        layout.tab_groups.push(TabGroup {
            tabs: vec![Tab::new("Main")],
        });
        provider.insert_layout("Customer", &layout).unwrap();

        let json = provider.load(&TypeName::new("Customer")).unwrap().unwrap();
        assert_eq!(
            DomainObjectLayout::from_json("Customer", &json).unwrap(),
            layout
        );
        assert!(provider.load(&TypeName::new("Order")).unwrap().is_none());
        assert_eq!(provider.reads(), 2);

        provider.remove(&TypeName::new("Customer")).unwrap();
        assert!(provider.load(&TypeName::new("Customer")).unwrap().is_none());
    }
}
