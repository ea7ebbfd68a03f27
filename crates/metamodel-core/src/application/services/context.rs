//! The metamodel context: owns the loader cache and the layout blacklist.
//!
//! Built once at startup and passed explicitly to whoever needs it. Tests
//! reset it with [`MetamodelContext::clear`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ApplicationError;
use crate::application::ports::{ClassSource, LayoutResourceProvider, PersistenceFilter};
use crate::application::services::layout_overlay::{LayoutOverlay, NoLayoutResources};
use crate::application::services::specification_loader::SpecificationLoader;
use crate::application::services::validators::{MetamodelValidator, default_validators};
use crate::domain::ProgrammingModel;
use crate::error::MetamodelResult;

pub struct MetamodelContext {
    source: Arc<dyn ClassSource>,
    loader: SpecificationLoader,
    validators: Vec<Box<dyn MetamodelValidator>>,
}

impl MetamodelContext {
    pub fn builder() -> MetamodelContextBuilder {
        MetamodelContextBuilder::default()
    }

    pub fn loader(&self) -> &SpecificationLoader {
        &self.loader
    }

    pub fn class_source(&self) -> &dyn ClassSource {
        self.source.as_ref()
    }

    pub fn validators(&self) -> &[Box<dyn MetamodelValidator>] {
        &self.validators
    }

    /// Drop every cached specification and remembered layout absence.
    pub fn clear(&self) -> MetamodelResult<()> {
        self.loader.clear()
    }
}

/// Assembles a [`MetamodelContext`].
///
/// The class source and persistence filter are required. Registering any
/// component twice is a configuration error reported by [`build`].
///
/// [`build`]: MetamodelContextBuilder::build
#[derive(Default)]
pub struct MetamodelContextBuilder {
    source: Option<Arc<dyn ClassSource>>,
    layouts: Option<Arc<dyn LayoutResourceProvider>>,
    filter: Option<Arc<dyn PersistenceFilter>>,
    model: Option<ProgrammingModel>,
    validators: Option<Vec<Box<dyn MetamodelValidator>>>,
    duplicate: Option<&'static str>,
}

impl MetamodelContextBuilder {
    fn register<T>(slot: &mut Option<T>, duplicate: &mut Option<&'static str>, name: &'static str, value: T) {
        if slot.is_some() {
            duplicate.get_or_insert(name);
        } else {
            *slot = Some(value);
        }
    }

    pub fn class_source(mut self, source: Arc<dyn ClassSource>) -> Self {
        Self::register(&mut self.source, &mut self.duplicate, "class source", source);
        self
    }

    pub fn layout_provider(mut self, provider: Arc<dyn LayoutResourceProvider>) -> Self {
        Self::register(&mut self.layouts, &mut self.duplicate, "layout provider", provider);
        self
    }

    pub fn persistence_filter(mut self, filter: Arc<dyn PersistenceFilter>) -> Self {
        Self::register(&mut self.filter, &mut self.duplicate, "persistence filter", filter);
        self
    }

    pub fn programming_model(mut self, model: ProgrammingModel) -> Self {
        Self::register(&mut self.model, &mut self.duplicate, "programming model", model);
        self
    }

    pub fn validators(mut self, validators: Vec<Box<dyn MetamodelValidator>>) -> Self {
        Self::register(&mut self.validators, &mut self.duplicate, "validators", validators);
        self
    }

    pub fn build(self) -> MetamodelResult<MetamodelContext> {
        if let Some(name) = self.duplicate {
            return Err(ApplicationError::DuplicateRegistration { name }.into());
        }
        let source = self.source.ok_or(ApplicationError::AdapterNotConfigured {
            name: "class source",
        })?;
        let filter = self.filter.ok_or(ApplicationError::AdapterNotConfigured {
            name: "persistence filter",
        })?;
        let layouts = self.layouts.unwrap_or_else(|| {
            debug!("no layout provider registered, using generated layouts only");
            Arc::new(NoLayoutResources)
        });
        let model = self.model.unwrap_or_else(ProgrammingModel::default_model);
        let validators = self.validators.unwrap_or_else(|| default_validators(false));

        info!(
            factories = model.len(),
            validators = validators.len(),
            "metamodel context ready"
        );

        Ok(MetamodelContext {
            loader: SpecificationLoader::new(
                Arc::clone(&source),
                filter,
                Arc::new(model),
                LayoutOverlay::new(layouts),
            ),
            source,
            validators,
        })
    }
}
