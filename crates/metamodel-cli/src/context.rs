//! Wires the adapters named by [`AppConfig`] into a metamodel service.

use std::sync::Arc;

use tracing::{debug, instrument};

use metamodel_adapters::{DirectoryClassSource, FsLayoutProvider, from_mechanism};
use metamodel_core::{
    application::{MetamodelContext, MetamodelService, services::default_validators},
    domain::ProgrammingModel,
};

use crate::{config::AppConfig, error::CliResult};

/// Build the service every metamodel command runs against.
///
/// The persistence filter is resolved first so an unknown mechanism fails
/// before any manifest is read.
#[instrument(skip_all)]
pub fn open_service(config: &AppConfig) -> CliResult<MetamodelService> {
    let persistence = &config.persistence;
    let filter = from_mechanism(
        &persistence.mechanism,
        &persistence.synthetic_member_prefixes,
        &persistence.proxy_class_suffixes,
    )?;

    let classes = DirectoryClassSource::open(&config.sources.classes_dir)?;
    for skipped in classes.skipped() {
        debug!(file = %skipped.display(), "manifest skipped");
    }

    let context = MetamodelContext::builder()
        .class_source(Arc::new(classes))
        .layout_provider(Arc::new(FsLayoutProvider::new(&config.sources.layouts_dir)))
        .persistence_filter(filter)
        .programming_model(ProgrammingModel::default_model())
        .validators(default_validators(config.validation.explicit_object_type))
        .build()?;

    Ok(MetamodelService::new(Arc::new(context)))
}
