//! Layout overlay: load, derive and overwrite a type's layout.
//!
//! A type without a layout resource is remembered in a blacklist so the
//! provider is asked only once. A resource that exists but cannot be parsed
//! is logged and skipped, and is retried on the next build.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tracing::{debug, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::LayoutResourceProvider;
use crate::domain::facet::{Facet, FacetKind};
use crate::domain::layout::{self, DomainObjectLayout};
use crate::domain::{StagedSpecification, TypeName, ValidationFinding};
use crate::error::MetamodelResult;

const ORIGIN: &str = "layout";

/// Provider used when no layout resources are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayoutResources;

impl LayoutResourceProvider for NoLayoutResources {
    fn load(&self, _type_name: &TypeName) -> MetamodelResult<Option<String>> {
        Ok(None)
    }
}

pub struct LayoutOverlay {
    provider: Arc<dyn LayoutResourceProvider>,
    blacklist: RwLock<HashSet<TypeName>>,
}

impl LayoutOverlay {
    pub fn new(provider: Arc<dyn LayoutResourceProvider>) -> Self {
        Self {
            provider,
            blacklist: RwLock::new(HashSet::new()),
        }
    }

    pub fn is_blacklisted(&self, type_name: &TypeName) -> MetamodelResult<bool> {
        let blacklist = self
            .blacklist
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "layout blacklist",
            })?;
        Ok(blacklist.contains(type_name))
    }

    /// Forget every remembered absence.
    pub fn clear(&self) -> MetamodelResult<()> {
        self.blacklist
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "layout blacklist",
            })?
            .clear();
        Ok(())
    }

    /// The authored layout, an empty one when none exists, or `None` when
    /// the resource is unusable this time.
    fn authored(
        &self,
        type_name: &TypeName,
        findings: &mut Vec<ValidationFinding>,
    ) -> MetamodelResult<Option<DomainObjectLayout>> {
        if self.is_blacklisted(type_name)? {
            return Ok(Some(DomainObjectLayout::default()));
        }

        let json = match self.provider.load(type_name) {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!(%type_name, "no layout resource, blacklisting");
                self.blacklist
                    .write()
                    .map_err(|_| ApplicationError::LockPoisoned {
                        resource: "layout blacklist",
                    })?
                    .insert(type_name.clone());
                return Ok(Some(DomainObjectLayout::default()));
            }
            Err(e) => {
                warn!(%type_name, error = %e, "layout resource could not be read");
                findings.push(ValidationFinding::warning(type_name, ORIGIN, e.to_string()));
                return Ok(None);
            }
        };

        match DomainObjectLayout::from_json(type_name.as_str(), &json) {
            Ok(layout) => Ok(Some(layout)),
            Err(e) => {
                warn!(%type_name, error = %e, "failed to parse layout, continuing without one");
                findings.push(ValidationFinding::warning(type_name, ORIGIN, e.to_string()));
                Ok(None)
            }
        }
    }

    /// Derive and overwrite the layout of `staged`, publishing it as the
    /// class-level `Layout` facet.
    #[instrument(skip_all, fields(type_name = %staged.type_name))]
    pub fn apply(
        &self,
        staged: &mut StagedSpecification,
        findings: &mut Vec<ValidationFinding>,
    ) -> MetamodelResult<()> {
        let type_name = staged.type_name.clone();
        let Some(mut layout) = self.authored(&type_name, findings)? else {
            return Ok(());
        };

        staged.sort_members();
        let report = layout::derive(&mut layout, &staged.layout_catalog());
        for id in &report.duplicates {
            findings.push(ValidationFinding::warning(
                &type_name,
                ORIGIN,
                format!("'{id}' is referenced more than once; later references removed"),
            ));
        }
        for id in &report.misplaced {
            findings.push(ValidationFinding::warning(
                &type_name,
                ORIGIN,
                format!("'{id}' is laid out as the wrong kind of member; node replaced"),
            ));
        }
        if report.changed() {
            debug!(
                properties = report.added_properties.len(),
                collections = report.added_collections.len(),
                actions = report.added_actions.len(),
                general_group = report.created_general_group,
                "layout derived"
            );
        }

        let orphans = layout::overwrite(&mut layout, staged);
        for id in &orphans {
            warn!(%type_name, node = %id, "layout node matches no member");
            findings.push(ValidationFinding::warning(
                &type_name,
                ORIGIN,
                format!("layout node '{id}' matches no member"),
            ));
        }

        staged.holder.add_facet(Facet::new(FacetKind::Layout {
            layout: Arc::new(layout),
            orphans,
        }));
        Ok(())
    }
}
