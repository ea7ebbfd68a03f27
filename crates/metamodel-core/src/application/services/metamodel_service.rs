//! Metamodel service - use cases over a [`MetamodelContext`].
//!
//! Exposes the loaded metamodel as plain serialisable DTOs so drivers (the
//! CLI, tests) never hold on to domain internals.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::services::context::MetamodelContext;
use crate::domain::facet::Facet;
use crate::domain::specification::{ActionParameter, FacetedElement, hidden_where};
use crate::domain::{
    FacetHolder, ObjectSpecification, TypeName, ValidationFinding, ValidationReport,
};
use crate::error::{ErrorCategory, MetamodelError, MetamodelResult};

const ORIGIN: &str = "loader";

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecificationSummary {
    pub type_name: String,
    pub spec_id: String,
    pub title: String,
    pub kind: String,
    pub properties: usize,
    pub collections: usize,
    pub actions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetInfo {
    pub facet_type: String,
    pub value: String,
    pub precedence: String,
    pub derived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_ref: String,
    pub facets: Vec<FacetInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub id: String,
    pub name: String,
    pub feature: String,
    pub type_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<String>,
    pub facets: Vec<FacetInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterInfo>,
}

/// Full description of one specification, as `inspect` shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecificationInfo {
    pub type_name: String,
    pub spec_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub is_abstract: bool,
    pub facets: Vec<FacetInfo>,
    pub members: Vec<MemberInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layout_orphans: Vec<String>,
}

impl From<&Facet> for FacetInfo {
    fn from(facet: &Facet) -> Self {
        Self {
            facet_type: facet.facet_type().to_string(),
            value: facet.kind().describe(),
            precedence: facet.precedence().as_str().to_string(),
            derived: facet.is_derived(),
        }
    }
}

fn facet_infos(holder: &FacetHolder) -> Vec<FacetInfo> {
    let mut facets: Vec<FacetInfo> = holder.facets().map(FacetInfo::from).collect();
    facets.sort_by(|a, b| a.facet_type.cmp(&b.facet_type));
    facets
}

impl From<&ActionParameter> for ParameterInfo {
    fn from(parameter: &ActionParameter) -> Self {
        Self {
            name: parameter.name().to_string(),
            type_ref: parameter.type_ref().to_string(),
            facets: facet_infos(parameter.holder()),
        }
    }
}

impl From<&ObjectSpecification> for SpecificationSummary {
    fn from(spec: &ObjectSpecification) -> Self {
        Self {
            type_name: spec.type_name().to_string(),
            spec_id: spec.spec_id().to_string(),
            title: spec.title_name(),
            kind: spec.kind().to_string(),
            properties: spec.properties().count(),
            collections: spec.collections().count(),
            actions: spec.object_actions(Default::default()).count(),
        }
    }
}

impl From<&ObjectSpecification> for SpecificationInfo {
    fn from(spec: &ObjectSpecification) -> Self {
        let associations = spec.associations(Default::default()).map(|a| MemberInfo {
            id: a.id().to_string(),
            name: a.name(),
            feature: a.feature_type().as_str().to_string(),
            type_ref: a.type_ref().to_string(),
            hidden: hidden_where(a).map(|w| w.to_string()),
            facets: facet_infos(a.holder()),
            parameters: Vec::new(),
        });
        let actions = spec.object_actions(Default::default()).map(|a| MemberInfo {
            id: a.id().to_string(),
            name: a.name(),
            feature: "action".to_string(),
            type_ref: a.return_type().to_string(),
            hidden: hidden_where(a).map(|w| w.to_string()),
            facets: facet_infos(a.holder()),
            parameters: a.parameters().iter().map(ParameterInfo::from).collect(),
        });

        Self {
            type_name: spec.type_name().to_string(),
            spec_id: spec.spec_id().to_string(),
            title: spec.title_name(),
            plural: spec.plural_name().map(str::to_string),
            kind: spec.kind().to_string(),
            superclass: spec.superclass().map(|s| s.type_name().to_string()),
            interfaces: spec.interfaces().iter().map(|t| t.to_string()).collect(),
            is_abstract: spec.is_abstract(),
            facets: facet_infos(spec.holder()),
            members: associations.chain(actions).collect(),
            layout_orphans: spec.layout_orphans().to_vec(),
        }
    }
}

/// Use cases over a metamodel context.
pub struct MetamodelService {
    context: Arc<MetamodelContext>,
}

impl MetamodelService {
    pub fn new(context: Arc<MetamodelContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &MetamodelContext {
        &self.context
    }

    pub fn specification(&self, type_name: &str) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.context
            .loader()
            .load_specification(&TypeName::new(type_name.trim()))
    }

    #[instrument(skip(self))]
    pub fn describe(&self, type_name: &str) -> MetamodelResult<SpecificationInfo> {
        let spec = self.specification(type_name)?;
        Ok(SpecificationInfo::from(spec.as_ref()))
    }

    /// The derived layout of `type_name` as pretty JSON; `None` when the
    /// type has no layout facet (its layout resource failed to parse).
    #[instrument(skip(self))]
    pub fn layout_json(&self, type_name: &str) -> MetamodelResult<Option<String>> {
        let spec = self.specification(type_name)?;
        match spec.layout() {
            Some(layout) => Ok(Some(layout.to_json_pretty()?)),
            None => Ok(None),
        }
    }

    /// Load every type the class source knows.
    ///
    /// Types that fail for a reason local to their description (missing
    /// superclass, inheritance cycle) are recorded in `report`; anything
    /// else aborts.
    fn load_each(&self, report: &mut ValidationReport) -> MetamodelResult<()> {
        let names = self.context.class_source().type_names()?;
        debug!(count = names.len(), "loading every known type");

        for name in &names {
            match self.context.loader().load_specification(name) {
                Ok(_) => {}
                Err(MetamodelError::Application(e))
                    if matches!(e.category(), ErrorCategory::NotFound | ErrorCategory::Validation) =>
                {
                    if matches!(e, ApplicationError::IgnoredType { .. }) {
                        debug!(%name, "skipping ignored type");
                        continue;
                    }
                    warn!(%name, error = %e, "type could not be loaded");
                    report.push(ValidationFinding::error(name, ORIGIN, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Load every known type and list the published specifications.
    #[instrument(skip(self))]
    pub fn list(&self) -> MetamodelResult<Vec<SpecificationSummary>> {
        let mut ignored = ValidationReport::new();
        self.load_each(&mut ignored)?;
        Ok(self
            .context
            .loader()
            .all_specifications()?
            .iter()
            .filter(|s| !s.is_builtin())
            .map(|s| SpecificationSummary::from(s.as_ref()))
            .collect())
    }

    /// Load every known type, run the metamodel validators and return the
    /// combined report, sorted.
    #[instrument(skip(self))]
    pub fn validate(&self) -> MetamodelResult<ValidationReport> {
        let mut report = ValidationReport::new();
        self.load_each(&mut report)?;
        report.extend(self.context.loader().report()?);

        let specs = self.context.loader().all_specifications()?;
        for validator in self.context.validators() {
            debug!(validator = validator.id(), "running validator");
            validator.validate(&specs, &mut report);
        }
        report.sort();

        info!(
            types = specs.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "metamodel validated"
        );
        Ok(report)
    }
}
