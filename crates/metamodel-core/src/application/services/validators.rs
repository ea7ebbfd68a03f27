//! Validators that run across every published specification.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::facet::FacetType;
use crate::domain::specification::FacetedElement;
use crate::domain::{ObjectKind, ObjectSpecification, ValidationFinding, ValidationReport};

/// A check over the whole metamodel, run after every class is loaded.
pub trait MetamodelValidator: Send + Sync {
    fn id(&self) -> &'static str;

    fn validate(&self, specs: &[Arc<ObjectSpecification>], report: &mut ValidationReport);
}

/// Two types must not share a logical type name.
#[derive(Debug, Default)]
pub struct UniqueObjectSpecIdValidator;

impl MetamodelValidator for UniqueObjectSpecIdValidator {
    fn id(&self) -> &'static str {
        "unique-object-spec-id"
    }

    fn validate(&self, specs: &[Arc<ObjectSpecification>], report: &mut ValidationReport) {
        let mut by_id: BTreeMap<&str, Vec<&ObjectSpecification>> = BTreeMap::new();
        for spec in specs.iter().filter(|s| !s.is_builtin()) {
            by_id.entry(spec.spec_id()).or_default().push(spec);
        }

        for (id, owners) in by_id.into_iter().filter(|(_, o)| o.len() > 1) {
            let names: Vec<_> = owners.iter().map(|s| s.type_name().to_string()).collect();
            for spec in owners {
                report.push(ValidationFinding::error(
                    spec.type_name(),
                    self.id(),
                    format!("object type '{id}' is shared by {}", names.join(", ")),
                ));
            }
        }
    }
}

/// Entities must name their logical type rather than rely on the class name.
#[derive(Debug, Default)]
pub struct ExplicitObjectTypeValidator;

impl MetamodelValidator for ExplicitObjectTypeValidator {
    fn id(&self) -> &'static str {
        "explicit-object-type"
    }

    fn validate(&self, specs: &[Arc<ObjectSpecification>], report: &mut ValidationReport) {
        for spec in specs {
            if spec.kind() != ObjectKind::Entity || spec.is_abstract() {
                continue;
            }
            let explicit = spec
                .facet(FacetType::ObjectSpecId)
                .is_some_and(|f| !f.is_fallback());
            if !explicit {
                report.push(ValidationFinding::error(
                    spec.type_name(),
                    self.id(),
                    "entity does not declare an explicit object_type",
                ));
            }
        }
    }
}

/// The validators enabled by configuration.
pub fn default_validators(explicit_object_type: bool) -> Vec<Box<dyn MetamodelValidator>> {
    let mut validators: Vec<Box<dyn MetamodelValidator>> =
        vec![Box::new(UniqueObjectSpecIdValidator)];
    if explicit_object_type {
        validators.push(Box::new(ExplicitObjectTypeValidator));
    }
    validators
}
