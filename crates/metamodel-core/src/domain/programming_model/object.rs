//! Class-level factories: identity, value semantics, persistence and nature.

use std::str::FromStr;

use super::{ClassContext, FacetFactory, FactoryContext};
use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::value_objects::{FeatureTypes, IdentityType, ServiceNature};

/// Every class gets its raw name as logical type name until told otherwise.
pub struct ObjectSpecIdFallbackFactory;

impl FacetFactory for ObjectSpecIdFallbackFactory {
    fn id(&self) -> &'static str {
        "object-spec-id-fallback"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        ctx.holder.add_facet(Facet::fallback(FacetKind::ObjectSpecId {
            logical_type: ctx.class.name.to_string(),
        }));
    }
}

/// `object_type = "crm.Customer"`
pub struct ObjectSpecIdAttributeFactory;

impl FacetFactory for ObjectSpecIdAttributeFactory {
    fn id(&self) -> &'static str {
        "object-spec-id"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        let class = ctx.class;
        let attributes = &class.attributes;
        let Some(logical) = ctx.recover(attributes.text("object_type")) else {
            return;
        };
        if logical.trim().is_empty() {
            ctx.error("object_type must not be blank");
            return;
        }
        ctx.holder.add_facet(Facet::new(FacetKind::ObjectSpecId {
            logical_type: logical.trim().to_string(),
        }));
    }
}

/// `value = true` or `value = "money"`. Value facets are protected.
pub struct ValueFactory;

impl FacetFactory for ValueFactory {
    fn id(&self) -> &'static str {
        "value"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        let class = ctx.class;
        let attributes = &class.attributes;
        if let Some(semantics) = ctx.recover(attributes.marker("value")) {
            let semantics = semantics
                .map(str::to_string)
                .unwrap_or_else(|| ctx.class.name.simple_name().to_lowercase());
            ctx.holder.add_facet(Facet::new(FacetKind::Value { semantics }));
        }
    }
}

/// `persistable = true` or `persistable = "application"`.
pub struct PersistableFactory;

impl FacetFactory for PersistableFactory {
    fn id(&self) -> &'static str {
        "persistable"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        let class = ctx.class;
        let attributes = &class.attributes;
        let Some(identity) = ctx.recover(attributes.marker("persistable")) else {
            return;
        };
        let identity = match identity {
            None => IdentityType::Unspecified,
            Some(text) => match ctx.recover(IdentityType::from_str(text).map(Some)) {
                Some(identity) => identity,
                None => return,
            },
        };
        ctx.holder
            .add_facet(Facet::new(FacetKind::Persistable { identity }));
    }
}

/// `view_model = true`
pub struct ViewModelFactory;

impl FacetFactory for ViewModelFactory {
    fn id(&self) -> &'static str {
        "view-model"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        match ctx.class.attributes.flag("view_model") {
            Ok(true) => {
                if ctx.holder.contains_facet(FacetType::Persistable) {
                    ctx.warn("a view model should not also be persistable");
                }
                ctx.holder.add_facet(Facet::new(FacetKind::ViewModel));
            }
            Ok(false) => {}
            Err(e) => ctx.error(e.to_string()),
        }
    }
}

/// `domain_service = true` or `domain_service = "menu"`.
pub struct DomainServiceFactory;

impl FacetFactory for DomainServiceFactory {
    fn id(&self) -> &'static str {
        "domain-service"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        let class = ctx.class;
        let attributes = &class.attributes;
        let Some(nature) = ctx.recover(attributes.marker("domain_service")) else {
            return;
        };
        let nature = match nature {
            None => ServiceNature::Domain,
            Some(text) => match ctx.recover(ServiceNature::from_str(text).map(Some)) {
                Some(nature) => nature,
                None => return,
            },
        };
        ctx.holder
            .add_facet(Facet::new(FacetKind::DomainService { nature }));
    }
}

/// `immutable = true` or `immutable = "reason"`. Value types are immutable.
pub struct ImmutableFactory;

impl FacetFactory for ImmutableFactory {
    fn id(&self) -> &'static str {
        "immutable"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        let class = ctx.class;
        let attributes = &class.attributes;
        if let Some(reason) = ctx.recover(attributes.marker("immutable")) {
            ctx.holder.add_facet(Facet::new(FacetKind::Immutable {
                reason: reason.map(str::to_string),
            }));
        } else if ctx.holder.contains_facet(FacetType::Value) {
            ctx.holder.add_facet(Facet::derived_from(
                FacetKind::Immutable {
                    reason: Some("value types are immutable".into()),
                },
                FacetType::Value,
            ));
        }
    }
}
