//! Support methods that contribute choices, defaults, validation and
//! auto-complete to the member (or parameter) they name.
//!
//! | method                     | applies to | signature                    |
//! |----------------------------|------------|------------------------------|
//! | `choices_<prop>`           | property   | `() -> collection`           |
//! | `default_<prop>`           | property   | `() -> any`                  |
//! | `validate_<prop>`          | property   | `(value) -> string`          |
//! | `autocomplete_<prop>`      | property   | `(search) -> collection`     |
//! | `validate_<action>`        | action     | action's params `-> string`  |
//! | `choices_<n>_<action>`     | parameter  | `() -> collection`           |
//! | `default_<n>_<action>`     | parameter  | `() -> any`                  |

use super::{FacetFactory, FactoryContext, MemberContext, ParameterContext};
use crate::domain::facet::{Facet, FacetKind};
use crate::domain::naming::SupportPrefix;
use crate::domain::raw::{MemberKind, RawMember};
use crate::domain::value_objects::{FeatureType, FeatureTypes};

pub struct SupportMethodsFactory;

/// Expected shape of a support method.
struct Signature {
    params: usize,
    returns: Returns,
}

#[derive(Clone, Copy)]
enum Returns {
    Anything,
    Collection,
    Text,
}

impl Signature {
    const fn new(params: usize, returns: Returns) -> Self {
        Self { params, returns }
    }

    fn mismatch(&self, method: &RawMember) -> Option<String> {
        if method.params.len() != self.params {
            return Some(format!(
                "{} must take {} parameter(s), found {}",
                method.name,
                self.params,
                method.params.len()
            ));
        }
        let ok = match self.returns {
            Returns::Anything => !method.type_ref.is_void(),
            Returns::Collection => method.type_ref.is_collection(),
            Returns::Text => method.type_ref.element_type().as_str() == "string",
        };
        if ok {
            return None;
        }
        let expected = match self.returns {
            Returns::Anything => "a value",
            Returns::Collection => "a collection",
            Returns::Text => "string",
        };
        Some(format!(
            "{} must return {expected}, found {}",
            method.name, method.type_ref
        ))
    }
}

fn facet_for(prefix: SupportPrefix, method: String) -> Option<FacetKind> {
    match prefix {
        SupportPrefix::Choices => Some(FacetKind::Choices { method }),
        SupportPrefix::Default => Some(FacetKind::Default { method }),
        SupportPrefix::Validate => Some(FacetKind::Validate { method }),
        SupportPrefix::AutoComplete => Some(FacetKind::AutoComplete { method }),
        SupportPrefix::Hide | SupportPrefix::Disable => None,
    }
}

/// Install the facet for `method` if it exists and has the expected shape.
fn install<C: FactoryContext>(
    ctx: &mut C,
    method: Option<&RawMember>,
    prefix: SupportPrefix,
    signature: Signature,
) {
    let Some(method) = method else {
        return;
    };
    if let Some(problem) = signature.mismatch(method) {
        ctx.error(problem);
        return;
    }
    if let Some(kind) = facet_for(prefix, method.name.clone()) {
        ctx.holder_mut().add_facet(Facet::new(kind));
    }
}

impl FacetFactory for SupportMethodsFactory {
    fn id(&self) -> &'static str {
        "support-methods"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES | FeatureTypes::ACTIONS | FeatureTypes::PARAMETERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let member = ctx.member.name.clone();
        let lookup = |prefix: SupportPrefix| ctx.method(&format!("{}{member}", prefix.as_str()));

        match ctx.feature_type {
            FeatureType::Property => {
                let choices = lookup(SupportPrefix::Choices);
                let default = lookup(SupportPrefix::Default);
                let validate = lookup(SupportPrefix::Validate);
                let autocomplete = lookup(SupportPrefix::AutoComplete);
                install(ctx, choices, SupportPrefix::Choices, Signature::new(0, Returns::Collection));
                install(ctx, default, SupportPrefix::Default, Signature::new(0, Returns::Anything));
                install(ctx, validate, SupportPrefix::Validate, Signature::new(1, Returns::Text));
                install(
                    ctx,
                    autocomplete,
                    SupportPrefix::AutoComplete,
                    Signature::new(1, Returns::Collection),
                );
            }
            FeatureType::Action => {
                let validate = lookup(SupportPrefix::Validate);
                let arity = ctx.member.params.len();
                install(ctx, validate, SupportPrefix::Validate, Signature::new(arity, Returns::Text));
            }
            _ => {}
        }
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) {
        let class = ctx.class;
        let lookup = |prefix: SupportPrefix| {
            let name = format!("{}{}_{}", prefix.as_str(), ctx.index, ctx.action.name);
            class
                .members
                .iter()
                .find(|m| m.kind == MemberKind::Method && m.name == name)
        };
        let choices = lookup(SupportPrefix::Choices);
        let default = lookup(SupportPrefix::Default);
        install(ctx, choices, SupportPrefix::Choices, Signature::new(0, Returns::Collection));
        install(ctx, default, SupportPrefix::Default, Signature::new(0, Returns::Anything));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet::FacetType;
    use crate::domain::facet_holder::FacetHolder;
    use crate::domain::raw::{RawClass, RawParam, TypeRef};
    use crate::domain::validation::ValidationFinding;

    fn order() -> RawClass {
        RawClass::new("Order")
            .with_member(RawMember::field("status", TypeRef::scalar("string")))
            .with_member(RawMember::method("choices_status", "list<string>".parse().unwrap()))
            .with_member(
                RawMember::method("validate_status", TypeRef::scalar("string"))
                    .with_param(RawParam::new("value", TypeRef::scalar("string"))),
            )
            .with_member(RawMember::method("default_status", TypeRef::void()))
            .with_member(
                RawMember::method("ship", TypeRef::void())
                    .with_param(RawParam::new("carrier", TypeRef::scalar("string"))),
            )
            .with_member(RawMember::method("choices_0_ship", "list<string>".parse().unwrap()))
    }

    fn process_member(class: &RawClass, name: &str) -> (FacetHolder, Vec<ValidationFinding>) {
        let member = class.member(name).unwrap();
        let class_facets = FacetHolder::new();
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let mut ctx = MemberContext::new(
            class,
            member,
            member.feature_type(),
            &class_facets,
            &mut holder,
            &mut findings,
        );
        SupportMethodsFactory.process_member(&mut ctx);
        (holder, findings)
    }

    #[test]
    fn property_support_methods_install_facets() {
        let class = order();
        let (holder, findings) = process_member(&class, "status");
        assert_eq!(
            holder.facet(FacetType::Choices).and_then(|f| f.text()),
            Some("choices_status")
        );
        assert!(holder.contains_facet(FacetType::Validate));
        // default_status returns nothing
        assert!(!holder.contains_facet(FacetType::Default));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("default_status"));
    }

    #[test]
    fn parameter_choices_by_index() {
        let class = order();
        let action = class.member("ship").unwrap();
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let mut ctx = ParameterContext::new(&class, action, 0, &mut holder, &mut findings).unwrap();
        SupportMethodsFactory.process_parameter(&mut ctx);
        assert_eq!(
            holder.facet(FacetType::Choices).and_then(|f| f.text()),
            Some("choices_0_ship")
        );
        assert!(findings.is_empty());
    }
}
