//! Visibility and usability: `hidden`/`disabled` attributes and the
//! `hide_<member>`/`disable_<member>` support methods.

use super::{ClassContext, FacetFactory, FactoryContext, MemberContext};
use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::naming::SupportPrefix;
use crate::domain::value_objects::{FeatureTypes, Where};

/// `hidden = true` or `hidden = "all-tables"`.
pub struct HiddenAttributeFactory;

fn hidden_attribute<C: FactoryContext>(ctx: &mut C) {
    let Some(at) = ctx.marker_attribute("hidden") else {
        return;
    };
    let at = match at {
        None => Where::Everywhere,
        Some(text) => match ctx.recover(text.parse::<Where>().map(Some)) {
            Some(at) => at,
            None => return,
        },
    };
    if at == Where::Nowhere {
        return;
    }
    ctx.holder_mut().add_facet(Facet::new(FacetKind::Hidden { at }));
}

impl FacetFactory for HiddenAttributeFactory {
    fn id(&self) -> &'static str {
        "hidden"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT | FeatureTypes::MEMBERS
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        hidden_attribute(ctx);
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        hidden_attribute(ctx);
    }
}

/// `hide_<member>() -> bool`
pub struct HiddenViaMethodFactory;

impl FacetFactory for HiddenViaMethodFactory {
    fn id(&self) -> &'static str {
        "hidden-via-method"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let name = format!("{}{}", SupportPrefix::Hide.as_str(), ctx.member.name);
        let Some(method) = ctx.method(&name) else {
            return;
        };
        if !method.params.is_empty() || method.type_ref.element_type().as_str() != "bool" {
            ctx.error(format!(
                "{name} must take no parameters and return bool (found {} parameter(s) returning {})",
                method.params.len(),
                method.type_ref
            ));
            return;
        }
        ctx.holder
            .add_facet(Facet::new(FacetKind::HiddenViaMethod { method: name }));
    }
}

/// `disabled = true` or `disabled = "reason"`, optional `disabled_where`.
pub struct DisabledAttributeFactory;

impl FacetFactory for DisabledAttributeFactory {
    fn id(&self) -> &'static str {
        "disabled"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let Some(reason) = ctx.marker_attribute("disabled") else {
            return;
        };
        let at = ctx
            .parsed_attribute::<Where>("disabled_where")
            .unwrap_or(Where::Everywhere);
        ctx.holder
            .add_facet(Facet::new(FacetKind::Disabled { reason, at }));
    }
}

/// `disable_<member>() -> string`; properties of immutable classes are
/// disabled as well.
pub struct DisabledViaMethodFactory;

impl FacetFactory for DisabledViaMethodFactory {
    fn id(&self) -> &'static str {
        "disabled-via-method"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let name = format!("{}{}", SupportPrefix::Disable.as_str(), ctx.member.name);
        if let Some(method) = ctx.method(&name) {
            if method.params.is_empty() && method.type_ref.element_type().as_str() == "string" {
                ctx.holder
                    .add_facet(Facet::new(FacetKind::DisabledViaMethod { method: name }));
            } else {
                ctx.error(format!(
                    "{name} must take no parameters and return string (the disabled reason)"
                ));
            }
        }

        if ctx.feature_type.is_association() {
            let reason = match ctx.class_facets.facet(FacetType::Immutable).map(Facet::kind) {
                Some(FacetKind::Immutable { reason }) => {
                    Some(reason.clone().unwrap_or_else(|| "immutable".into()))
                }
                _ => None,
            };
            if let Some(reason) = reason {
                ctx.holder.add_facet(Facet::derived_from(
                    FacetKind::Disabled {
                        reason: Some(reason),
                        at: Where::Everywhere,
                    },
                    FacetType::Immutable,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet_holder::FacetHolder;
    use crate::domain::raw::{RawClass, RawMember, TypeRef};
    use crate::domain::validation::ValidationFinding;

    fn run_member(
        class: &RawClass,
        member: &str,
        class_facets: &FacetHolder,
        factory: &dyn FacetFactory,
    ) -> (FacetHolder, Vec<ValidationFinding>) {
        let member = class.member(member).unwrap();
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let mut ctx = MemberContext::new(
            class,
            member,
            member.feature_type(),
            class_facets,
            &mut holder,
            &mut findings,
        );
        factory.process_member(&mut ctx);
        (holder, findings)
    }

    #[test]
    fn hidden_attribute_where() {
        let class = RawClass::new("Customer")
            .with_member(RawMember::field("notes", TypeRef::scalar("string")).with_attribute("hidden", "all_tables"))
            .with_member(RawMember::field("secret", TypeRef::scalar("string")).with_attribute("hidden", true));
        let empty = FacetHolder::new();

        let (notes, _) = run_member(&class, "notes", &empty, &HiddenAttributeFactory);
        assert_eq!(
            notes.facet(FacetType::Hidden).unwrap().kind(),
            &FacetKind::Hidden { at: Where::AllTables }
        );
        let (secret, _) = run_member(&class, "secret", &empty, &HiddenAttributeFactory);
        assert_eq!(
            secret.facet(FacetType::Hidden).unwrap().kind(),
            &FacetKind::Hidden { at: Where::Everywhere }
        );
    }

    #[test]
    fn hide_method_with_wrong_signature_is_reported() {
        let class = RawClass::new("Customer")
            .with_member(RawMember::field("name", TypeRef::scalar("string")))
            .with_member(RawMember::method("hide_name", TypeRef::scalar("string")));
        let (holder, findings) =
            run_member(&class, "name", &FacetHolder::new(), &HiddenViaMethodFactory);
        assert!(!holder.contains_facet(FacetType::HiddenViaMethod));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("hide_name"));
    }

    #[test]
    fn hide_method_installs_facet() {
        let class = RawClass::new("Customer")
            .with_member(RawMember::field("name", TypeRef::scalar("string")))
            .with_member(RawMember::method("hide_name", TypeRef::scalar("bool")));
        let (holder, findings) =
            run_member(&class, "name", &FacetHolder::new(), &HiddenViaMethodFactory);
        assert!(findings.is_empty());
        assert_eq!(
            holder.facet(FacetType::HiddenViaMethod).and_then(Facet::text),
            Some("hide_name")
        );
    }

    #[test]
    fn immutable_class_disables_properties() {
        let class = RawClass::new("Rate")
            .with_member(RawMember::field("amount", TypeRef::scalar("decimal")))
            .with_member(RawMember::method("recalculate", TypeRef::void()));
        let mut class_facets = FacetHolder::new();
        class_facets.add_facet(Facet::new(FacetKind::Immutable { reason: None }));

        let (amount, _) = run_member(&class, "amount", &class_facets, &DisabledViaMethodFactory);
        assert!(amount.facet(FacetType::Disabled).unwrap().is_derived());

        let (action, _) = run_member(&class, "recalculate", &class_facets, &DisabledViaMethodFactory);
        assert!(!action.contains_facet(FacetType::Disabled));
    }
}
