//! Turns a raw class into a staged specification.
//!
//! 1. Flatten the superclass chain into one effective member list
//! 2. Run the class-level factories
//! 3. Classify members, setting support methods aside
//! 4. Run the member and parameter factories

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::naming::SupportMethod;
use crate::domain::programming_model::{ClassContext, MemberContext, ParameterContext};
use crate::domain::specification::{ActionParameter, ObjectAction, ObjectAssociation};
use crate::domain::{
    FeatureType, MemberKind, ProgrammingModel, RawClass, RawMember, StagedSpecification,
    TypeName, ValidationFinding,
};

use crate::application::ports::PersistenceFilter;

/// Types the loader knows without a class description.
pub const BUILTIN_VALUE_TYPES: [&str; 9] = [
    "string", "bool", "int", "long", "decimal", "date", "datetime", "uuid", "void",
];

pub fn is_builtin(type_name: &TypeName) -> bool {
    BUILTIN_VALUE_TYPES.contains(&type_name.as_str())
}

/// Origin recorded on findings raised here rather than by a factory.
const ORIGIN: &str = "introspector";

/// The effective class: `class` with members inherited from `ancestors`
/// (nearest first). A member redeclared lower in the chain replaces the
/// inherited one at the inherited position.
pub fn flatten(class: &RawClass, ancestors: &[RawClass]) -> RawClass {
    let mut members = Vec::new();
    for level in ancestors.iter().rev().chain(std::iter::once(class)) {
        for member in &level.members {
            match members.iter().position(|m: &RawMember| m.name == member.name) {
                Some(index) => members[index] = member.clone(),
                None => members.push(member.clone()),
            }
        }
    }
    RawClass {
        members,
        ..class.clone()
    }
}

/// Staged form of a built-in value type.
pub fn builtin_specification(type_name: &TypeName) -> StagedSpecification {
    let mut staged = StagedSpecification::new(type_name.clone());
    staged.builtin = true;
    staged.holder.add_facet(Facet::fallback(FacetKind::ObjectSpecId {
        logical_type: type_name.to_string(),
    }));
    staged.holder.add_facet(Facet::new(FacetKind::Value {
        semantics: type_name.to_string(),
    }));
    staged.holder.add_facet(Facet::derived_from(
        FacetKind::Immutable { reason: None },
        FacetType::Value,
    ));
    staged.holder.add_facet(Facet::new(FacetKind::Named {
        text: type_name.to_string(),
    }));
    staged
}

/// Run `model` over the effective class.
#[instrument(skip_all, fields(type_name = %class.name))]
pub fn introspect(
    model: &ProgrammingModel,
    filter: &dyn PersistenceFilter,
    class: &RawClass,
) -> (StagedSpecification, Vec<ValidationFinding>) {
    let mut findings = Vec::new();
    let mut staged = StagedSpecification::new(class.name.clone());
    staged.is_abstract = class.is_abstract;
    staged.interfaces = class.interfaces.clone();

    {
        let mut ctx = ClassContext::new(class, &mut staged.holder, &mut findings);
        model.process_class(&mut ctx);
    }

    let members: Vec<_> = class
        .members
        .iter()
        .filter(|m| !filter.ignores_member(m))
        .collect();

    // Arity is only known for actions.
    let targets: HashMap<&str, Option<usize>> = members
        .iter()
        .filter(|m| m.kind == MemberKind::Field || SupportMethod::parse(&m.name).is_none())
        .map(|m| {
            let arity = (m.kind == MemberKind::Method).then_some(m.params.len());
            (m.name.as_str(), arity)
        })
        .collect();

    let mut index = 0;
    for member in members {
        if member.kind == MemberKind::Method {
            if let Some(support) = SupportMethod::parse(&member.name) {
                if let Some(finding) = check_support_target(class, member, &support, &targets) {
                    findings.push(finding.on_member(&member.name));
                }
                debug!(method = %member.name, "support method set aside");
                continue;
            }
        }

        let feature = member.feature_type();
        match feature {
            FeatureType::Property | FeatureType::Collection => {
                let mut association =
                    ObjectAssociation::new(&member.name, feature, member.type_ref.clone(), index);
                let mut ctx = MemberContext::new(
                    class,
                    member,
                    feature,
                    &staged.holder,
                    association.holder_mut(),
                    &mut findings,
                );
                model.process_member(&mut ctx);
                staged.associations.push(association);
            }
            FeatureType::Action => {
                let parameters = member
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| ActionParameter::new(&p.name, i, p.type_ref.clone()))
                    .collect();
                let mut action =
                    ObjectAction::new(&member.name, member.type_ref.clone(), parameters, index);
                {
                    let mut ctx = MemberContext::new(
                        class,
                        member,
                        feature,
                        &staged.holder,
                        action.holder_mut(),
                        &mut findings,
                    );
                    model.process_member(&mut ctx);
                }
                for (i, parameter) in action.parameters_mut().iter_mut().enumerate() {
                    if let Some(mut ctx) = ParameterContext::new(
                        class,
                        member,
                        i,
                        parameter.holder_mut(),
                        &mut findings,
                    ) {
                        model.process_parameter(&mut ctx);
                    }
                }
                staged.actions.push(action);
            }
            FeatureType::Object | FeatureType::ActionParameter => {}
        }
        index += 1;
    }

    debug!(
        associations = staged.associations.len(),
        actions = staged.actions.len(),
        findings = findings.len(),
        "class introspected"
    );
    (staged, findings)
}

/// A finding when a support method names no member, or a parameter the
/// member does not have.
fn check_support_target(
    class: &RawClass,
    method: &RawMember,
    support: &SupportMethod,
    targets: &HashMap<&str, Option<usize>>,
) -> Option<ValidationFinding> {
    let target = support.member.as_str();
    match (targets.get(target), support.param_index) {
        (None, _) => Some(ValidationFinding::warning(
            &class.name,
            ORIGIN,
            format!("support method {} names no member '{target}'", method.name),
        )),
        (Some(None), Some(_)) => Some(ValidationFinding::error(
            &class.name,
            ORIGIN,
            format!(
                "support method {} addresses a parameter of '{target}', which is not an action",
                method.name
            ),
        )),
        (Some(Some(arity)), Some(param)) if param >= *arity => Some(ValidationFinding::error(
            &class.name,
            ORIGIN,
            format!(
                "support method {} addresses parameter {param} of '{target}', which takes {arity}",
                method.name
            ),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockPersistenceFilter;
    use crate::domain::specification::FacetedElement;
    use crate::domain::{RawParam, Severity, TypeRef};

    fn passthrough() -> MockPersistenceFilter {
        let mut filter = MockPersistenceFilter::new();
        filter
            .expect_ignores_member()
            .returning(|m| m.name.starts_with("dn_"));
        filter
    }

    fn customer() -> RawClass {
        RawClass::new("Customer")
            .with_member(RawMember::field("name", TypeRef::scalar("string")))
            .with_member(RawMember::field("orders", "list<Order>".parse().unwrap()))
            .with_member(RawMember::field("dn_stateManager", TypeRef::scalar("string")))
            .with_member(RawMember::method("hide_name", TypeRef::scalar("bool")))
            .with_member(RawMember::method("choices_ghost", "list<string>".parse().unwrap()))
            .with_member(
                RawMember::method("placeOrder", TypeRef::scalar("Order"))
                    .with_param(RawParam::new("quantity", TypeRef::scalar("int"))),
            )
    }

    #[test]
    fn members_are_classified() {
        let (staged, findings) = introspect(
            &ProgrammingModel::default_model(),
            &passthrough(),
            &customer(),
        );

        let ids: Vec<_> = staged.associations.iter().map(|a| a.id()).collect();
        assert_eq!(ids, ["name", "orders"]);
        assert!(staged.associations[1].is_collection());

        let actions: Vec<_> = staged.actions.iter().map(|a| a.id()).collect();
        assert_eq!(actions, ["placeOrder"]);
        assert_eq!(staged.actions[0].parameters().len(), 1);
        assert!(staged.actions[0].parameters()[0].contains_facet(FacetType::Mandatory));

        assert!(staged.associations[0].contains_facet(FacetType::HiddenViaMethod));

        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("choices_ghost"));
    }

    #[test]
    fn parameter_support_methods_must_address_a_real_parameter() {
        let order = RawClass::new("Order")
            .with_member(RawMember::field("status", TypeRef::scalar("string")))
            .with_member(
                RawMember::method("ship", TypeRef::void())
                    .with_param(RawParam::new("carrier", TypeRef::scalar("string"))),
            )
            .with_member(RawMember::method("choices_0_ship", "list<string>".parse().unwrap()))
            .with_member(RawMember::method("choices_5_ship", "list<string>".parse().unwrap()))
            .with_member(RawMember::method("default_0_status", TypeRef::scalar("string")));

        let (staged, findings) = introspect(
            &ProgrammingModel::default_model(),
            &passthrough(),
            &order,
        );

        assert_eq!(staged.actions.len(), 1);
        let members: Vec<_> = findings.iter().filter_map(|f| f.member.as_deref()).collect();
        assert_eq!(members, ["choices_5_ship", "default_0_status"]);
        assert!(findings.iter().all(|f| f.severity == Severity::Error));
        assert!(findings[0].message.contains("parameter 5"));
    }

    #[test]
    fn subclass_member_replaces_inherited_in_place() {
        let party = RawClass::new("Party")
            .with_member(RawMember::field("id", TypeRef::scalar("uuid")))
            .with_member(RawMember::field("name", TypeRef::scalar("string")));
        let customer = RawClass::new("Customer")
            .extends("Party")
            .with_member(
                RawMember::field("name", TypeRef::scalar("string")).with_attribute("max_length", 80i64),
            )
            .with_member(RawMember::field("rating", TypeRef::scalar("int")));

        let effective = flatten(&customer, &[party]);
        let names: Vec<_> = effective.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "rating"]);
        assert!(effective.members[1].attributes.contains("max_length"));
    }

    #[test]
    fn builtins_are_immutable_values() {
        let spec = builtin_specification(&TypeName::new("decimal")).publish();
        assert!(spec.is_value());
        assert!(spec.is_immutable());
        assert!(spec.is_builtin());
        assert!(is_builtin(&TypeName::new("void")));
        assert!(!is_builtin(&TypeName::new("Customer")));
    }
}
