//! Core domain layer of the metamodel.
//!
//! Everything here is pure: no I/O, no locking, no logging. Class
//! descriptions arrive as [`raw`] data, the [`programming_model`] turns them
//! into facets, and [`specification`] assembles the immutable
//! [`ObjectSpecification`] that the application layer caches.
//!
//! ## Layering
//!
//! - **value_objects / facet / facet_holder**: the vocabulary
//! - **programming_model**: ordered facet factories
//! - **layout**: the layout document, its derive and overwrite passes
//! - **specification**: staged and published specifications

pub mod error;
pub mod facet;
pub mod facet_holder;
pub mod layout;
pub mod naming;
pub mod programming_model;
pub mod raw;
pub mod specification;
pub mod validation;
pub mod value_objects;

pub use error::{DomainError, ErrorCategory};
pub use facet::{Derivation, Facet, FacetKind, FacetType, Precedence, RegexPattern};
pub use facet_holder::FacetHolder;
pub use layout::{
    ActionLayout, CollectionLayout, Column, DeriveReport, DomainObjectLayout, LayoutCatalog,
    LayoutMembers, PropertyGroup, PropertyLayout, Tab, TabGroup,
};
pub use programming_model::{FacetFactory, ProgrammingModel};
pub use raw::{AttrValue, Attributes, MemberKind, RawClass, RawMember, RawParam, TypeRef};
pub use specification::{
    ActionParameter, FacetedElement, MemberFilter, ObjectAction, ObjectAssociation,
    ObjectSpecification, StagedSpecification,
};
pub use validation::{Severity, ValidationFinding, ValidationReport};
pub use value_objects::{
    ActionPosition, BookmarkPolicy, CssPosition, FeatureType, FeatureTypes, IdentityType,
    LabelPosition, ObjectKind, RenderPolicy, SemanticsOf, ServiceNature, TypeName, Where,
};

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Facet precedence through a holder
    // ========================================================================

    #[test]
    fn protected_value_facet_survives_replacement() {
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::new(FacetKind::Value {
            semantics: "money".into(),
        }));
        let replaced = holder.add_facet(Facet::new(FacetKind::Value {
            semantics: "other".into(),
        }));

        assert!(!replaced);
        assert_eq!(
            holder.facet(FacetType::Value).map(|f| f.kind().describe()),
            Some("money".to_string())
        );
    }

    // ========================================================================
    // Programming model end to end on one class
    // ========================================================================

    #[test]
    fn default_model_names_and_orders_members() {
        let class = RawClass::new("Customer")
            .with_member(
                RawMember::field("lastName", TypeRef::scalar("string"))
                    .with_attribute("member_order", "2"),
            )
            .with_member(
                RawMember::field("firstName", TypeRef::scalar("string"))
                    .with_attribute("member_order", "1"),
            );
        let model = ProgrammingModel::default_model();

        let mut staged = StagedSpecification::new(class.name.clone());
        let mut findings = Vec::new();
        {
            let mut ctx =
                programming_model::ClassContext::new(&class, &mut staged.holder, &mut findings);
            model.process_class(&mut ctx);
        }
        for (index, member) in class.members.iter().enumerate() {
            let mut association =
                ObjectAssociation::new(&member.name, member.feature_type(), member.type_ref.clone(), index);
            let mut ctx = programming_model::MemberContext::new(
                &class,
                member,
                member.feature_type(),
                &staged.holder,
                association.holder_mut(),
                &mut findings,
            );
            model.process_member(&mut ctx);
            staged.associations.push(association);
        }
        let spec = staged.publish();

        assert!(findings.is_empty(), "{findings:?}");
        assert_eq!(spec.title_name(), "Customer");
        let names: Vec<_> = spec.properties().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["First Name", "Last Name"]);
    }
}
