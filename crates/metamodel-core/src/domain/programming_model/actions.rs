//! Action semantics and placement.

use super::{ClassContext, FacetFactory, FactoryContext, MemberContext, ParameterContext};
use crate::domain::facet::{Facet, FacetKind};
use crate::domain::value_objects::{ActionPosition, BookmarkPolicy, FeatureTypes, SemanticsOf};

/// `semantics = "safe"`; actions are non-idempotent unless told otherwise.
pub struct ActionSemanticsFactory;

impl FacetFactory for ActionSemanticsFactory {
    fn id(&self) -> &'static str {
        "action-semantics"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::ACTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let facet = match ctx.parsed_attribute::<SemanticsOf>("semantics") {
            Some(semantics) => Facet::new(FacetKind::ActionSemantics { semantics }),
            None => Facet::fallback(FacetKind::ActionSemantics {
                semantics: SemanticsOf::NonIdempotent,
            }),
        };
        ctx.holder.add_facet(facet);
    }
}

/// `action_position = "panel-dropdown"`
pub struct ActionPositionFactory;

impl FacetFactory for ActionPositionFactory {
    fn id(&self) -> &'static str {
        "action-position"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::ACTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        if let Some(position) = ctx.parsed_attribute::<ActionPosition>("action_position") {
            ctx.holder
                .add_facet(Facet::new(FacetKind::ActionPosition { position }));
        }
    }
}

/// `bookmarking = "as-root"` on classes and safe actions.
pub struct BookmarkableFactory;

fn bookmarkable<C: FactoryContext>(ctx: &mut C) {
    match ctx.parsed_attribute::<BookmarkPolicy>("bookmarking") {
        Some(BookmarkPolicy::Never) | None => {}
        Some(policy) => {
            ctx.holder_mut()
                .add_facet(Facet::new(FacetKind::Bookmarkable { policy }));
        }
    }
}

impl FacetFactory for BookmarkableFactory {
    fn id(&self) -> &'static str {
        "bookmarkable"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT | FeatureTypes::ACTIONS
    }

    every_element!(bookmarkable);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet::FacetType;
    use crate::domain::facet_holder::FacetHolder;
    use crate::domain::raw::{RawClass, RawMember, TypeRef};

    fn process(member: RawMember, factories: &[&dyn FacetFactory]) -> (FacetHolder, usize) {
        let class = RawClass::new("Order").with_member(member);
        let member = &class.members[0];
        let class_facets = FacetHolder::new();
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let mut ctx = MemberContext::new(
            &class,
            member,
            member.feature_type(),
            &class_facets,
            &mut holder,
            &mut findings,
        );
        for factory in factories {
            factory.process_member(&mut ctx);
        }
        (holder, findings.len())
    }

    fn submit() -> RawMember {
        RawMember::method("submit", TypeRef::void())
    }

    #[test]
    fn semantics_default_to_non_idempotent() {
        let (holder, _) = process(submit(), &[&ActionSemanticsFactory]);
        let facet = holder.facet(FacetType::ActionSemantics).unwrap();
        assert!(facet.is_fallback());
        assert_eq!(
            facet.kind(),
            &FacetKind::ActionSemantics {
                semantics: SemanticsOf::NonIdempotent
            }
        );
    }

    #[test]
    fn query_only_is_safe() {
        let (holder, findings) =
            process(submit().with_attribute("semantics", "query_only"), &[&ActionSemanticsFactory]);
        assert_eq!(findings, 0);
        assert_eq!(
            holder.facet(FacetType::ActionSemantics).unwrap().kind(),
            &FacetKind::ActionSemantics {
                semantics: SemanticsOf::Safe
            }
        );
    }

    #[test]
    fn unknown_position_is_a_finding() {
        let (holder, findings) =
            process(submit().with_attribute("action_position", "sideways"), &[&ActionPositionFactory]);
        assert!(!holder.contains_facet(FacetType::ActionPosition));
        assert_eq!(findings, 1);
    }

    #[test]
    fn never_bookmarkable_installs_nothing() {
        let (holder, _) =
            process(submit().with_attribute("bookmarking", "never"), &[&BookmarkableFactory]);
        assert!(!holder.contains_facet(FacetType::Bookmarkable));

        let (holder, _) =
            process(submit().with_attribute("bookmarking", "as_root"), &[&BookmarkableFactory]);
        assert!(holder.contains_facet(FacetType::Bookmarkable));
    }
}
