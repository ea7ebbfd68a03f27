//! Collection presentation and element typing.

use super::{ClassContext, FacetFactory, FactoryContext, MemberContext, ParameterContext};
use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::facet_holder::FacetHolder;
use crate::domain::value_objects::{FeatureTypes, TypeName};

/// `default_view = "table"`
pub struct DefaultViewFactory;

impl FacetFactory for DefaultViewFactory {
    fn id(&self) -> &'static str {
        "default-view"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::COLLECTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        if let Some(view) = ctx.text_attribute("default_view") {
            ctx.holder.add_facet(Facet::new(FacetKind::DefaultView { view }));
        }
    }
}

/// `paged = 25` on a class (standalone tables) or a collection.
pub struct PagedFactory;

fn paged<C: FactoryContext>(ctx: &mut C) {
    match ctx.uint_attribute("paged") {
        Some(0) => ctx.error("paged must be a positive page size"),
        Some(page_size) => {
            ctx.holder_mut()
                .add_facet(Facet::new(FacetKind::Paged { page_size }));
        }
        None => {}
    }
}

impl FacetFactory for PagedFactory {
    fn id(&self) -> &'static str {
        "paged"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT | FeatureTypes::COLLECTIONS
    }

    every_element!(paged);
}

/// `sorted_by = "dueDate"`
pub struct SortedByFactory;

impl FacetFactory for SortedByFactory {
    fn id(&self) -> &'static str {
        "sorted-by"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::COLLECTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        if let Some(field) = ctx.text_attribute("sorted_by") {
            ctx.holder.add_facet(Facet::new(FacetKind::SortedBy { field }));
        }
    }
}

/// Element type of collections and collection-returning actions, taken from
/// the declared type unless `type_of` says otherwise.
pub struct TypeOfFactory;

impl FacetFactory for TypeOfFactory {
    fn id(&self) -> &'static str {
        "type-of"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::COLLECTIONS | FeatureTypes::ACTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        if let Some(element) = ctx.text_attribute("type_of") {
            ctx.holder.add_facet(Facet::new(FacetKind::TypeOf {
                element: TypeName::from(element),
            }));
            return;
        }
        if ctx.member.type_ref.is_collection() {
            ctx.holder.add_facet(Facet::fallback(FacetKind::TypeOf {
                element: ctx.member.type_ref.element_type().clone(),
            }));
        }
    }
}

/// Element type of a collection member, if known.
pub fn element_type(holder: &FacetHolder) -> Option<&TypeName> {
    match holder.facet(FacetType::TypeOf)?.kind() {
        FacetKind::TypeOf { element } => Some(element),
        _ => None,
    }
}
