//! Naming and presentation factories.

use super::{ClassContext, FacetFactory, FactoryContext, MemberContext, ParameterContext};
use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::naming::{natural_name, pluralize};
use crate::domain::value_objects::{CssPosition, FeatureTypes, LabelPosition, RenderPolicy};

// ── Named ────────────────────────────────────────────────────────────────────

/// Natural name of the identifier, replaced by anything more specific.
pub struct NamedFallbackFactory;

fn named_fallback<C: FactoryContext>(ctx: &mut C) {
    let text = natural_name(ctx.element_name());
    ctx.holder_mut()
        .add_facet(Facet::fallback(FacetKind::Named { text }));
}

impl FacetFactory for NamedFallbackFactory {
    fn id(&self) -> &'static str {
        "named-fallback"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::EVERYTHING
    }

    every_element!(named_fallback);
}

/// `named = "Client"`
pub struct NamedAttributeFactory;

fn named_attribute<C: FactoryContext>(ctx: &mut C) {
    if let Some(text) = ctx.text_attribute("named") {
        ctx.holder_mut().add_facet(Facet::new(FacetKind::Named { text }));
    }
}

impl FacetFactory for NamedAttributeFactory {
    fn id(&self) -> &'static str {
        "named"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::EVERYTHING
    }

    every_element!(named_attribute);
}

/// `plural = "People"`, otherwise derived from the class name.
pub struct PluralFactory;

impl FacetFactory for PluralFactory {
    fn id(&self) -> &'static str {
        "plural"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        if let Some(text) = ctx.text_attribute("plural") {
            ctx.holder.add_facet(Facet::new(FacetKind::Plural { text }));
            return;
        }
        let singular = ctx
            .holder
            .facet(FacetType::Named)
            .and_then(Facet::text)
            .map(str::to_string)
            .unwrap_or_else(|| natural_name(ctx.class.name.simple_name()));
        ctx.holder.add_facet(Facet::derived_from(
            FacetKind::Plural {
                text: pluralize(&singular),
            },
            FacetType::Named,
        ));
    }
}

/// `described_as = "..."`
pub struct DescribedAsFactory;

fn described_as<C: FactoryContext>(ctx: &mut C) {
    if let Some(text) = ctx.text_attribute("described_as") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::DescribedAs { text }));
    }
}

impl FacetFactory for DescribedAsFactory {
    fn id(&self) -> &'static str {
        "described-as"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::EVERYTHING
    }

    every_element!(described_as);
}

// ── CSS ──────────────────────────────────────────────────────────────────────

/// `css_class = "x-important"`
pub struct CssClassFactory;

fn css_class<C: FactoryContext>(ctx: &mut C) {
    if let Some(class) = ctx.text_attribute("css_class") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::CssClass { class }));
    }
}

impl FacetFactory for CssClassFactory {
    fn id(&self) -> &'static str {
        "css-class"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::EVERYTHING_BUT_PARAMETERS
    }

    every_element!(css_class);
}

/// `css_class_fa = "fa-trash"`, optional `css_class_fa_position = "right"`.
pub struct CssClassFaFactory;

fn css_class_fa<C: FactoryContext>(ctx: &mut C) {
    let Some(class) = ctx.text_attribute("css_class_fa") else {
        return;
    };
    let position = ctx
        .parsed_attribute::<CssPosition>("css_class_fa_position")
        .unwrap_or(CssPosition::Left);
    let class = if class.starts_with("fa-") || class.starts_with("fa ") {
        class
    } else {
        format!("fa-{class}")
    };
    ctx.holder_mut()
        .add_facet(Facet::new(FacetKind::CssClassFa { class, position }));
}

impl FacetFactory for CssClassFaFactory {
    fn id(&self) -> &'static str {
        "css-class-fa"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT | FeatureTypes::ACTIONS
    }

    every_element!(css_class_fa);
}

// ── Property presentation ────────────────────────────────────────────────────

/// `label_position = "top"`
pub struct LabelAtFactory;

fn label_at<C: FactoryContext>(ctx: &mut C) {
    if let Some(position) = ctx.parsed_attribute::<LabelPosition>("label_position") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::LabelAt { position }));
    }
}

impl FacetFactory for LabelAtFactory {
    fn id(&self) -> &'static str {
        "label-at"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(label_at);
}

/// `render = "lazily"`
pub struct RenderFactory;

impl FacetFactory for RenderFactory {
    fn id(&self) -> &'static str {
        "render"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::ASSOCIATIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        if let Some(policy) = ctx.parsed_attribute::<RenderPolicy>("render") {
            ctx.holder.add_facet(Facet::new(FacetKind::Render { policy }));
        }
    }
}
