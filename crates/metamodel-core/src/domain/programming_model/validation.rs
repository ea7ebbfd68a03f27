//! Value constraints on properties and parameters.

use super::{ClassContext, FacetFactory, FactoryContext, MemberContext, ParameterContext};
use crate::domain::facet::{Facet, FacetKind, FacetType, RegexPattern};
use crate::domain::raw::AttrValue;
use crate::domain::value_objects::FeatureTypes;

/// Lines a text area gets when `multi_line = true`.
pub const DEFAULT_MULTI_LINE: u32 = 6;

/// `optional = true` / `mandatory = true`; required by default.
pub struct MandatoryFactory;

fn mandatory<C: FactoryContext>(ctx: &mut C) {
    if ctx.flag_attribute("optional") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::Mandatory { required: false }));
    } else if ctx.flag_attribute("mandatory") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::Mandatory { required: true }));
    } else {
        ctx.holder_mut()
            .add_facet(Facet::fallback(FacetKind::Mandatory { required: true }));
    }
}

impl FacetFactory for MandatoryFactory {
    fn id(&self) -> &'static str {
        "mandatory"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(mandatory);
}

/// `max_length = 40`
pub struct MaxLengthFactory;

fn max_length<C: FactoryContext>(ctx: &mut C) {
    match ctx.uint_attribute("max_length") {
        Some(0) => ctx.error("max_length must be positive"),
        Some(value) => {
            ctx.holder_mut()
                .add_facet(Facet::new(FacetKind::MaxLength { value }));
        }
        None => {}
    }
}

impl FacetFactory for MaxLengthFactory {
    fn id(&self) -> &'static str {
        "max-length"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(max_length);
}

/// `typical_length = 20`, otherwise derived from the max length.
pub struct TypicalLengthFactory;

fn typical_length<C: FactoryContext>(ctx: &mut C) {
    if let Some(value) = ctx.uint_attribute("typical_length") {
        ctx.holder_mut()
            .add_facet(Facet::new(FacetKind::TypicalLength { value }));
        return;
    }
    let max = ctx
        .holder_mut()
        .facet(FacetType::MaxLength)
        .and_then(Facet::number);
    if let Some(value) = max {
        ctx.holder_mut().add_facet(Facet::derived_from(
            FacetKind::TypicalLength { value },
            FacetType::MaxLength,
        ));
    }
}

impl FacetFactory for TypicalLengthFactory {
    fn id(&self) -> &'static str {
        "typical-length"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(typical_length);
}

/// `multi_line = 4` or `multi_line = true`.
pub struct MultiLineFactory;

fn multi_line<C: FactoryContext>(ctx: &mut C) {
    let lines = match ctx.attributes().get("multi_line") {
        None | Some(AttrValue::Flag(false)) => return,
        Some(AttrValue::Flag(true)) => DEFAULT_MULTI_LINE,
        Some(AttrValue::Int(n)) if *n > 0 => match u32::try_from(*n) {
            Ok(n) => n,
            Err(_) => DEFAULT_MULTI_LINE,
        },
        Some(_) => {
            ctx.error("multi_line must be true or a positive number of lines");
            return;
        }
    };
    ctx.holder_mut()
        .add_facet(Facet::new(FacetKind::MultiLine { lines }));
}

impl FacetFactory for MultiLineFactory {
    fn id(&self) -> &'static str {
        "multi-line"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(multi_line);
}

/// `regex = "^[A-Z]{3}$"` or `regex = { pattern = "...", flags = "i" }`.
pub struct RegexFactory;

fn regex<C: FactoryContext>(ctx: &mut C) {
    let source = match ctx.attributes().get("regex") {
        None => return,
        Some(AttrValue::Text(pattern)) => Some((pattern.clone(), String::new())),
        Some(AttrValue::Table(table)) => match table.get("pattern").and_then(AttrValue::as_text) {
            Some(pattern) => {
                let flags = table
                    .get("flags")
                    .and_then(AttrValue::as_text)
                    .unwrap_or_default();
                Some((pattern.to_string(), flags.to_string()))
            }
            None => None,
        },
        Some(_) => None,
    };
    let Some((pattern, flags)) = source else {
        ctx.error("regex must be a pattern string or a table with a `pattern` key");
        return;
    };
    match RegexPattern::new(pattern, flags) {
        Ok(pattern) => {
            ctx.holder_mut().add_facet(Facet::new(FacetKind::Regex(pattern)));
        }
        Err(e) => ctx.error(e.to_string()),
    }
}

impl FacetFactory for RegexFactory {
    fn id(&self) -> &'static str {
        "regex"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::PROPERTIES_AND_PARAMETERS
    }

    every_element!(regex);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet_holder::FacetHolder;
    use crate::domain::raw::{RawClass, RawMember, RawParam, TypeRef};
    use crate::domain::validation::ValidationFinding;
    use std::collections::BTreeMap;

    fn run_property(
        member: RawMember,
        factories: &[&dyn FacetFactory],
    ) -> (FacetHolder, Vec<ValidationFinding>) {
        let class = RawClass::new("Customer").with_member(member);
        let class_facets = FacetHolder::new();
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let member = &class.members[0];
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
        (holder, findings)
    }

    fn name() -> RawMember {
        RawMember::field("name", TypeRef::scalar("string"))
    }

    #[test]
    fn properties_are_required_unless_optional() {
        let (holder, _) = run_property(name(), &[&MandatoryFactory]);
        let facet = holder.facet(FacetType::Mandatory).unwrap();
        assert!(facet.is_fallback());
        assert_eq!(facet.kind(), &FacetKind::Mandatory { required: true });

        let (holder, _) = run_property(name().with_attribute("optional", true), &[&MandatoryFactory]);
        assert_eq!(
            holder.facet(FacetType::Mandatory).unwrap().kind(),
            &FacetKind::Mandatory { required: false }
        );
    }

    #[test]
    fn typical_length_derives_from_max_length() {
        let (holder, _) = run_property(
            name().with_attribute("max_length", 40i64),
            &[&MaxLengthFactory, &TypicalLengthFactory],
        );
        let typical = holder.facet(FacetType::TypicalLength).unwrap();
        assert_eq!(typical.number(), Some(40));
        assert!(typical.is_derived());
    }

    #[test]
    fn multi_line_flag_uses_default_lines() {
        let (holder, _) = run_property(name().with_attribute("multi_line", true), &[&MultiLineFactory]);
        assert_eq!(holder.facet(FacetType::MultiLine).and_then(Facet::number), Some(DEFAULT_MULTI_LINE));
    }

    #[test]
    fn regex_table_form_with_flags() {
        let mut table = BTreeMap::new();
        table.insert("pattern".to_string(), AttrValue::from("^[a-z]+$"));
        table.insert("flags".to_string(), AttrValue::from("i"));
        let (holder, findings) = run_property(
            name().with_attribute("regex", AttrValue::Table(table)),
            &[&RegexFactory],
        );
        assert!(findings.is_empty());
        match holder.facet(FacetType::Regex).unwrap().kind() {
            FacetKind::Regex(pattern) => assert!(pattern.is_match("ABC")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_regex_is_a_finding() {
        let (holder, findings) =
            run_property(name().with_attribute("regex", "([a-z"), &[&RegexFactory]);
        assert!(!holder.contains_facet(FacetType::Regex));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn parameters_get_constraints_too() {
        let class = RawClass::new("Customer").with_member(
            RawMember::method("rename", TypeRef::void())
                .with_param(RawParam::new("name", TypeRef::scalar("string")).with_attribute("max_length", 20i64)),
        );
        let mut holder = FacetHolder::new();
        let mut findings = Vec::new();
        let mut ctx =
            ParameterContext::new(&class, &class.members[0], 0, &mut holder, &mut findings).unwrap();
        MaxLengthFactory.process_parameter(&mut ctx);
        MandatoryFactory.process_parameter(&mut ctx);
        assert_eq!(holder.facet(FacetType::MaxLength).and_then(Facet::number), Some(20));
        assert!(holder.contains_facet(FacetType::Mandatory));
    }
}
