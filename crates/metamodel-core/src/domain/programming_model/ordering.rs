//! Member ordering.

use super::{FacetFactory, FactoryContext, MemberContext};
use crate::domain::error::DomainError;
use crate::domain::facet::{Facet, FacetKind};
use crate::domain::raw::AttrValue;
use crate::domain::value_objects::FeatureTypes;

/// `member_order = "1.2"`, `member_order = 3` or
/// `member_order = { name = "Details", sequence = "2" }`.
///
/// For properties the name is the group; for actions it is the property or
/// collection the action belongs to.
pub struct MemberOrderFactory;

/// Accepts dotted sequences of non-negative integers such as `1`, `2.10`.
pub fn validate_sequence(sequence: &str) -> Result<(), DomainError> {
    let well_formed = !sequence.is_empty()
        && sequence
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if well_formed {
        Ok(())
    } else {
        Err(DomainError::InvalidSequence(sequence.to_string()))
    }
}

fn sequence_text(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Text(text) => Some(text.trim().to_string()),
        AttrValue::Int(n) if *n >= 0 => Some(n.to_string()),
        _ => None,
    }
}

impl FacetFactory for MemberOrderFactory {
    fn id(&self) -> &'static str {
        "member-order"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) {
        let parsed = match ctx.member.attributes.get("member_order") {
            None => return,
            Some(AttrValue::Table(table)) => {
                let name = table
                    .get("name")
                    .and_then(AttrValue::as_text)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                table.get("sequence").and_then(sequence_text).map(|s| (name, s))
            }
            Some(other) => sequence_text(other).map(|s| (String::new(), s)),
        };
        let Some((name, sequence)) = parsed else {
            ctx.error("member_order must be a sequence or a table with a `sequence` key");
            return;
        };
        if let Err(e) = validate_sequence(&sequence) {
            ctx.error(e.to_string());
            return;
        }
        ctx.holder
            .add_facet(Facet::new(FacetKind::MemberOrder { name, sequence }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet::FacetType;
    use crate::domain::facet_holder::FacetHolder;
    use crate::domain::raw::{RawClass, RawMember, TypeRef};
    use std::collections::BTreeMap;

    fn order_of(value: AttrValue) -> (Option<FacetKind>, usize) {
        let class = RawClass::new("Customer").with_member(
            RawMember::method("archive", TypeRef::void()).with_attribute("member_order", value),
        );
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
        MemberOrderFactory.process_member(&mut ctx);
        (
            holder.facet(FacetType::MemberOrder).map(|f| f.kind().clone()),
            findings.len(),
        )
    }

    #[test]
    fn sequences_are_validated() {
        assert!(validate_sequence("1").is_ok());
        assert!(validate_sequence("2.10.3").is_ok());
        assert!(validate_sequence("").is_err());
        assert!(validate_sequence("1..2").is_err());
        assert!(validate_sequence("a").is_err());
    }

    #[test]
    fn table_form_carries_name() {
        let mut table = BTreeMap::new();
        table.insert("name".to_string(), AttrValue::from("status"));
        table.insert("sequence".to_string(), AttrValue::from(2i64));
        let (kind, findings) = order_of(AttrValue::Table(table));
        assert_eq!(findings, 0);
        assert_eq!(
            kind,
            Some(FacetKind::MemberOrder {
                name: "status".into(),
                sequence: "2".into()
            })
        );
    }

    #[test]
    fn malformed_sequence_is_a_finding() {
        let (kind, findings) = order_of(AttrValue::from("first"));
        assert!(kind.is_none());
        assert_eq!(findings, 1);
    }
}
