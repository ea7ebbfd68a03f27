//! Per-element facet container.

use std::collections::BTreeMap;

use crate::domain::facet::{Facet, FacetType};

/// Holds at most one facet per [`FacetType`].
///
/// Populated during the assembly pass and frozen once the owning
/// specification is published (published specifications only hand out
/// shared references).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetHolder {
    facets: BTreeMap<FacetType, Facet>,
}

impl FacetHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `facet`, replacing the current one if its precedence allows.
    ///
    /// Returns whether the facet was installed. A refused install is not an
    /// error: contending facets are resolved silently.
    pub fn add_facet(&mut self, facet: Facet) -> bool {
        let facet_type = facet.facet_type();
        match self.facets.get(&facet_type) {
            Some(existing) if !facet.may_replace(existing) => false,
            _ => {
                self.facets.insert(facet_type, facet);
                true
            }
        }
    }

    /// First-wins install.
    pub fn add_facet_if_not_present(&mut self, facet: Facet) -> bool {
        let facet_type = facet.facet_type();
        if self.facets.contains_key(&facet_type) {
            return false;
        }
        self.facets.insert(facet_type, facet);
        true
    }

    /// Convenience for factories that may or may not produce a facet.
    pub fn add_optional_facet(&mut self, facet: Option<Facet>) -> bool {
        facet.is_some_and(|facet| self.add_facet(facet))
    }

    pub fn facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.facets.get(&facet_type)
    }

    pub fn contains_facet(&self, facet_type: FacetType) -> bool {
        self.facets.contains_key(&facet_type)
    }

    /// Facets in `FacetType` order.
    pub fn facets(&self) -> impl Iterator<Item = &Facet> {
        self.facets.values()
    }

    pub fn facet_types(&self) -> impl Iterator<Item = FacetType> + '_ {
        self.facets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facet::FacetKind;

    fn named(text: &str) -> Facet {
        Facet::new(FacetKind::Named { text: text.into() })
    }

    #[test]
    fn last_normal_facet_wins() {
        let mut holder = FacetHolder::new();
        assert!(holder.add_facet(named("first")));
        assert!(holder.add_facet(named("second")));
        assert_eq!(holder.facet(FacetType::Named).unwrap().text(), Some("second"));
        assert_eq!(holder.len(), 1);
    }

    #[test]
    fn protected_facet_survives_later_installs() {
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::protected(FacetKind::Named {
            text: "kept".into(),
        }));
        assert!(!holder.add_facet(named("ignored")));
        assert_eq!(holder.facet(FacetType::Named).unwrap().text(), Some("kept"));
    }

    #[test]
    fn if_not_present_is_first_wins() {
        let mut holder = FacetHolder::new();
        assert!(holder.add_facet_if_not_present(named("first")));
        assert!(!holder.add_facet_if_not_present(named("second")));
        assert_eq!(holder.facet(FacetType::Named).unwrap().text(), Some("first"));
    }

    #[test]
    fn optional_facet_none_is_a_no_op() {
        let mut holder = FacetHolder::new();
        assert!(!holder.add_optional_facet(None));
        assert!(holder.is_empty());
        assert!(holder.add_optional_facet(Some(named("x"))));
        assert!(holder.contains_facet(FacetType::Named));
    }

    #[test]
    fn absent_facet_is_none() {
        let holder = FacetHolder::new();
        assert!(holder.facet(FacetType::Hidden).is_none());
        assert!(!holder.contains_facet(FacetType::Hidden));
    }
}
