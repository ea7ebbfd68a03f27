//! Object specifications and their members.
//!
//! A [`StagedSpecification`] is the owned, mutable form used while factories
//! and the layout overlay run. [`StagedSpecification::publish`] freezes it
//! into an [`ObjectSpecification`], which only hands out shared references.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::facet_holder::FacetHolder;
use crate::domain::layout::{CatalogAction, DomainObjectLayout, LayoutCatalog, LayoutMembers};
use crate::domain::naming::natural_name;
use crate::domain::raw::TypeRef;
use crate::domain::value_objects::{FeatureType, ObjectKind, TypeName, Where};

// ── Faceted elements ─────────────────────────────────────────────────────────

/// Anything that owns a [`FacetHolder`].
pub trait FacetedElement {
    fn holder(&self) -> &FacetHolder;

    fn facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.holder().facet(facet_type)
    }

    fn contains_facet(&self, facet_type: FacetType) -> bool {
        self.holder().contains_facet(facet_type)
    }

    /// Hidden in every context.
    fn is_always_hidden(&self) -> bool {
        matches!(
            self.facet(FacetType::Hidden).map(Facet::kind),
            Some(FacetKind::Hidden { at }) if at.is_always()
        )
    }

    /// Disabled in every context.
    fn is_always_disabled(&self) -> bool {
        matches!(
            self.facet(FacetType::Disabled).map(Facet::kind),
            Some(FacetKind::Disabled { at, .. }) if at.is_always()
        )
    }

    /// Parsed `MemberOrder` sequence, if any.
    fn member_order(&self) -> Option<(&str, Vec<u32>)> {
        match self.facet(FacetType::MemberOrder).map(Facet::kind) {
            Some(FacetKind::MemberOrder { name, sequence }) => {
                Some((name.as_str(), dewey(sequence)))
            }
            _ => None,
        }
    }
}

/// Dewey-decimal components of a sequence; unparsable parts sort last.
fn dewey(sequence: &str) -> Vec<u32> {
    sequence
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(u32::MAX))
        .collect()
}

/// Which members a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberFilter {
    #[default]
    All,
    /// Excludes members hidden everywhere.
    Visible,
    /// Excludes members hidden or disabled everywhere.
    Enabled,
}

impl MemberFilter {
    pub fn accepts(&self, element: &impl FacetedElement) -> bool {
        match self {
            Self::All => true,
            Self::Visible => !element.is_always_hidden(),
            Self::Enabled => !element.is_always_hidden() && !element.is_always_disabled(),
        }
    }
}

// ── Members ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ActionParameter {
    name: String,
    index: usize,
    type_ref: TypeRef,
    holder: FacetHolder,
}

impl ActionParameter {
    pub fn new(name: impl Into<String>, index: usize, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            index,
            type_ref,
            holder: FacetHolder::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }
}

impl FacetedElement for ActionParameter {
    fn holder(&self) -> &FacetHolder {
        &self.holder
    }
}

/// A property (one-to-one) or collection (one-to-many).
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAssociation {
    id: String,
    feature_type: FeatureType,
    type_ref: TypeRef,
    declaration_index: usize,
    layout_position: Option<usize>,
    holder: FacetHolder,
}

impl ObjectAssociation {
    pub fn new(
        id: impl Into<String>,
        feature_type: FeatureType,
        type_ref: TypeRef,
        declaration_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            feature_type,
            type_ref,
            declaration_index,
            layout_position: None,
            holder: FacetHolder::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn is_collection(&self) -> bool {
        self.feature_type == FeatureType::Collection
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn declaration_index(&self) -> usize {
        self.declaration_index
    }

    /// Place of the member's node in the layout walk, once a layout applied.
    pub fn layout_position(&self) -> Option<usize> {
        self.layout_position
    }

    pub fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }

    pub fn name(&self) -> String {
        member_name(self, &self.id)
    }

    fn slot(&self) -> MemberSlot {
        MemberSlot {
            layout_position: self.layout_position,
            declaration_index: self.declaration_index,
        }
    }
}

impl FacetedElement for ObjectAssociation {
    fn holder(&self) -> &FacetHolder {
        &self.holder
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAction {
    id: String,
    return_type: TypeRef,
    parameters: Vec<ActionParameter>,
    declaration_index: usize,
    layout_position: Option<usize>,
    holder: FacetHolder,
}

impl ObjectAction {
    pub fn new(
        id: impl Into<String>,
        return_type: TypeRef,
        parameters: Vec<ActionParameter>,
        declaration_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            return_type,
            parameters,
            declaration_index,
            layout_position: None,
            holder: FacetHolder::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [ActionParameter] {
        &mut self.parameters
    }

    pub fn declaration_index(&self) -> usize {
        self.declaration_index
    }

    /// Place of the member's node in the layout walk, once a layout applied.
    pub fn layout_position(&self) -> Option<usize> {
        self.layout_position
    }

    pub fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }

    pub fn name(&self) -> String {
        member_name(self, &self.id)
    }

    fn slot(&self) -> MemberSlot {
        MemberSlot {
            layout_position: self.layout_position,
            declaration_index: self.declaration_index,
        }
    }
}

impl FacetedElement for ObjectAction {
    fn holder(&self) -> &FacetHolder {
        &self.holder
    }
}

fn member_name(element: &impl FacetedElement, id: &str) -> String {
    element
        .facet(FacetType::Named)
        .and_then(Facet::text)
        .map(str::to_string)
        .unwrap_or_else(|| natural_name(id))
}

/// Sort key of a member: its layout position, its declaration index.
#[derive(Debug, Clone, Copy)]
struct MemberSlot {
    layout_position: Option<usize>,
    declaration_index: usize,
}

/// Members placed by a layout first, in layout order. Then members with a
/// `MemberOrder` (Dewey sequence, then declaration index), then the rest in
/// declaration order.
fn compare_members<T: FacetedElement>(
    a: &T,
    a_slot: MemberSlot,
    b: &T,
    b_slot: MemberSlot,
) -> Ordering {
    match (a_slot.layout_position, b_slot.layout_position) {
        (Some(pa), Some(pb)) => return pa.cmp(&pb),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }
    let (a_index, b_index) = (a_slot.declaration_index, b_slot.declaration_index);
    match (a.member_order(), b.member_order()) {
        (Some((_, sa)), Some((_, sb))) => sa.cmp(&sb).then(a_index.cmp(&b_index)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_index.cmp(&b_index),
    }
}

// ── Staging ──────────────────────────────────────────────────────────────────

/// A specification under construction.
#[derive(Debug, Clone)]
pub struct StagedSpecification {
    pub type_name: TypeName,
    pub holder: FacetHolder,
    pub associations: Vec<ObjectAssociation>,
    pub actions: Vec<ObjectAction>,
    pub superclass: Option<Arc<ObjectSpecification>>,
    pub interfaces: Vec<TypeName>,
    pub is_abstract: bool,
    pub builtin: bool,
}

impl StagedSpecification {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            holder: FacetHolder::new(),
            associations: Vec::new(),
            actions: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            builtin: false,
        }
    }

    pub fn association_mut(&mut self, id: &str) -> Option<&mut ObjectAssociation> {
        self.associations.iter_mut().find(|a| a.id == id)
    }

    pub fn action_mut(&mut self, id: &str) -> Option<&mut ObjectAction> {
        self.actions.iter_mut().find(|a| a.id == id)
    }

    /// Apply member ordering to the staged member lists.
    pub fn sort_members(&mut self) {
        self.associations
            .sort_by(|a, b| compare_members(a, a.slot(), b, b.slot()));
        self.actions.sort_by(|a, b| compare_members(a, a.slot(), b, b.slot()));
    }

    /// Members in their current order, as the layout derive phase sees them.
    pub fn layout_catalog(&self) -> LayoutCatalog {
        LayoutCatalog {
            properties: self
                .associations
                .iter()
                .filter(|a| !a.is_collection())
                .map(|a| a.id.clone())
                .collect(),
            collections: self
                .associations
                .iter()
                .filter(|a| a.is_collection())
                .map(|a| a.id.clone())
                .collect(),
            actions: self
                .actions
                .iter()
                .map(|a| {
                    CatalogAction::new(&a.id, a.member_order().map(|(name, _)| name.to_string()))
                })
                .collect(),
        }
    }

    pub fn publish(mut self) -> ObjectSpecification {
        self.sort_members();
        ObjectSpecification {
            type_name: self.type_name,
            holder: self.holder,
            associations: self.associations,
            actions: self.actions,
            superclass: self.superclass,
            interfaces: self.interfaces,
            is_abstract: self.is_abstract,
            builtin: self.builtin,
        }
    }
}

impl LayoutMembers for StagedSpecification {
    fn member_holder_mut(&mut self, feature: FeatureType, id: &str) -> Option<&mut FacetHolder> {
        match feature {
            FeatureType::Property | FeatureType::Collection => self
                .associations
                .iter_mut()
                .find(|a| a.feature_type == feature && a.id == id)
                .map(|a| &mut a.holder),
            FeatureType::Action => self
                .actions
                .iter_mut()
                .find(|a| a.id == id)
                .map(|a| &mut a.holder),
            FeatureType::Object | FeatureType::ActionParameter => None,
        }
    }

    fn place_member(&mut self, feature: FeatureType, id: &str, position: usize) {
        match feature {
            FeatureType::Property | FeatureType::Collection => {
                if let Some(a) = self
                    .associations
                    .iter_mut()
                    .find(|a| a.feature_type == feature && a.id == id)
                {
                    a.layout_position = Some(position);
                }
            }
            FeatureType::Action => {
                if let Some(a) = self.actions.iter_mut().find(|a| a.id == id) {
                    a.layout_position = Some(position);
                }
            }
            FeatureType::Object | FeatureType::ActionParameter => {}
        }
    }
}

// ── ObjectSpecification ──────────────────────────────────────────────────────

/// The published, immutable metamodel of one type.
#[derive(Debug, Clone)]
pub struct ObjectSpecification {
    type_name: TypeName,
    holder: FacetHolder,
    associations: Vec<ObjectAssociation>,
    actions: Vec<ObjectAction>,
    superclass: Option<Arc<ObjectSpecification>>,
    interfaces: Vec<TypeName>,
    is_abstract: bool,
    builtin: bool,
}

impl ObjectSpecification {
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Logical type name, independent of the raw name.
    pub fn spec_id(&self) -> &str {
        self.facet(FacetType::ObjectSpecId)
            .and_then(Facet::text)
            .unwrap_or(self.type_name.as_str())
    }

    /// Display name of the type.
    pub fn title_name(&self) -> String {
        self.facet(FacetType::Named)
            .and_then(Facet::text)
            .map(str::to_string)
            .unwrap_or_else(|| natural_name(self.type_name.simple_name()))
    }

    pub fn plural_name(&self) -> Option<&str> {
        self.facet(FacetType::Plural).and_then(Facet::text)
    }

    /// Look the facet up here, then up the superclass chain.
    pub fn facet_in_hierarchy(&self, facet_type: FacetType) -> Option<&Facet> {
        let mut current = Some(self);
        while let Some(spec) = current {
            if let Some(facet) = spec.facet(facet_type) {
                return Some(facet);
            }
            current = spec.superclass.as_deref();
        }
        None
    }

    pub fn associations(&self, filter: MemberFilter) -> impl Iterator<Item = &ObjectAssociation> {
        self.associations.iter().filter(move |a| filter.accepts(*a))
    }

    pub fn properties(&self) -> impl Iterator<Item = &ObjectAssociation> {
        self.associations.iter().filter(|a| !a.is_collection())
    }

    pub fn collections(&self) -> impl Iterator<Item = &ObjectAssociation> {
        self.associations.iter().filter(|a| a.is_collection())
    }

    pub fn object_actions(&self, filter: MemberFilter) -> impl Iterator<Item = &ObjectAction> {
        self.actions.iter().filter(move |a| filter.accepts(*a))
    }

    pub fn association(&self, id: &str) -> Option<&ObjectAssociation> {
        self.associations.iter().find(|a| a.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&ObjectAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn is_value(&self) -> bool {
        self.contains_facet(FacetType::Value)
    }

    pub fn is_persistable(&self) -> bool {
        self.contains_facet(FacetType::Persistable)
    }

    pub fn is_view_model(&self) -> bool {
        self.contains_facet(FacetType::ViewModel)
    }

    pub fn is_service(&self) -> bool {
        self.contains_facet(FacetType::DomainService)
    }

    pub fn is_immutable(&self) -> bool {
        self.contains_facet(FacetType::Immutable)
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Built-in value type known without a class description.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn kind(&self) -> ObjectKind {
        if self.is_value() {
            ObjectKind::Value
        } else if self.is_service() {
            ObjectKind::Service
        } else if self.is_view_model() {
            ObjectKind::ViewModel
        } else if self.is_persistable() {
            ObjectKind::Entity
        } else {
            ObjectKind::Plain
        }
    }

    pub fn superclass(&self) -> Option<&Arc<ObjectSpecification>> {
        self.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }

    /// Whether this type is `other`, extends it, or implements it.
    pub fn is_of_type(&self, other: &TypeName) -> bool {
        let mut current = Some(self);
        while let Some(spec) = current {
            if &spec.type_name == other || spec.interfaces.contains(other) {
                return true;
            }
            current = spec.superclass.as_deref();
        }
        false
    }

    pub fn layout(&self) -> Option<&DomainObjectLayout> {
        match self.facet(FacetType::Layout).map(Facet::kind) {
            Some(FacetKind::Layout { layout, .. }) => Some(&**layout),
            _ => None,
        }
    }

    /// Layout node ids that matched no member.
    pub fn layout_orphans(&self) -> &[String] {
        match self.facet(FacetType::Layout).map(Facet::kind) {
            Some(FacetKind::Layout { orphans, .. }) => orphans.as_slice(),
            _ => &[],
        }
    }

    /// Referenced types: association types and action return/parameter types.
    pub fn referenced_types(&self) -> Vec<TypeName> {
        let mut types: Vec<TypeName> = Vec::new();
        let mut push = |type_ref: &TypeRef| {
            if !type_ref.is_void() && !types.contains(type_ref.element_type()) {
                types.push(type_ref.element_type().clone());
            }
        };
        for association in &self.associations {
            push(&association.type_ref);
        }
        for action in &self.actions {
            push(&action.return_type);
            for parameter in &action.parameters {
                push(&parameter.type_ref);
            }
        }
        types
    }
}

impl FacetedElement for ObjectSpecification {
    fn holder(&self) -> &FacetHolder {
        &self.holder
    }
}

/// Hidden-ness of a member, for display.
pub fn hidden_where(element: &impl FacetedElement) -> Option<Where> {
    match element.facet(FacetType::Hidden).map(Facet::kind) {
        Some(FacetKind::Hidden { at }) => Some(*at),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered(id: &str, index: usize, sequence: Option<&str>) -> ObjectAssociation {
        let mut association =
            ObjectAssociation::new(id, FeatureType::Property, TypeRef::scalar("string"), index);
        if let Some(sequence) = sequence {
            association.holder_mut().add_facet(Facet::new(FacetKind::MemberOrder {
                name: "General".into(),
                sequence: sequence.into(),
            }));
        }
        association
    }

    #[test]
    fn publish_orders_members_by_dewey_then_declaration() {
        let mut staged = StagedSpecification::new(TypeName::new("Customer"));
        staged.associations = vec![
            ordered("unordered", 0, None),
            ordered("ten", 1, Some("10")),
            ordered("two", 2, Some("2")),
            ordered("two_one", 3, Some("2.1")),
            ordered("also_two", 4, Some("2")),
        ];
        let spec = staged.publish();
        let ids: Vec<_> = spec.properties().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["two", "also_two", "two_one", "ten", "unordered"]);
    }

    #[test]
    fn filters_exclude_hidden_and_disabled() {
        let mut staged = StagedSpecification::new(TypeName::new("Customer"));
        let mut hidden = ordered("secret", 0, None);
        hidden.holder_mut().add_facet(Facet::new(FacetKind::Hidden {
            at: Where::Everywhere,
        }));
        let mut table_hidden = ordered("notes", 1, None);
        table_hidden.holder_mut().add_facet(Facet::new(FacetKind::Hidden {
            at: Where::AllTables,
        }));
        let mut disabled = ordered("code", 2, None);
        disabled.holder_mut().add_facet(Facet::new(FacetKind::Disabled {
            reason: None,
            at: Where::Anywhere,
        }));
        staged.associations = vec![hidden, table_hidden, disabled];
        let spec = staged.publish();

        assert_eq!(spec.associations(MemberFilter::All).count(), 3);
        assert_eq!(spec.associations(MemberFilter::Visible).count(), 2);
        let enabled: Vec<_> = spec.associations(MemberFilter::Enabled).map(|a| a.id()).collect();
        assert_eq!(enabled, vec!["notes"]);
    }

    #[test]
    fn hierarchy_queries_walk_superclasses() {
        let mut base = StagedSpecification::new(TypeName::new("Party"));
        base.interfaces.push(TypeName::new("Auditable"));
        base.holder.add_facet(Facet::new(FacetKind::CssClass {
            class: "party".into(),
        }));
        let base = Arc::new(base.publish());

        let mut staged = StagedSpecification::new(TypeName::new("Customer"));
        staged.superclass = Some(base);
        let spec = staged.publish();

        assert!(spec.is_of_type(&TypeName::new("Party")));
        assert!(spec.is_of_type(&TypeName::new("Auditable")));
        assert!(!spec.is_of_type(&TypeName::new("Order")));
        assert!(spec.facet(FacetType::CssClass).is_none());
        assert_eq!(
            spec.facet_in_hierarchy(FacetType::CssClass).and_then(Facet::text),
            Some("party")
        );
    }

    #[test]
    fn kind_and_names() {
        let mut staged = StagedSpecification::new(TypeName::new("sales.OrderLine"));
        staged.holder.add_facet(Facet::new(FacetKind::Persistable {
            identity: crate::domain::value_objects::IdentityType::Datastore,
        }));
        let spec = staged.publish();
        assert_eq!(spec.kind(), ObjectKind::Entity);
        assert_eq!(spec.title_name(), "Order Line");
        assert_eq!(spec.spec_id(), "sales.OrderLine");
    }
}
