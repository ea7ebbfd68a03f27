//! Overwrite phase: reconcile member facets with a derived layout.
//!
//! For every node that maps to a real member:
//! - a value configured on the node is installed as the member's facet;
//! - a value the node leaves open is filled in from the member's facet;
//! - a `MemberOrder` facet is assigned from the node's structural parent
//!   and a per-group sequence counter;
//! - the member is told its position in the walk, which becomes its place
//!   in the published member order.
//!
//! Facets are only reinstalled when their payload changes, so a second pass
//! over the same tree leaves every facet and every node untouched.

use std::collections::HashMap;

use crate::domain::facet::{Facet, FacetKind, FacetType};
use crate::domain::facet_holder::FacetHolder;
use crate::domain::value_objects::{ActionPosition, CssPosition, FeatureType, Where};

use super::{ActionLayout, CollectionLayout, DomainObjectLayout, PropertyLayout};

/// Mutable access to the members a layout refers to.
pub trait LayoutMembers {
    /// The holder of the member `id`, if one of kind `feature` exists.
    fn member_holder_mut(&mut self, feature: FeatureType, id: &str) -> Option<&mut FacetHolder>;

    /// Record that the node for member `id` is the `position`-th wired node.
    fn place_member(&mut self, feature: FeatureType, id: &str, position: usize);
}

// ── Counters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SequenceCounter(HashMap<String, u32>);

impl SequenceCounter {
    fn next(&mut self, group: &str) -> String {
        let counter = self.0.entry(group.to_string()).or_insert(0);
        *counter += 1;
        counter.to_string()
    }
}

#[derive(Debug, Default)]
struct Counters {
    walk: usize,
    properties: SequenceCounter,
    collections: SequenceCounter,
    group_actions: SequenceCounter,
    property_actions: SequenceCounter,
    collection_actions: SequenceCounter,
    object_actions: SequenceCounter,
}

impl Counters {
    fn place(&mut self, members: &mut dyn LayoutMembers, feature: FeatureType, id: &str) {
        members.place_member(feature, id, self.walk);
        self.walk += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionParent {
    Object,
    PropertyGroup,
    Property,
    Collection,
}

impl ActionParent {
    /// Allowed positions per parent kind; anything else snaps to the default.
    fn normalize(self, declared: Option<ActionPosition>) -> Option<ActionPosition> {
        match self {
            Self::Object => declared,
            Self::PropertyGroup | Self::Collection => match declared {
                Some(ActionPosition::PanelDropdown) => Some(ActionPosition::PanelDropdown),
                _ => Some(ActionPosition::Panel),
            },
            Self::Property => match declared {
                Some(ActionPosition::Right) => Some(ActionPosition::Right),
                _ => Some(ActionPosition::Below),
            },
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

/// Run the overwrite walk. Returns the ids of nodes that match no member.
pub fn overwrite(layout: &mut DomainObjectLayout, members: &mut dyn LayoutMembers) -> Vec<String> {
    let mut counters = Counters::default();
    let mut orphans = Vec::new();

    for action in &mut layout.actions {
        overwrite_action(action, ActionParent::Object, "", &mut counters, members, &mut orphans);
    }

    for tab_group in &mut layout.tab_groups {
        for tab in &mut tab_group.tabs {
            let mut tab_name = None;
            for column in &mut tab.columns {
                let single_item = column.item_count() == 1;

                for group in &mut column.property_groups {
                    for action in &mut group.actions {
                        overwrite_action(
                            action,
                            ActionParent::PropertyGroup,
                            &group.name,
                            &mut counters,
                            members,
                            &mut orphans,
                        );
                    }
                    for property in &mut group.properties {
                        overwrite_property(property, &group.name, &mut counters, members, &mut orphans);
                        for action in &mut property.actions {
                            overwrite_action(
                                action,
                                ActionParent::Property,
                                &property.id,
                                &mut counters,
                                members,
                                &mut orphans,
                            );
                        }
                    }
                }

                for collection in &mut column.collections {
                    let wired = overwrite_collection(collection, &mut counters, members, &mut orphans);
                    if wired && single_item {
                        tab_name = Some(collection.id.clone());
                    }
                    for action in &mut collection.actions {
                        overwrite_action(
                            action,
                            ActionParent::Collection,
                            &collection.id,
                            &mut counters,
                            members,
                            &mut orphans,
                        );
                    }
                }
            }
            if let Some(name) = tab_name {
                tab.name = name;
            }
        }
    }

    orphans
}

// ── Facet reconciliation ─────────────────────────────────────────────────────

/// Install `kind` unless the holder already carries exactly that payload.
fn install(holder: &mut FacetHolder, kind: FacetKind) {
    match holder.facet(kind.facet_type()) {
        Some(existing) if existing.kind() == &kind => {}
        Some(existing) => {
            let facet = Facet::decorating(kind, existing);
            holder.add_facet(facet);
        }
        None => {
            holder.add_facet(Facet::new(kind));
        }
    }
}

/// Node value wins when present; otherwise the node is filled from the member.
fn reconcile<T: Clone>(
    holder: &mut FacetHolder,
    node_value: &mut Option<T>,
    facet_type: FacetType,
    to_kind: impl Fn(T) -> FacetKind,
    from_facet: impl Fn(&Facet) -> Option<T>,
) {
    match node_value {
        Some(value) => install(holder, to_kind(value.clone())),
        None => *node_value = holder.facet(facet_type).and_then(from_facet),
    }
}

fn text_of(facet: &Facet) -> Option<String> {
    facet.text().map(str::to_string)
}

fn reconcile_common(
    holder: &mut FacetHolder,
    named: &mut Option<String>,
    described_as: &mut Option<String>,
    hidden: &mut Option<Where>,
    css_class: &mut Option<String>,
) {
    reconcile(holder, named, FacetType::Named, |text| FacetKind::Named { text }, text_of);
    reconcile(
        holder,
        described_as,
        FacetType::DescribedAs,
        |text| FacetKind::DescribedAs { text },
        text_of,
    );
    reconcile(
        holder,
        hidden,
        FacetType::Hidden,
        |at| FacetKind::Hidden { at },
        |f| match f.kind() {
            FacetKind::Hidden { at } => Some(*at),
            _ => None,
        },
    );
    reconcile(holder, css_class, FacetType::CssClass, |class| FacetKind::CssClass { class }, text_of);
}

// ── Node kinds ───────────────────────────────────────────────────────────────

fn overwrite_property(
    node: &mut PropertyLayout,
    group_name: &str,
    counters: &mut Counters,
    members: &mut dyn LayoutMembers,
    orphans: &mut Vec<String>,
) {
    let Some(holder) = members.member_holder_mut(FeatureType::Property, &node.id) else {
        orphans.push(node.id.clone());
        return;
    };

    reconcile_common(
        holder,
        &mut node.named,
        &mut node.described_as,
        &mut node.hidden,
        &mut node.css_class,
    );
    reconcile(
        holder,
        &mut node.label_position,
        FacetType::LabelAt,
        |position| FacetKind::LabelAt { position },
        |f| match f.kind() {
            FacetKind::LabelAt { position } => Some(*position),
            _ => None,
        },
    );
    reconcile(
        holder,
        &mut node.multi_line,
        FacetType::MultiLine,
        |lines| FacetKind::MultiLine { lines },
        Facet::number,
    );
    reconcile(
        holder,
        &mut node.render,
        FacetType::Render,
        |policy| FacetKind::Render { policy },
        |f| match f.kind() {
            FacetKind::Render { policy } => Some(*policy),
            _ => None,
        },
    );
    reconcile(
        holder,
        &mut node.typical_length,
        FacetType::TypicalLength,
        |value| FacetKind::TypicalLength { value },
        Facet::number,
    );

    let sequence = counters.properties.next(group_name);
    install(
        holder,
        FacetKind::MemberOrder {
            name: group_name.to_string(),
            sequence,
        },
    );
    counters.place(members, FeatureType::Property, &node.id);
}

/// Returns whether the node maps to a real collection.
fn overwrite_collection(
    node: &mut CollectionLayout,
    counters: &mut Counters,
    members: &mut dyn LayoutMembers,
    orphans: &mut Vec<String>,
) -> bool {
    let Some(holder) = members.member_holder_mut(FeatureType::Collection, &node.id) else {
        orphans.push(node.id.clone());
        return false;
    };

    reconcile_common(
        holder,
        &mut node.named,
        &mut node.described_as,
        &mut node.hidden,
        &mut node.css_class,
    );
    reconcile(
        holder,
        &mut node.default_view,
        FacetType::DefaultView,
        |view| FacetKind::DefaultView { view },
        text_of,
    );
    reconcile(
        holder,
        &mut node.paged,
        FacetType::Paged,
        |page_size| FacetKind::Paged { page_size },
        Facet::number,
    );
    reconcile(
        holder,
        &mut node.sorted_by,
        FacetType::SortedBy,
        |field| FacetKind::SortedBy { field },
        text_of,
    );

    let sequence = counters.collections.next(&node.id);
    install(
        holder,
        FacetKind::MemberOrder {
            name: node.id.clone(),
            sequence,
        },
    );
    counters.place(members, FeatureType::Collection, &node.id);
    true
}

fn overwrite_action(
    node: &mut ActionLayout,
    parent: ActionParent,
    parent_name: &str,
    counters: &mut Counters,
    members: &mut dyn LayoutMembers,
    orphans: &mut Vec<String>,
) {
    let Some(holder) = members.member_holder_mut(FeatureType::Action, &node.id) else {
        orphans.push(node.id.clone());
        return;
    };

    let counter = match parent {
        ActionParent::Object => &mut counters.object_actions,
        ActionParent::PropertyGroup => &mut counters.group_actions,
        ActionParent::Property => &mut counters.property_actions,
        ActionParent::Collection => &mut counters.collection_actions,
    };
    let sequence = counter.next(parent_name);

    let declared = node.position.or_else(|| match holder.facet(FacetType::ActionPosition) {
        Some(facet) => match facet.kind() {
            FacetKind::ActionPosition { position } => Some(*position),
            _ => None,
        },
        None => None,
    });
    node.position = parent.normalize(declared);
    if let Some(position) = node.position {
        install(holder, FacetKind::ActionPosition { position });
    }

    reconcile_common(
        holder,
        &mut node.named,
        &mut node.described_as,
        &mut node.hidden,
        &mut node.css_class,
    );
    reconcile(
        holder,
        &mut node.bookmarking,
        FacetType::Bookmarkable,
        |policy| FacetKind::Bookmarkable { policy },
        |f| match f.kind() {
            FacetKind::Bookmarkable { policy } => Some(*policy),
            _ => None,
        },
    );

    match &node.css_class_fa {
        Some(class) => install(
            holder,
            FacetKind::CssClassFa {
                class: class.clone(),
                position: node.css_class_fa_position.unwrap_or(CssPosition::Left),
            },
        ),
        None => {
            if let Some(FacetKind::CssClassFa { class, position }) =
                holder.facet(FacetType::CssClassFa).map(Facet::kind)
            {
                node.css_class_fa = Some(class.clone());
                node.css_class_fa_position = Some(*position);
            }
        }
    }

    install(
        holder,
        FacetKind::MemberOrder {
            name: parent_name.to_string(),
            sequence,
        },
    );
    counters.place(members, FeatureType::Action, &node.id);
}
