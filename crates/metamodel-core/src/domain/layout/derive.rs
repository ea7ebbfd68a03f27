//! Derive phase: make a layout reference every real member exactly once.
//!
//! The walk order used everywhere in this module is the document order:
//! tab groups, tabs, columns, property groups, properties, collections; for
//! actions the header list first, then group, property and collection
//! actions. "First matching node" always means first in that order.

use std::collections::HashSet;

use super::{
    ActionLayout, CollectionLayout, Column, DomainObjectLayout, FULL_SPAN, GENERAL_GROUP,
    PropertyGroup, PropertyLayout, Tab, TabGroup,
};

/// The real members of a type, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutCatalog {
    pub properties: Vec<String>,
    pub collections: Vec<String>,
    pub actions: Vec<CatalogAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAction {
    pub id: String,
    /// Group name of the action's `MemberOrder` facet, if any. Used to hang
    /// the action off the property or collection of that name.
    pub member_order_name: Option<String>,
}

impl CatalogAction {
    pub fn new(id: impl Into<String>, member_order_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            member_order_name,
        }
    }
}

/// What derive changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeriveReport {
    /// Ids whose later duplicate nodes were removed.
    pub duplicates: Vec<String>,
    /// Ids of real members referenced by a node of the wrong kind. Those
    /// nodes are removed and the member is placed again as missing.
    pub misplaced: Vec<String>,
    pub created_general_group: bool,
    pub added_properties: Vec<String>,
    pub added_collections: Vec<String>,
    pub added_actions: Vec<String>,
}

impl DeriveReport {
    pub fn changed(&self) -> bool {
        !self.duplicates.is_empty()
            || !self.misplaced.is_empty()
            || !self.added_properties.is_empty()
            || !self.added_collections.is_empty()
            || !self.added_actions.is_empty()
    }
}

/// Complete `layout` so that each catalog member has exactly one node.
pub fn derive(layout: &mut DomainObjectLayout, catalog: &LayoutCatalog) -> DeriveReport {
    let mut report = DeriveReport::default();

    remove_duplicates(layout, &mut report);
    remove_misplaced(layout, catalog, &mut report);
    add_missing_properties(layout, catalog, &mut report);
    add_missing_collections(layout, catalog, &mut report);
    add_missing_actions(layout, catalog, &mut report);

    report
}

// ── Walk helpers ─────────────────────────────────────────────────────────────

fn columns_mut(layout: &mut DomainObjectLayout) -> impl Iterator<Item = &mut Column> {
    layout
        .tab_groups
        .iter_mut()
        .flat_map(|g| g.tabs.iter_mut())
        .flat_map(|t| t.columns.iter_mut())
}

fn property_node_mut<'a>(
    layout: &'a mut DomainObjectLayout,
    id: &str,
) -> Option<&'a mut PropertyLayout> {
    columns_mut(layout)
        .flat_map(|c| c.property_groups.iter_mut())
        .flat_map(|g| g.properties.iter_mut())
        .find(|p| p.id == id)
}

fn collection_node_mut<'a>(
    layout: &'a mut DomainObjectLayout,
    id: &str,
) -> Option<&'a mut CollectionLayout> {
    columns_mut(layout)
        .flat_map(|c| c.collections.iter_mut())
        .find(|c| c.id == id)
}

fn first_occurrence(seen: &mut HashSet<String>, duplicates: &mut Vec<String>, id: &str) -> bool {
    if seen.insert(id.to_string()) {
        true
    } else {
        duplicates.push(id.to_string());
        false
    }
}

// ── Phases ───────────────────────────────────────────────────────────────────

fn remove_duplicates(layout: &mut DomainObjectLayout, report: &mut DeriveReport) {
    let mut properties = HashSet::new();
    let mut collections = HashSet::new();
    let mut actions = HashSet::new();
    let duplicates = &mut report.duplicates;

    for column in columns_mut(layout) {
        for group in &mut column.property_groups {
            group
                .properties
                .retain(|p| first_occurrence(&mut properties, duplicates, &p.id));
        }
        column
            .collections
            .retain(|c| first_occurrence(&mut collections, duplicates, &c.id));
    }

    layout
        .actions
        .retain(|a| first_occurrence(&mut actions, duplicates, &a.id));
    for column in columns_mut(layout) {
        for group in &mut column.property_groups {
            group
                .actions
                .retain(|a| first_occurrence(&mut actions, duplicates, &a.id));
        }
    }
    for column in columns_mut(layout) {
        for group in &mut column.property_groups {
            for property in &mut group.properties {
                property
                    .actions
                    .retain(|a| first_occurrence(&mut actions, duplicates, &a.id));
            }
        }
    }
    for column in columns_mut(layout) {
        for collection in &mut column.collections {
            collection
                .actions
                .retain(|a| first_occurrence(&mut actions, duplicates, &a.id));
        }
    }
}

/// The real member kinds an id belongs to, from the catalog.
struct Kinds<'a> {
    properties: HashSet<&'a str>,
    collections: HashSet<&'a str>,
    actions: HashSet<&'a str>,
}

impl<'a> Kinds<'a> {
    fn of(catalog: &'a LayoutCatalog) -> Self {
        Self {
            properties: catalog.properties.iter().map(String::as_str).collect(),
            collections: catalog.collections.iter().map(String::as_str).collect(),
            actions: catalog.actions.iter().map(|a| a.id.as_str()).collect(),
        }
    }

    fn is_member(&self, id: &str) -> bool {
        self.properties.contains(id) || self.collections.contains(id) || self.actions.contains(id)
    }
}

/// Keep a node unless it names a real member of another kind.
fn keep_node(
    own: &HashSet<&str>,
    kinds: &Kinds<'_>,
    misplaced: &mut Vec<String>,
    id: &str,
) -> bool {
    if own.contains(id) || !kinds.is_member(id) {
        true
    } else {
        misplaced.push(id.to_string());
        false
    }
}

fn remove_misplaced(
    layout: &mut DomainObjectLayout,
    catalog: &LayoutCatalog,
    report: &mut DeriveReport,
) {
    let kinds = Kinds::of(catalog);
    let misplaced = &mut report.misplaced;

    layout
        .actions
        .retain(|a| keep_node(&kinds.actions, &kinds, misplaced, &a.id));
    for column in columns_mut(layout) {
        for group in &mut column.property_groups {
            group
                .actions
                .retain(|a| keep_node(&kinds.actions, &kinds, misplaced, &a.id));
            group
                .properties
                .retain(|p| keep_node(&kinds.properties, &kinds, misplaced, &p.id));
            for property in &mut group.properties {
                property
                    .actions
                    .retain(|a| keep_node(&kinds.actions, &kinds, misplaced, &a.id));
            }
        }
        column
            .collections
            .retain(|c| keep_node(&kinds.collections, &kinds, misplaced, &c.id));
        for collection in &mut column.collections {
            collection
                .actions
                .retain(|a| keep_node(&kinds.actions, &kinds, misplaced, &a.id));
        }
    }
}

/// Position of the first "General" group, or of a newly created one.
fn ensure_general_group(layout: &mut DomainObjectLayout) -> (&mut PropertyGroup, bool) {
    let mut found = None;
    'search: for (gi, group) in layout.tab_groups.iter().enumerate() {
        for (ti, tab) in group.tabs.iter().enumerate() {
            for (ci, column) in tab.columns.iter().enumerate() {
                if let Some(pi) = column
                    .property_groups
                    .iter()
                    .position(|pg| pg.name == GENERAL_GROUP)
                {
                    found = Some((gi, ti, ci, pi));
                    break 'search;
                }
            }
        }
    }

    if let Some((gi, ti, ci, pi)) = found {
        let group = &mut layout.tab_groups[gi].tabs[ti].columns[ci].property_groups[pi];
        return (group, false);
    }

    if layout.tab_groups.is_empty() {
        layout.tab_groups.push(TabGroup::default());
    }
    let tab_group = &mut layout.tab_groups[0];
    if tab_group.tabs.is_empty() {
        tab_group.tabs.push(Tab::new(GENERAL_GROUP));
    }
    let tab = &mut tab_group.tabs[0];
    if tab.columns.is_empty() {
        tab.columns.push(Column::new(FULL_SPAN));
    }
    let column = &mut tab.columns[0];
    let mut group = PropertyGroup::new(GENERAL_GROUP);
    group.synthesized = true;
    column.property_groups.push(group);
    let index = column.property_groups.len() - 1;
    (&mut column.property_groups[index], true)
}

fn add_missing_properties(
    layout: &mut DomainObjectLayout,
    catalog: &LayoutCatalog,
    report: &mut DeriveReport,
) {
    let referenced: HashSet<&str> = layout.referenced_ids().into_iter().collect();
    let missing: Vec<String> = catalog
        .properties
        .iter()
        .filter(|id| !referenced.contains(id.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        return;
    }

    let (group, created) = ensure_general_group(layout);
    group
        .properties
        .extend(missing.iter().map(PropertyLayout::new));
    report.created_general_group = created;
    report.added_properties = missing;
}

fn add_missing_collections(
    layout: &mut DomainObjectLayout,
    catalog: &LayoutCatalog,
    report: &mut DeriveReport,
) {
    let referenced: HashSet<&str> = layout.referenced_ids().into_iter().collect();
    let missing: Vec<String> = catalog
        .collections
        .iter()
        .filter(|id| !referenced.contains(id.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        return;
    }

    while layout.tab_groups.len() < 2 {
        layout.tab_groups.push(TabGroup::default());
    }
    if let Some(last) = layout.tab_groups.last_mut() {
        for id in &missing {
            let mut column = Column::new(FULL_SPAN);
            column.collections.push(CollectionLayout::new(id));
            let mut tab = Tab::new(id.as_str());
            tab.columns.push(column);
            last.tabs.push(tab);
        }
    }
    report.added_collections = missing;
}

fn add_missing_actions(
    layout: &mut DomainObjectLayout,
    catalog: &LayoutCatalog,
    report: &mut DeriveReport,
) {
    let referenced: HashSet<String> = layout
        .referenced_ids()
        .into_iter()
        .map(str::to_string)
        .collect();

    for action in &catalog.actions {
        if referenced.contains(&action.id) {
            continue;
        }
        let node = ActionLayout::new(&action.id);
        match action.member_order_name.as_deref() {
            Some(owner) if !owner.is_empty() => {
                if let Some(property) = property_node_mut(layout, owner) {
                    property.actions.push(node);
                } else if let Some(collection) = collection_node_mut(layout, owner) {
                    collection.actions.push(node);
                } else {
                    layout.actions.push(node);
                }
            }
            _ => layout.actions.push(node),
        }
        report.added_actions.push(action.id.clone());
    }
}
