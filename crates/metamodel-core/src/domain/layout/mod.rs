//! Object layout tree.
//!
//! ```text
//! DomainObjectLayout
//! ├── actions            (header actions)
//! └── tab_groups
//!     └── tabs
//!         └── columns
//!             ├── property_groups ── properties ── actions
//!             │                   └─ actions
//!             └── collections ── actions
//! ```
//!
//! Layout documents are JSON (`<Type>.layout.json`). Every node may or may
//! not correspond to a real member; [`derive`] makes the tree complete and
//! [`overwrite`] reconciles member facets with it.

pub mod derive;
pub mod overwrite;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::{
    ActionPosition, BookmarkPolicy, CssPosition, LabelPosition, RenderPolicy, Where,
};

pub use derive::{CatalogAction, DeriveReport, LayoutCatalog, derive};
pub use overwrite::{LayoutMembers, overwrite};

/// Name of the property group that collects unplaced properties.
pub const GENERAL_GROUP: &str = "General";

/// Width of a full row in the layout grid.
pub const FULL_SPAN: u8 = 12;

fn full_span() -> u8 {
    FULL_SPAN
}

// ── Tree nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainObjectLayout {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLayout>,
    #[serde(default)]
    pub tab_groups: Vec<TabGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Tab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default = "full_span")]
    pub span: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_groups: Vec<PropertyGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionLayout>,
}

impl Column {
    pub fn new(span: u8) -> Self {
        Self {
            span,
            property_groups: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Number of direct content items (property groups and collections).
    pub fn item_count(&self) -> usize {
        self.property_groups.len() + self.collections.len()
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::new(FULL_SPAN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLayout>,
    #[serde(default)]
    pub properties: Vec<PropertyLayout>,
    /// Set when the group was created by derive rather than authored.
    #[serde(skip)]
    pub synthesized: bool,
}

impl PropertyGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            properties: Vec::new(),
            synthesized: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub described_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Where>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<LabelPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLayout>,
}

impl PropertyLayout {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub described_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Where>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paged: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLayout>,
}

impl CollectionLayout {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub described_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Where>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class_fa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class_fa_position: Option<CssPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ActionPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarking: Option<BookmarkPolicy>,
}

impl ActionLayout {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

// ── Parsing & queries ────────────────────────────────────────────────────────

impl DomainObjectLayout {
    /// Parse and check a layout document.
    pub fn from_json(type_name: &str, json: &str) -> Result<Self, DomainError> {
        let layout: Self = serde_json::from_str(json).map_err(|e| DomainError::LayoutParse {
            type_name: type_name.to_string(),
            reason: e.to_string(),
        })?;
        layout.check(type_name)?;
        Ok(layout)
    }

    pub fn to_json_pretty(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::InvalidLayout {
            type_name: String::new(),
            reason: e.to_string(),
        })
    }

    fn check(&self, type_name: &str) -> Result<(), DomainError> {
        for tab in self.tabs() {
            for column in &tab.columns {
                if column.span == 0 || column.span > FULL_SPAN {
                    return Err(DomainError::InvalidLayout {
                        type_name: type_name.to_string(),
                        reason: format!(
                            "column in tab '{}' has span {} (must be 1..={FULL_SPAN})",
                            tab.name, column.span
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tab_groups.iter().flat_map(|g| g.tabs.iter())
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.tabs().flat_map(|t| t.columns.iter())
    }

    pub fn property_groups(&self) -> impl Iterator<Item = &PropertyGroup> {
        self.columns().flat_map(|c| c.property_groups.iter())
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyLayout> {
        self.property_groups().flat_map(|g| g.properties.iter())
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionLayout> {
        self.columns().flat_map(|c| c.collections.iter())
    }

    /// Every action node, wherever it hangs.
    pub fn all_actions(&self) -> impl Iterator<Item = &ActionLayout> {
        let header = self.actions.iter();
        let groups = self.property_groups().flat_map(|g| g.actions.iter());
        let properties = self.properties().flat_map(|p| p.actions.iter());
        let collections = self.collections().flat_map(|c| c.actions.iter());
        header.chain(groups).chain(properties).chain(collections)
    }

    /// Every member id referenced by any node, in walk order.
    pub fn referenced_ids(&self) -> Vec<&str> {
        self.properties()
            .map(|p| p.id.as_str())
            .chain(self.collections().map(|c| c.id.as_str()))
            .chain(self.all_actions().map(|a| a.id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "actions": [ { "id": "archive" } ],
        "tabGroups": [ {
            "tabs": [ {
                "name": "Details",
                "columns": [ {
                    "span": 6,
                    "propertyGroups": [ {
                        "name": "Identity",
                        "properties": [
                            { "id": "name", "labelPosition": "top", "named": "Full name" }
                        ]
                    } ],
                    "collections": [ { "id": "orders", "paged": 5 } ]
                } ]
            } ]
        } ]
    }"#;

    #[test]
    fn parses_camel_case_document() {
        let layout = DomainObjectLayout::from_json("Customer", SAMPLE).unwrap();
        let name = layout.properties().next().unwrap();
        assert_eq!(name.label_position, Some(LabelPosition::Top));
        assert_eq!(name.named.as_deref(), Some("Full name"));
        assert_eq!(layout.collections().next().unwrap().paged, Some(5));
        assert_eq!(layout.referenced_ids(), vec!["name", "orders", "archive"]);
    }

    #[test]
    fn missing_span_defaults_to_full_width() {
        let layout = DomainObjectLayout::from_json(
            "Customer",
            r#"{ "tabGroups": [ { "tabs": [ { "name": "T", "columns": [ {} ] } ] } ] }"#,
        )
        .unwrap();
        assert_eq!(layout.columns().next().unwrap().span, FULL_SPAN);
    }

    #[test]
    fn rejects_out_of_range_span() {
        let err = DomainObjectLayout::from_json(
            "Customer",
            r#"{ "tabGroups": [ { "tabs": [ { "name": "T", "columns": [ { "span": 13 } ] } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidLayout { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = DomainObjectLayout::from_json("Customer", "{ not json").unwrap_err();
        assert!(matches!(err, DomainError::LayoutParse { .. }));
    }
}
