//! Domain value objects: type names, feature types and the small enums carried
//! by facet payloads and layout nodes.
//!
//! # Design
//!
//! These are pure value types: `Copy` where possible, equality-by-value, no
//! identity. Each enum owns its string representation (`as_str`) and its
//! `FromStr` parser, so attribute values and layout files share one spelling.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

// ── TypeName ─────────────────────────────────────────────────────────────────

/// The raw (implementation) name of a domain type, e.g. `"Customer"`.
///
/// This is the cache key of the specification loader. The *logical* name used
/// for persistence and serialization lives in the `ObjectSpecId` facet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Simple name without any module/package qualification.
    pub fn simple_name(&self) -> &str {
        self.0
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── FeatureType ──────────────────────────────────────────────────────────────

/// Classification of a program element; used to route facet factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    Object,
    Property,
    Collection,
    Action,
    ActionParameter,
}

impl FeatureType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Property => "property",
            Self::Collection => "collection",
            Self::Action => "action",
            Self::ActionParameter => "action-parameter",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Object => 1,
            Self::Property => 1 << 1,
            Self::Collection => 1 << 2,
            Self::Action => 1 << 3,
            Self::ActionParameter => 1 << 4,
        }
    }

    pub const fn is_association(&self) -> bool {
        matches!(self, Self::Property | Self::Collection)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of feature types a facet factory declares interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureTypes(u8);

impl FeatureTypes {
    pub const NONE: Self = Self(0);
    pub const OBJECT: Self = Self(FeatureType::Object.bit());
    pub const PROPERTIES: Self = Self(FeatureType::Property.bit());
    pub const COLLECTIONS: Self = Self(FeatureType::Collection.bit());
    pub const ACTIONS: Self = Self(FeatureType::Action.bit());
    pub const PARAMETERS: Self = Self(FeatureType::ActionParameter.bit());
    pub const ASSOCIATIONS: Self = Self(Self::PROPERTIES.0 | Self::COLLECTIONS.0);
    pub const MEMBERS: Self = Self(Self::ASSOCIATIONS.0 | Self::ACTIONS.0);
    pub const PROPERTIES_AND_PARAMETERS: Self = Self(Self::PROPERTIES.0 | Self::PARAMETERS.0);
    pub const EVERYTHING_BUT_PARAMETERS: Self = Self(Self::OBJECT.0 | Self::MEMBERS.0);
    pub const EVERYTHING: Self = Self(Self::EVERYTHING_BUT_PARAMETERS.0 | Self::PARAMETERS.0);

    pub const fn contains(&self, feature: FeatureType) -> bool {
        self.0 & feature.bit() != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FeatureTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl From<FeatureType> for FeatureTypes {
    fn from(feature: FeatureType) -> Self {
        Self(feature.bit())
    }
}

// ── Macro for the string-backed enums ────────────────────────────────────────

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// textual form is shared between attributes and layout files.
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
                match normalized.as_str() {
                    $($text $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(DomainError::InvalidValue {
                        kind: stringify!($ty),
                        value: s.to_string(),
                        expected: vec![$($text),+].join(", "),
                    }),
                }
            }
        }
    };
}

// ── Where ────────────────────────────────────────────────────────────────────

/// Where a member is hidden (or disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Where {
    Everywhere,
    Anywhere,
    ObjectForms,
    AllTables,
    ParentedTables,
    StandaloneTables,
    Nowhere,
}

string_enum!(Where {
    Everywhere => "everywhere",
    Anywhere => "anywhere",
    ObjectForms => "object-forms",
    AllTables => "all-tables",
    ParentedTables => "parented-tables",
    StandaloneTables => "standalone-tables",
    Nowhere => "nowhere",
});

impl Where {
    /// Whether a member hidden here is never shown at all.
    pub const fn is_always(&self) -> bool {
        matches!(self, Self::Everywhere | Self::Anywhere)
    }
}

// ── Layout-related enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPosition {
    Left,
    Top,
    Right,
    None,
}

string_enum!(LabelPosition {
    Left => "left",
    Top => "top",
    Right => "right",
    None => "none",
});

/// Where an action's button is rendered relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionPosition {
    Below,
    Right,
    Panel,
    PanelDropdown,
}

string_enum!(ActionPosition {
    Below => "below",
    Right => "right",
    Panel => "panel",
    PanelDropdown => "panel-dropdown" | "dropdown",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookmarkPolicy {
    Never,
    AsRoot,
    AsChild,
}

string_enum!(BookmarkPolicy {
    Never => "never",
    AsRoot => "as-root" | "root",
    AsChild => "as-child" | "child",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderPolicy {
    Eagerly,
    Lazily,
}

string_enum!(RenderPolicy {
    Eagerly => "eagerly",
    Lazily => "lazily",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CssPosition {
    Left,
    Right,
}

string_enum!(CssPosition {
    Left => "left",
    Right => "right",
});

// ── Behavioural enums ────────────────────────────────────────────────────────

/// Side-effect semantics of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticsOf {
    Safe,
    Idempotent,
    NonIdempotent,
}

string_enum!(SemanticsOf {
    Safe => "safe" | "query-only",
    Idempotent => "idempotent",
    NonIdempotent => "non-idempotent",
});

/// How persistent instances are identified by the persistence mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityType {
    Application,
    Datastore,
    Unspecified,
}

string_enum!(IdentityType {
    Application => "application",
    Datastore => "datastore",
    Unspecified => "unspecified",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceNature {
    Domain,
    View,
    Menu,
}

string_enum!(ServiceNature {
    Domain => "domain",
    View => "view",
    Menu => "menu",
});

/// Coarse classification of a specification, derived from its facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Value,
    Entity,
    ViewModel,
    Service,
    /// None of the above: a plain, non-persistent domain type.
    Plain,
}

string_enum!(ObjectKind {
    Value => "value",
    Entity => "entity",
    ViewModel => "view-model",
    Service => "service",
    Plain => "plain",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_types_membership() {
        assert!(FeatureTypes::MEMBERS.contains(FeatureType::Action));
        assert!(FeatureTypes::MEMBERS.contains(FeatureType::Collection));
        assert!(!FeatureTypes::MEMBERS.contains(FeatureType::Object));
        assert!(!FeatureTypes::MEMBERS.contains(FeatureType::ActionParameter));

        let custom = FeatureTypes::OBJECT | FeatureTypes::PARAMETERS;
        assert!(custom.contains(FeatureType::Object));
        assert!(custom.contains(FeatureType::ActionParameter));
        assert!(!custom.contains(FeatureType::Property));
        assert!(FeatureTypes::NONE.is_empty());
    }

    #[test]
    fn where_parses_with_underscores_and_case() {
        assert_eq!(Where::from_str("ALL_TABLES").unwrap(), Where::AllTables);
        assert_eq!(Where::from_str("object-forms").unwrap(), Where::ObjectForms);
        assert!(Where::from_str("sideways").is_err());
    }

    #[test]
    fn action_position_alias() {
        assert_eq!(
            ActionPosition::from_str("dropdown").unwrap(),
            ActionPosition::PanelDropdown
        );
        assert_eq!(ActionPosition::PanelDropdown.as_str(), "panel-dropdown");
    }

    #[test]
    fn invalid_value_lists_expected_spellings() {
        let err = SemanticsOf::from_str("risky").unwrap_err();
        assert!(err.to_string().contains("idempotent"));
    }

    #[test]
    fn type_name_simple_name() {
        assert_eq!(TypeName::from("com.acme.Customer").simple_name(), "Customer");
        assert_eq!(TypeName::from("billing::Invoice").simple_name(), "Invoice");
        assert_eq!(TypeName::from("Order").simple_name(), "Order");
    }
}
