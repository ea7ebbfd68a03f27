//! Raw element descriptions.
//!
//! This is the reflection-like input of the metamodel: a class with its
//! declared members, their types and attributes (the stand-in for source
//! annotations). Class sources produce these; facet factories read them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::{FeatureType, TypeName};

// ── AttrValue / Attributes ───────────────────────────────────────────────────

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Int(i64),
    Text(String),
    List(Vec<AttrValue>),
    Table(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Named attributes of an element, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A flag attribute; a bare `true`/`false`. Absent means `false`.
    pub fn flag(&self, name: &str) -> Result<bool, DomainError> {
        match self.0.get(name) {
            None => Ok(false),
            Some(AttrValue::Flag(b)) => Ok(*b),
            Some(_) => Err(Self::shape(name, "a boolean")),
        }
    }

    /// A marker: `true`, or a string qualifying the marker.
    ///
    /// `Some(None)` for `true`, `Some(Some(text))` for a string, `None` when
    /// absent or `false`.
    pub fn marker(&self, name: &str) -> Result<Option<Option<&str>>, DomainError> {
        match self.0.get(name) {
            None | Some(AttrValue::Flag(false)) => Ok(None),
            Some(AttrValue::Flag(true)) => Ok(Some(None)),
            Some(AttrValue::Text(text)) => Ok(Some(Some(text))),
            Some(_) => Err(Self::shape(name, "a boolean or a string")),
        }
    }

    pub fn text(&self, name: &str) -> Result<Option<&str>, DomainError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(AttrValue::Text(text)) => Ok(Some(text)),
            Some(_) => Err(Self::shape(name, "a string")),
        }
    }

    /// A non-negative integer attribute.
    pub fn uint(&self, name: &str) -> Result<Option<u32>, DomainError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(AttrValue::Int(i)) => u32::try_from(*i)
                .map(Some)
                .map_err(|_| Self::shape(name, "a non-negative integer")),
            Some(_) => Err(Self::shape(name, "a non-negative integer")),
        }
    }

    pub fn table(&self, name: &str) -> Result<Option<&BTreeMap<String, AttrValue>>, DomainError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(AttrValue::Table(table)) => Ok(Some(table)),
            Some(_) => Err(Self::shape(name, "a table")),
        }
    }

    /// A string attribute parsed into one of the domain enums.
    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>, DomainError>
    where
        T: FromStr<Err = DomainError>,
    {
        self.text(name)?.map(str::parse).transpose()
    }

    fn shape(name: &str, expected: &'static str) -> DomainError {
        DomainError::InvalidAttribute {
            attribute: name.to_string(),
            expected,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── TypeRef ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    Array,
}

/// A declared type: either a single type or a collection of one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Scalar(TypeName),
    Collection {
        kind: CollectionKind,
        element: TypeName,
    },
}

impl TypeRef {
    pub fn scalar(name: impl Into<TypeName>) -> Self {
        Self::Scalar(name.into())
    }

    pub fn void() -> Self {
        Self::Scalar(TypeName::new("void"))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Scalar(name) if name.as_str() == "void")
    }

    /// The type a consumer must load to understand this reference.
    pub fn element_type(&self) -> &TypeName {
        match self {
            Self::Scalar(name) => name,
            Self::Collection { element, .. } => element,
        }
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        Self::void()
    }
}

fn valid_type_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '$'))
}

impl FromStr for TypeRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || DomainError::InvalidTypeRef(s.to_string());

        let (kind, inner) = if let Some(inner) = trimmed
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            (Some(CollectionKind::List), inner)
        } else if let Some(inner) = trimmed
            .strip_prefix("set<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            (Some(CollectionKind::Set), inner)
        } else if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            (Some(CollectionKind::Array), inner)
        } else {
            (None, trimmed)
        };

        let inner = inner.trim();
        if !valid_type_name(inner) {
            return Err(invalid());
        }
        let element = TypeName::new(inner);
        Ok(match kind {
            Some(kind) => Self::Collection { kind, element },
            None => Self::Scalar(element),
        })
    }
}

impl TryFrom<String> for TypeRef {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeRef> for String {
    fn from(t: TypeRef) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(name) => write!(f, "{name}"),
            Self::Collection {
                kind: CollectionKind::List,
                element,
            } => write!(f, "list<{element}>"),
            Self::Collection {
                kind: CollectionKind::Set,
                element,
            } => write!(f, "set<{element}>"),
            Self::Collection {
                kind: CollectionKind::Array,
                element,
            } => write!(f, "[{element}]"),
        }
    }
}

// ── Raw elements ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Field,
    Method,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl RawParam {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(rename = "type", default)]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<RawParam>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl RawMember {
    pub fn field(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            type_ref,
            params: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn method(name: impl Into<String>, returns: TypeRef) -> Self {
        Self {
            kind: MemberKind::Method,
            ..Self::field(name, returns)
        }
    }

    pub fn with_param(mut self, param: RawParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Feature type of this member, ignoring support-method conventions.
    pub fn feature_type(&self) -> FeatureType {
        match (self.kind, self.type_ref.is_collection()) {
            (MemberKind::Method, _) => FeatureType::Action,
            (MemberKind::Field, true) => FeatureType::Collection,
            (MemberKind::Field, false) => FeatureType::Property,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClass {
    pub name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeName>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default)]
    pub members: Vec<RawMember>,
}

impl RawClass {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            attributes: Attributes::new(),
            members: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<TypeName>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn with_member(mut self, member: RawMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn member(&self, name: &str) -> Option<&RawMember> {
        self.members.iter().find(|m| m.name == name)
    }
}
