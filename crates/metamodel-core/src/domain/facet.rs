//! Facets: immutable units of derived behaviour.
//!
//! A facet is looked up by its concern tag ([`FacetType`]) and carries a
//! payload ([`FacetKind`]). Facets are never patched in place; a holder
//! replaces them wholesale according to the precedence rules in
//! [`Facet::may_replace`].

use std::fmt;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::layout::DomainObjectLayout;
use crate::domain::value_objects::{
    ActionPosition, BookmarkPolicy, CssPosition, IdentityType, LabelPosition, RenderPolicy,
    SemanticsOf, ServiceNature, TypeName, Where,
};

// ── FacetType ────────────────────────────────────────────────────────────────

/// Stable token identifying the concern a facet addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetType {
    ObjectSpecId,
    Value,
    Persistable,
    ViewModel,
    DomainService,
    Immutable,
    Named,
    Plural,
    DescribedAs,
    CssClass,
    CssClassFa,
    Hidden,
    HiddenViaMethod,
    Disabled,
    DisabledViaMethod,
    Mandatory,
    MaxLength,
    TypicalLength,
    MultiLine,
    Regex,
    MemberOrder,
    LabelAt,
    Render,
    DefaultView,
    Paged,
    SortedBy,
    TypeOf,
    ActionSemantics,
    ActionPosition,
    Bookmarkable,
    Choices,
    Default,
    Validate,
    AutoComplete,
    Layout,
}

impl FacetType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectSpecId => "object-spec-id",
            Self::Value => "value",
            Self::Persistable => "persistable",
            Self::ViewModel => "view-model",
            Self::DomainService => "domain-service",
            Self::Immutable => "immutable",
            Self::Named => "named",
            Self::Plural => "plural",
            Self::DescribedAs => "described-as",
            Self::CssClass => "css-class",
            Self::CssClassFa => "css-class-fa",
            Self::Hidden => "hidden",
            Self::HiddenViaMethod => "hidden-via-method",
            Self::Disabled => "disabled",
            Self::DisabledViaMethod => "disabled-via-method",
            Self::Mandatory => "mandatory",
            Self::MaxLength => "max-length",
            Self::TypicalLength => "typical-length",
            Self::MultiLine => "multi-line",
            Self::Regex => "regex",
            Self::MemberOrder => "member-order",
            Self::LabelAt => "label-at",
            Self::Render => "render",
            Self::DefaultView => "default-view",
            Self::Paged => "paged",
            Self::SortedBy => "sorted-by",
            Self::TypeOf => "type-of",
            Self::ActionSemantics => "action-semantics",
            Self::ActionPosition => "action-position",
            Self::Bookmarkable => "bookmarkable",
            Self::Choices => "choices",
            Self::Default => "default",
            Self::Validate => "validate",
            Self::AutoComplete => "auto-complete",
            Self::Layout => "layout",
        }
    }

    /// Precedence a facet of this type gets unless constructed otherwise.
    ///
    /// Value semantics are decided once by the class itself and must not be
    /// replaced by later factories or the layout overlay.
    pub const fn default_precedence(&self) -> Precedence {
        match self {
            Self::Value => Precedence::Protected,
            _ => Precedence::Normal,
        }
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Precedence & derivation ──────────────────────────────────────────────────

/// Override eligibility of an installed facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precedence {
    /// Installed only until anything more specific arrives.
    Fallback,
    Normal,
    /// Never replaced once installed.
    Protected,
}

impl Precedence {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Normal => "normal",
            Self::Protected => "protected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    NotDerived,
    /// Computed from another facet rather than declared.
    Derived { from: FacetType },
}

// ── Regex payload ────────────────────────────────────────────────────────────

/// A validated pattern. Equality is by source text and flags.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    pattern: String,
    flags: String,
    compiled: regex::Regex,
}

impl RegexPattern {
    /// Compile `pattern` with inline `flags` (any of `i`, `m`, `s`, `x`).
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Result<Self, DomainError> {
        let pattern = pattern.into();
        let flags: String = flags.into();
        let source = if flags.is_empty() {
            pattern.clone()
        } else {
            format!("(?{flags}){pattern}")
        };
        let compiled = regex::Regex::new(&source).map_err(|e| DomainError::InvalidRegex {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            flags,
            compiled,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

// ── FacetKind ────────────────────────────────────────────────────────────────

/// Facet payloads, one variant per concern.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetKind {
    ObjectSpecId { logical_type: String },
    Value { semantics: String },
    Persistable { identity: IdentityType },
    ViewModel,
    DomainService { nature: ServiceNature },
    Immutable { reason: Option<String> },
    Named { text: String },
    Plural { text: String },
    DescribedAs { text: String },
    CssClass { class: String },
    CssClassFa { class: String, position: CssPosition },
    Hidden { at: Where },
    HiddenViaMethod { method: String },
    Disabled { reason: Option<String>, at: Where },
    DisabledViaMethod { method: String },
    Mandatory { required: bool },
    MaxLength { value: u32 },
    TypicalLength { value: u32 },
    MultiLine { lines: u32 },
    Regex(RegexPattern),
    MemberOrder { name: String, sequence: String },
    LabelAt { position: LabelPosition },
    Render { policy: RenderPolicy },
    DefaultView { view: String },
    Paged { page_size: u32 },
    SortedBy { field: String },
    TypeOf { element: TypeName },
    ActionSemantics { semantics: SemanticsOf },
    ActionPosition { position: ActionPosition },
    Bookmarkable { policy: BookmarkPolicy },
    Choices { method: String },
    Default { method: String },
    Validate { method: String },
    AutoComplete { method: String },
    Layout {
        layout: Arc<DomainObjectLayout>,
        orphans: Vec<String>,
    },
}

impl FacetKind {
    pub fn facet_type(&self) -> FacetType {
        match self {
            Self::ObjectSpecId { .. } => FacetType::ObjectSpecId,
            Self::Value { .. } => FacetType::Value,
            Self::Persistable { .. } => FacetType::Persistable,
            Self::ViewModel => FacetType::ViewModel,
            Self::DomainService { .. } => FacetType::DomainService,
            Self::Immutable { .. } => FacetType::Immutable,
            Self::Named { .. } => FacetType::Named,
            Self::Plural { .. } => FacetType::Plural,
            Self::DescribedAs { .. } => FacetType::DescribedAs,
            Self::CssClass { .. } => FacetType::CssClass,
            Self::CssClassFa { .. } => FacetType::CssClassFa,
            Self::Hidden { .. } => FacetType::Hidden,
            Self::HiddenViaMethod { .. } => FacetType::HiddenViaMethod,
            Self::Disabled { .. } => FacetType::Disabled,
            Self::DisabledViaMethod { .. } => FacetType::DisabledViaMethod,
            Self::Mandatory { .. } => FacetType::Mandatory,
            Self::MaxLength { .. } => FacetType::MaxLength,
            Self::TypicalLength { .. } => FacetType::TypicalLength,
            Self::MultiLine { .. } => FacetType::MultiLine,
            Self::Regex(_) => FacetType::Regex,
            Self::MemberOrder { .. } => FacetType::MemberOrder,
            Self::LabelAt { .. } => FacetType::LabelAt,
            Self::Render { .. } => FacetType::Render,
            Self::DefaultView { .. } => FacetType::DefaultView,
            Self::Paged { .. } => FacetType::Paged,
            Self::SortedBy { .. } => FacetType::SortedBy,
            Self::TypeOf { .. } => FacetType::TypeOf,
            Self::ActionSemantics { .. } => FacetType::ActionSemantics,
            Self::ActionPosition { .. } => FacetType::ActionPosition,
            Self::Bookmarkable { .. } => FacetType::Bookmarkable,
            Self::Choices { .. } => FacetType::Choices,
            Self::Default { .. } => FacetType::Default,
            Self::Validate { .. } => FacetType::Validate,
            Self::AutoComplete { .. } => FacetType::AutoComplete,
            Self::Layout { .. } => FacetType::Layout,
        }
    }

    /// Short human-readable rendering of the payload.
    pub fn describe(&self) -> String {
        match self {
            Self::ObjectSpecId { logical_type } => logical_type.clone(),
            Self::Value { semantics } => semantics.clone(),
            Self::Persistable { identity } => identity.to_string(),
            Self::ViewModel => "view-model".into(),
            Self::DomainService { nature } => nature.to_string(),
            Self::Immutable { reason } => reason.clone().unwrap_or_else(|| "immutable".into()),
            Self::Named { text } | Self::Plural { text } | Self::DescribedAs { text } => {
                text.clone()
            }
            Self::CssClass { class } => class.clone(),
            Self::CssClassFa { class, position } => format!("{class} ({position})"),
            Self::Hidden { at } => at.to_string(),
            Self::Disabled { reason, at } => match reason {
                Some(reason) => format!("{at}: {reason}"),
                None => at.to_string(),
            },
            Self::HiddenViaMethod { method }
            | Self::DisabledViaMethod { method }
            | Self::Choices { method }
            | Self::Default { method }
            | Self::Validate { method }
            | Self::AutoComplete { method } => format!("{method}()"),
            Self::Mandatory { required: true } => "required".into(),
            Self::Mandatory { required: false } => "optional".into(),
            Self::MaxLength { value } | Self::TypicalLength { value } => value.to_string(),
            Self::MultiLine { lines } => format!("{lines} lines"),
            Self::Regex(pattern) if pattern.flags().is_empty() => format!("/{}/", pattern.pattern()),
            Self::Regex(pattern) => format!("/{}/{}", pattern.pattern(), pattern.flags()),
            Self::MemberOrder { name, sequence } if name.is_empty() => sequence.clone(),
            Self::MemberOrder { name, sequence } => format!("{name}#{sequence}"),
            Self::LabelAt { position } => position.to_string(),
            Self::Render { policy } => policy.to_string(),
            Self::DefaultView { view } => view.clone(),
            Self::Paged { page_size } => format!("{page_size} per page"),
            Self::SortedBy { field } => field.clone(),
            Self::TypeOf { element } => element.to_string(),
            Self::ActionSemantics { semantics } => semantics.to_string(),
            Self::ActionPosition { position } => position.to_string(),
            Self::Bookmarkable { policy } => policy.to_string(),
            Self::Layout { layout, orphans } => format!(
                "{} tab group(s), {} header action(s), {} orphan(s)",
                layout.tab_groups.len(),
                layout.actions.len(),
                orphans.len()
            ),
        }
    }
}

// ── Facet ────────────────────────────────────────────────────────────────────

/// An installed unit of behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    kind: FacetKind,
    precedence: Precedence,
    derivation: Derivation,
    underlying: Option<Box<Facet>>,
}

impl Facet {
    /// A declared facet with the type's default precedence.
    pub fn new(kind: FacetKind) -> Self {
        let precedence = kind.facet_type().default_precedence();
        Self {
            kind,
            precedence,
            derivation: Derivation::NotDerived,
            underlying: None,
        }
    }

    /// A facet that any later non-fallback facet replaces.
    pub fn fallback(kind: FacetKind) -> Self {
        Self::new(kind).with_precedence(Precedence::Fallback)
    }

    pub fn protected(kind: FacetKind) -> Self {
        Self::new(kind).with_precedence(Precedence::Protected)
    }

    /// A facet computed from another concern.
    pub fn derived_from(kind: FacetKind, from: FacetType) -> Self {
        Self {
            derivation: Derivation::Derived { from },
            ..Self::new(kind)
        }
    }

    /// Wrap `existing` as the underlying facet of a new facet of the same type.
    pub fn decorating(kind: FacetKind, existing: &Facet) -> Self {
        Self {
            underlying: Some(Box::new(existing.clone())),
            ..Self::new(kind)
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn facet_type(&self) -> FacetType {
        self.kind.facet_type()
    }

    pub fn kind(&self) -> &FacetKind {
        &self.kind
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn derivation(&self) -> Derivation {
        self.derivation
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.derivation, Derivation::Derived { .. })
    }

    pub fn is_fallback(&self) -> bool {
        self.precedence == Precedence::Fallback
    }

    pub fn is_protected(&self) -> bool {
        self.precedence == Precedence::Protected
    }

    pub fn underlying(&self) -> Option<&Facet> {
        self.underlying.as_deref()
    }

    /// Whether installing `self` may replace `existing` of the same type.
    pub fn may_replace(&self, existing: &Facet) -> bool {
        if existing.is_protected() {
            return false;
        }
        if self.is_fallback() && !existing.is_fallback() {
            return false;
        }
        if self.is_derived() && !existing.is_derived() {
            return false;
        }
        true
    }

    /// Text payload of naming and css-like facets.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            FacetKind::ObjectSpecId { logical_type } => Some(logical_type),
            FacetKind::Named { text }
            | FacetKind::Plural { text }
            | FacetKind::DescribedAs { text } => Some(text),
            FacetKind::CssClass { class } | FacetKind::CssClassFa { class, .. } => Some(class),
            FacetKind::DefaultView { view } => Some(view),
            FacetKind::SortedBy { field } => Some(field),
            FacetKind::HiddenViaMethod { method }
            | FacetKind::DisabledViaMethod { method }
            | FacetKind::Choices { method }
            | FacetKind::Default { method }
            | FacetKind::Validate { method }
            | FacetKind::AutoComplete { method } => Some(method),
            _ => None,
        }
    }

    /// Numeric payload of length and paging facets.
    pub fn number(&self) -> Option<u32> {
        match &self.kind {
            FacetKind::MaxLength { value } | FacetKind::TypicalLength { value } => Some(*value),
            FacetKind::MultiLine { lines } => Some(*lines),
            FacetKind::Paged { page_size } => Some(*page_size),
            _ => None,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.facet_type(), self.kind.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(text: &str) -> FacetKind {
        FacetKind::Named { text: text.into() }
    }

    #[test]
    fn protected_is_never_replaced() {
        let existing = Facet::protected(named("a"));
        assert!(!Facet::new(named("b")).may_replace(&existing));
        assert!(!Facet::protected(named("b")).may_replace(&existing));
    }

    #[test]
    fn fallback_only_replaces_fallback() {
        let normal = Facet::new(named("a"));
        let fallback = Facet::fallback(named("b"));
        assert!(!fallback.may_replace(&normal));
        assert!(fallback.may_replace(&Facet::fallback(named("c"))));
        assert!(normal.may_replace(&fallback));
    }

    #[test]
    fn derived_never_replaces_declared() {
        let declared = Facet::new(FacetKind::TypicalLength { value: 10 });
        let derived = Facet::derived_from(FacetKind::TypicalLength { value: 20 }, FacetType::MaxLength);
        assert!(!derived.may_replace(&declared));
        assert!(declared.may_replace(&derived));
    }

    #[test]
    fn value_facets_default_to_protected() {
        let value = Facet::new(FacetKind::Value {
            semantics: "money".into(),
        });
        assert!(value.is_protected());
        assert!(!Facet::new(named("x")).is_protected());
    }

    #[test]
    fn fallback_is_chosen_per_facet_not_per_type() {
        assert_eq!(FacetType::Value.default_precedence(), Precedence::Protected);
        for facet_type in [FacetType::ObjectSpecId, FacetType::Named, FacetType::TypicalLength] {
            assert_eq!(facet_type.default_precedence(), Precedence::Normal, "{facet_type}");
        }

        let from_class_name = Facet::fallback(FacetKind::ObjectSpecId {
            logical_type: "crm.Customer".into(),
        });
        let from_attribute = Facet::new(FacetKind::ObjectSpecId {
            logical_type: "customer".into(),
        });
        assert!(from_class_name.is_fallback());
        assert!(!from_attribute.is_fallback());
        assert!(from_attribute.may_replace(&from_class_name));
        assert!(!from_class_name.may_replace(&from_attribute));
    }

    #[test]
    fn decorating_keeps_the_underlying_chain() {
        let first = Facet::new(named("first"));
        let second = Facet::decorating(named("second"), &first);
        assert_eq!(second.underlying(), Some(&first));
        assert_eq!(second.text(), Some("second"));
    }

    #[test]
    fn regex_pattern_applies_flags() {
        let pattern = RegexPattern::new("^abc$", "i").unwrap();
        assert!(pattern.is_match("ABC"));
        assert!(RegexPattern::new("(", "").is_err());
    }

    #[test]
    fn describe_member_order() {
        let facet = Facet::new(FacetKind::MemberOrder {
            name: "General".into(),
            sequence: "2".into(),
        });
        assert_eq!(facet.to_string(), "member-order: General#2");
    }
}
