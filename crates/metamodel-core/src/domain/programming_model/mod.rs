//! The ordered facet-factory pipeline.
//!
//! A [`ProgrammingModel`] is plain data: an ordered `Vec` of factories, each
//! declaring the [`FeatureTypes`] it applies to. Processing a class, member
//! or parameter runs every matching factory in registration order against a
//! context that exposes the raw element and the target [`FacetHolder`], so
//! later factories see (and may replace) what earlier ones installed.
//!
//! Factories never fail. Anything structurally wrong is recorded as a
//! [`ValidationFinding`] through the context.

/// Implements the three `process_*` hooks by delegating to one generic fn.
macro_rules! every_element {
    ($apply:ident) => {
        fn process_class(&self, ctx: &mut ClassContext<'_>) {
            $apply(ctx)
        }

        fn process_member(&self, ctx: &mut MemberContext<'_>) {
            $apply(ctx)
        }

        fn process_parameter(&self, ctx: &mut ParameterContext<'_>) {
            $apply(ctx)
        }
    };
}

mod actions;
mod collections;
mod object;
mod ordering;
mod presentation;
mod support;
mod validation;
mod visibility;

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::facet_holder::FacetHolder;
use crate::domain::raw::{Attributes, MemberKind, RawClass, RawMember, RawParam};
use crate::domain::validation::ValidationFinding;
use crate::domain::value_objects::{FeatureType, FeatureTypes, TypeName};

pub use actions::{ActionPositionFactory, ActionSemanticsFactory, BookmarkableFactory};
pub use collections::{DefaultViewFactory, PagedFactory, SortedByFactory, TypeOfFactory};
pub use object::{
    DomainServiceFactory, ImmutableFactory, ObjectSpecIdAttributeFactory,
    ObjectSpecIdFallbackFactory, PersistableFactory, ValueFactory, ViewModelFactory,
};
pub use ordering::MemberOrderFactory;
pub use presentation::{
    CssClassFaFactory, CssClassFactory, DescribedAsFactory, LabelAtFactory, NamedAttributeFactory,
    NamedFallbackFactory, PluralFactory, RenderFactory,
};
pub use support::SupportMethodsFactory;
pub use validation::{
    MandatoryFactory, MaxLengthFactory, MultiLineFactory, RegexFactory, TypicalLengthFactory,
};
pub use visibility::{
    DisabledAttributeFactory, DisabledViaMethodFactory, HiddenAttributeFactory,
    HiddenViaMethodFactory,
};

// ── FacetFactory ─────────────────────────────────────────────────────────────

/// A pluggable strategy contributing facets to matching elements.
pub trait FacetFactory: Send + Sync {
    /// Stable identifier, unique within a programming model.
    fn id(&self) -> &'static str;

    fn feature_types(&self) -> FeatureTypes;

    fn process_class(&self, _ctx: &mut ClassContext<'_>) {}

    fn process_member(&self, _ctx: &mut MemberContext<'_>) {}

    fn process_parameter(&self, _ctx: &mut ParameterContext<'_>) {}
}

// ── Contexts ─────────────────────────────────────────────────────────────────

/// Finding-recording behaviour shared by all processing contexts.
pub trait FactoryContext {
    fn type_name(&self) -> &TypeName;

    /// Member the finding is about, if any.
    fn member_name(&self) -> Option<&str>;

    fn origin(&self) -> &'static str;

    fn findings_mut(&mut self) -> &mut Vec<ValidationFinding>;

    /// Attributes of the element being processed.
    fn attributes(&self) -> &Attributes;

    /// Identifier of the element being processed.
    fn element_name(&self) -> &str;

    fn holder_mut(&mut self) -> &mut FacetHolder;

    fn warn(&mut self, message: impl Into<String>) {
        let finding = self.finding(ValidationFinding::warning(
            self.type_name(),
            self.origin(),
            message,
        ));
        self.findings_mut().push(finding);
    }

    fn error(&mut self, message: impl Into<String>) {
        let finding = self.finding(ValidationFinding::error(
            self.type_name(),
            self.origin(),
            message,
        ));
        self.findings_mut().push(finding);
    }

    /// Unwrap an attribute lookup, recording malformed values as errors.
    fn recover<T>(&mut self, result: Result<Option<T>, DomainError>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.error(e.to_string());
                None
            }
        }
    }

    fn text_attribute(&mut self, name: &str) -> Option<String> {
        let result = self.attributes().text(name).map(|t| t.map(str::to_string));
        self.recover(result)
    }

    fn uint_attribute(&mut self, name: &str) -> Option<u32> {
        let result = self.attributes().uint(name);
        self.recover(result)
    }

    fn parsed_attribute<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr<Err = DomainError>,
    {
        let result = self.attributes().parsed(name);
        self.recover(result)
    }

    fn marker_attribute(&mut self, name: &str) -> Option<Option<String>> {
        let result = self
            .attributes()
            .marker(name)
            .map(|m| m.map(|text| text.map(str::to_string)));
        self.recover(result)
    }

    fn flag_attribute(&mut self, name: &str) -> bool {
        match self.attributes().flag(name) {
            Ok(flag) => flag,
            Err(e) => {
                self.error(e.to_string());
                false
            }
        }
    }

    fn finding(&self, finding: ValidationFinding) -> ValidationFinding {
        match self.member_name() {
            Some(member) => finding.on_member(member),
            None => finding,
        }
    }
}

pub struct ClassContext<'a> {
    pub class: &'a RawClass,
    pub holder: &'a mut FacetHolder,
    findings: &'a mut Vec<ValidationFinding>,
    origin: &'static str,
}

impl<'a> ClassContext<'a> {
    pub fn new(
        class: &'a RawClass,
        holder: &'a mut FacetHolder,
        findings: &'a mut Vec<ValidationFinding>,
    ) -> Self {
        Self {
            class,
            holder,
            findings,
            origin: "",
        }
    }
}

impl FactoryContext for ClassContext<'_> {
    fn type_name(&self) -> &TypeName {
        &self.class.name
    }

    fn attributes(&self) -> &Attributes {
        &self.class.attributes
    }

    fn element_name(&self) -> &str {
        self.class.name.simple_name()
    }

    fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut *self.holder
    }

    fn member_name(&self) -> Option<&str> {
        None
    }

    fn origin(&self) -> &'static str {
        self.origin
    }

    fn findings_mut(&mut self) -> &mut Vec<ValidationFinding> {
        &mut *self.findings
    }
}

pub struct MemberContext<'a> {
    /// The effective class: own and inherited members, support methods included.
    pub class: &'a RawClass,
    pub member: &'a RawMember,
    pub feature_type: FeatureType,
    /// Class-level facets, already complete when members are processed.
    pub class_facets: &'a FacetHolder,
    pub holder: &'a mut FacetHolder,
    findings: &'a mut Vec<ValidationFinding>,
    origin: &'static str,
}

impl<'a> MemberContext<'a> {
    pub fn new(
        class: &'a RawClass,
        member: &'a RawMember,
        feature_type: FeatureType,
        class_facets: &'a FacetHolder,
        holder: &'a mut FacetHolder,
        findings: &'a mut Vec<ValidationFinding>,
    ) -> Self {
        Self {
            class,
            member,
            feature_type,
            class_facets,
            holder,
            findings,
            origin: "",
        }
    }

    /// A method of the class by name.
    pub fn method(&self, name: &str) -> Option<&'a RawMember> {
        self.class
            .members
            .iter()
            .find(|m| m.name == name && m.kind == MemberKind::Method)
    }
}

impl FactoryContext for MemberContext<'_> {
    fn type_name(&self) -> &TypeName {
        &self.class.name
    }

    fn attributes(&self) -> &Attributes {
        &self.member.attributes
    }

    fn element_name(&self) -> &str {
        &self.member.name
    }

    fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut *self.holder
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.member.name)
    }

    fn origin(&self) -> &'static str {
        self.origin
    }

    fn findings_mut(&mut self) -> &mut Vec<ValidationFinding> {
        &mut *self.findings
    }
}

pub struct ParameterContext<'a> {
    pub class: &'a RawClass,
    /// The action owning the parameter.
    pub action: &'a RawMember,
    pub param: &'a RawParam,
    pub index: usize,
    pub holder: &'a mut FacetHolder,
    findings: &'a mut Vec<ValidationFinding>,
    origin: &'static str,
}

impl<'a> ParameterContext<'a> {
    pub fn new(
        class: &'a RawClass,
        action: &'a RawMember,
        index: usize,
        holder: &'a mut FacetHolder,
        findings: &'a mut Vec<ValidationFinding>,
    ) -> Option<Self> {
        let param = action.params.get(index)?;
        Some(Self {
            class,
            action,
            param,
            index,
            holder,
            findings,
            origin: "",
        })
    }
}

impl FactoryContext for ParameterContext<'_> {
    fn type_name(&self) -> &TypeName {
        &self.class.name
    }

    fn attributes(&self) -> &Attributes {
        &self.param.attributes
    }

    fn element_name(&self) -> &str {
        &self.param.name
    }

    fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut *self.holder
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.action.name)
    }

    fn origin(&self) -> &'static str {
        self.origin
    }

    fn findings_mut(&mut self) -> &mut Vec<ValidationFinding> {
        &mut *self.findings
    }
}

// ── ProgrammingModel ─────────────────────────────────────────────────────────

/// Ordered list of facet factories.
#[derive(Default)]
pub struct ProgrammingModel {
    factories: Vec<Box<dyn FacetFactory>>,
}

impl ProgrammingModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory. A factory id may be registered only once.
    pub fn add_factory(mut self, factory: impl FacetFactory + 'static) -> Result<Self, DomainError> {
        self.push(Box::new(factory))?;
        Ok(self)
    }

    pub fn push(&mut self, factory: Box<dyn FacetFactory>) -> Result<(), DomainError> {
        if self.factories.iter().any(|f| f.id() == factory.id()) {
            return Err(DomainError::DuplicateFactory {
                id: factory.id().to_string(),
            });
        }
        self.factories.push(factory);
        Ok(())
    }

    /// The standard pipeline: class-level factories, then members, then
    /// parameters, in the order their facets build on each other.
    pub fn default_model() -> Self {
        let factories: Vec<Box<dyn FacetFactory>> = vec![
            Box::new(ObjectSpecIdFallbackFactory),
            Box::new(ObjectSpecIdAttributeFactory),
            Box::new(ValueFactory),
            Box::new(PersistableFactory),
            Box::new(ViewModelFactory),
            Box::new(DomainServiceFactory),
            Box::new(ImmutableFactory),
            Box::new(NamedFallbackFactory),
            Box::new(NamedAttributeFactory),
            Box::new(PluralFactory),
            Box::new(DescribedAsFactory),
            Box::new(CssClassFactory),
            Box::new(CssClassFaFactory),
            Box::new(HiddenAttributeFactory),
            Box::new(HiddenViaMethodFactory),
            Box::new(DisabledAttributeFactory),
            Box::new(DisabledViaMethodFactory),
            Box::new(MandatoryFactory),
            Box::new(MaxLengthFactory),
            Box::new(TypicalLengthFactory),
            Box::new(MultiLineFactory),
            Box::new(RegexFactory),
            Box::new(MemberOrderFactory),
            Box::new(LabelAtFactory),
            Box::new(RenderFactory),
            Box::new(DefaultViewFactory),
            Box::new(PagedFactory),
            Box::new(SortedByFactory),
            Box::new(TypeOfFactory),
            Box::new(ActionSemanticsFactory),
            Box::new(ActionPositionFactory),
            Box::new(BookmarkableFactory),
            Box::new(SupportMethodsFactory),
        ];
        Self { factories }
    }

    pub fn factory_ids(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn matching(&self, feature: FeatureType) -> impl Iterator<Item = &dyn FacetFactory> {
        self.factories
            .iter()
            .map(|f| &**f)
            .filter(move |f| f.feature_types().contains(feature))
    }

    pub fn process_class(&self, ctx: &mut ClassContext<'_>) {
        for factory in self.matching(FeatureType::Object) {
            ctx.origin = factory.id();
            factory.process_class(ctx);
        }
    }

    pub fn process_member(&self, ctx: &mut MemberContext<'_>) {
        for factory in self.matching(ctx.feature_type) {
            ctx.origin = factory.id();
            factory.process_member(ctx);
        }
    }

    pub fn process_parameter(&self, ctx: &mut ParameterContext<'_>) {
        for factory in self.matching(FeatureType::ActionParameter) {
            ctx.origin = factory.id();
            factory.process_parameter(ctx);
        }
    }
}

impl fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgrammingModel")
            .field("factories", &self.factory_ids())
            .finish()
    }
}
