//! Application services - orchestrate the metamodel.
//!
//! The loader builds and caches specifications; the context owns the
//! loader and its shared caches; the service exposes use cases as DTOs.

pub mod context;
pub mod introspector;
pub mod layout_overlay;
pub mod metamodel_service;
pub mod specification_loader;
pub mod validators;

pub use context::{MetamodelContext, MetamodelContextBuilder};
pub use layout_overlay::{LayoutOverlay, NoLayoutResources};
pub use metamodel_service::{
    FacetInfo, MemberInfo, MetamodelService, ParameterInfo, SpecificationInfo,
    SpecificationSummary,
};
pub use specification_loader::SpecificationLoader;
pub use validators::{
    ExplicitObjectTypeValidator, MetamodelValidator, UniqueObjectSpecIdValidator,
    default_validators,
};
