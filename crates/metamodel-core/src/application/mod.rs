//! Application layer for the metamodel.
//!
//! This layer contains:
//! - **Services**: the specification loader, the context that owns it, and
//!   the use cases built on top
//! - **Ports**: Interface definitions (traits) for class sources, layout
//!   resources and the persistence filter
//! - **Errors**: Application-specific error types
//!
//! Facet semantics live in `crate::domain`; this layer decides when and in
//! which order they are applied.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    MetamodelContext, MetamodelContextBuilder, MetamodelService, SpecificationInfo,
    SpecificationLoader, SpecificationSummary,
};

pub use ports::{ClassSource, LayoutResourceProvider, PersistenceFilter};

pub use error::ApplicationError;
