//! Metamodel Core - Hexagonal Architecture Implementation
//!
//! This crate derives object specifications from raw class descriptions:
//! facets are installed on holders by an ordered list of facet factories,
//! assembled into cached `ObjectSpecification`s and overlaid with a layout.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          metamodel-cli (CLI)            │
//! │     (inspect, list, layout, validate)   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (MetamodelService, SpecificationLoader) │
//! │   MetamodelContext owns shared caches   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (ClassSource, LayoutResourceProvider,   │
//! │          PersistenceFilter)             │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   metamodel-adapters (Infrastructure)   │
//! │  (TOML manifests, layout files, filter) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Facet, FacetHolder, ProgrammingModel,  │
//! │   ObjectSpecification, layout tree)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metamodel_core::prelude::*;
//!
//! # fn run(source: Arc<dyn ClassSource>, filter: Arc<dyn PersistenceFilter>) -> MetamodelResult<()> {
//! let context = MetamodelContext::builder()
//!     .class_source(source)
//!     .persistence_filter(filter)
//!     .build()?;
//!
//! let spec = context.loader().load_specification(&TypeName::new("Customer"))?;
//! for property in spec.properties() {
//!     println!("{}", property.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, MetamodelContext, MetamodelService, SpecificationLoader,
        ports::{ClassSource, LayoutResourceProvider, PersistenceFilter},
    };
    pub use crate::domain::{
        DomainObjectLayout, Facet, FacetHolder, FacetKind, FacetType, FeatureType,
        ObjectSpecification, ProgrammingModel, RawClass, RawMember, RawParam, TypeName, TypeRef,
        ValidationReport,
    };
    pub use crate::error::{MetamodelError, MetamodelResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
