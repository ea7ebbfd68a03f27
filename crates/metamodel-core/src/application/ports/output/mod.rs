//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the loader needs from external systems.
//! The `metamodel-adapters` crate provides implementations.

use crate::domain::{RawClass, RawMember, TypeName};
use crate::error::MetamodelResult;

/// Port for raw class descriptions.
///
/// Implemented by:
/// - `metamodel_adapters::class_source::DirectoryClassSource` (TOML manifests)
/// - `metamodel_adapters::class_source::InMemoryClassSource` (tests, embedding)
#[cfg_attr(test, mockall::automock)]
pub trait ClassSource: Send + Sync {
    /// The description of `type_name`; `Ok(None)` when the type is unknown.
    fn describe(&self, type_name: &TypeName) -> MetamodelResult<Option<RawClass>>;

    /// Every type the source can describe, in a stable order.
    fn type_names(&self) -> MetamodelResult<Vec<TypeName>>;
}

/// Port for layout documents.
///
/// Implemented by:
/// - `metamodel_adapters::layout::FsLayoutProvider` (`<Type>.layout.json`)
/// - `metamodel_adapters::layout::InMemoryLayoutProvider`
#[cfg_attr(test, mockall::automock)]
pub trait LayoutResourceProvider: Send + Sync {
    /// The raw layout document of `type_name`.
    ///
    /// `Ok(None)` means the resource does not exist, which the overlay
    /// remembers. Errors are retried on the next build.
    fn load(&self, type_name: &TypeName) -> MetamodelResult<Option<String>>;
}

/// Port for the persistence mechanism's view of classes.
///
/// Implemented by:
/// - `metamodel_adapters::persistence::EnhancementFilter`
/// - `metamodel_adapters::persistence::NoopFilter`
#[cfg_attr(test, mockall::automock)]
pub trait PersistenceFilter: Send + Sync {
    /// Map a generated proxy type onto the class it stands for.
    fn substitute(&self, type_name: &TypeName) -> TypeName;

    /// Members injected by the persistence mechanism.
    fn ignores_member(&self, member: &RawMember) -> bool;

    /// Types that never get a specification.
    fn ignores_type(&self, type_name: &TypeName) -> bool;
}
