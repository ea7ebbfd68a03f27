//! Infrastructure adapters for the metamodel.
//!
//! This crate implements the ports defined in `metamodel-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod class_source;
pub mod layout;
pub mod persistence;

// Re-export commonly used adapters
pub use class_source::{DirectoryClassSource, InMemoryClassSource};
pub use layout::{FsLayoutProvider, InMemoryLayoutProvider};
pub use persistence::{EnhancementFilter, NoopFilter, from_mechanism};
