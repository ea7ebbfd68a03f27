//! Application ports (traits) for external dependencies.
//!
//! Ports define what the loader needs from the outside world. Adapters in
//! `metamodel-adapters` implement them.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by the loader, implemented by infrastructure
//!   - `ClassSource`: raw class descriptions
//!   - `LayoutResourceProvider`: per-type layout documents
//!   - `PersistenceFilter`: class substitution and synthetic-member filtering

pub mod output;

pub use output::{ClassSource, LayoutResourceProvider, PersistenceFilter};

#[cfg(test)]
pub use output::{MockClassSource, MockLayoutResourceProvider, MockPersistenceFilter};
