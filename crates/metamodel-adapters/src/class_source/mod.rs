//! Class source adapters.

mod directory;
mod memory;

pub use directory::{DirectoryClassSource, ManifestError, parse_manifest};
pub use memory::InMemoryClassSource;
