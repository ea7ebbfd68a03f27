//! Layout resource adapters.

mod fs;
mod memory;

pub use fs::{FsLayoutProvider, LAYOUT_SUFFIX};
pub use memory::InMemoryLayoutProvider;
