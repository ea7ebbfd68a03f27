//! Layout documents read from a directory: `<root>/<TypeName>.layout.json`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use metamodel_core::{
    application::{ApplicationError, ports::LayoutResourceProvider},
    domain::TypeName,
    error::MetamodelResult,
};

pub const LAYOUT_SUFFIX: &str = ".layout.json";

#[derive(Debug, Clone)]
pub struct FsLayoutProvider {
    root: PathBuf,
}

impl FsLayoutProvider {
    /// The directory need not exist; every type then has no layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, type_name: &TypeName) -> PathBuf {
        self.root.join(format!("{type_name}{LAYOUT_SUFFIX}"))
    }
}

impl LayoutResourceProvider for FsLayoutProvider {
    #[instrument(skip_all, fields(type_name = %type_name))]
    fn load(&self, type_name: &TypeName) -> MetamodelResult<Option<String>> {
        let path = self.path_for(type_name);
        match fs::read_to_string(&path) {
            Ok(json) => {
                debug!(path = %path.display(), bytes = json.len(), "layout resource read");
                Ok(Some(json))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::LayoutResourceFailed {
                type_name: type_name.to_string(),
                reason: format!("{}: {e}", path.display()),
            }
            .into()),
        }
    }
}
