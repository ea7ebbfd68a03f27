//! Filesystem-based class source.
//!
//! Discovers and parses class manifests (`*.toml`) from a directory tree,
//! converting them into [`RawClass`] descriptions for the loader.
//!
//! # Directory layout expected
//!
//! ```text
//! classes/
//! ├── crm/
//! │   ├── customer.toml
//! │   └── party.toml
//! └── sales.toml           ← may hold several classes
//! ```
//!
//! # Manifest format
//!
//! ```toml
//! [[class]]
//! name       = "crm.Customer"
//! superclass = "crm.Party"        # optional
//! abstract   = false              # optional
//!
//! [class.attributes]
//! object_type = "crm.Customer"
//! persistable = "application"
//!
//! [[class.members]]
//! name = "firstName"
//! type = "string"
//! attributes = { max_length = 40, member_order = "1" }
//!
//! [[class.members]]
//! name = "placeOrder"
//! kind = "method"
//! type = "sales.Order"
//! params = [ { name = "quantity", type = "int" } ]
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use metamodel_core::{
    application::{ApplicationError, ports::ClassSource},
    domain::{RawClass, TypeName},
    error::MetamodelResult,
};

/// Why a single manifest was skipped.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("'{path}' declares no [[class]] table")]
    Empty { path: PathBuf },
}

/// Deserialised representation of one manifest file.
#[derive(Debug, Deserialize)]
struct ClassManifest {
    #[serde(rename = "class", default)]
    classes: Vec<RawClass>,
}

/// Parse one manifest file.
pub fn parse_manifest(path: &Path) -> Result<Vec<RawClass>, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: ClassManifest = toml::from_str(&raw).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if manifest.classes.is_empty() {
        return Err(ManifestError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(manifest.classes)
}

/// Class descriptions read once from a directory tree of manifests.
///
/// Manifests that cannot be read or parsed emit a `WARN` log and are
/// skipped; they do not prevent other classes from loading. When two
/// manifests declare the same class the first one found wins.
#[derive(Debug)]
pub struct DirectoryClassSource {
    root: PathBuf,
    classes: BTreeMap<TypeName, RawClass>,
    skipped: Vec<PathBuf>,
}

impl DirectoryClassSource {
    /// Walk `root` and index every class it declares.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::ClassSourceFailed`] if `root` does not
    /// exist or cannot be walked.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> MetamodelResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ApplicationError::ClassSourceFailed {
                reason: format!("classes directory not found: {}", root.display()),
            }
            .into());
        }

        let mut classes = BTreeMap::new();
        let mut skipped = Vec::new();

        let mut paths = Vec::new();
        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::ClassSourceFailed {
                reason: format!("directory walk error: {e}"),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path.to_path_buf());
            }
        }

        for path in paths {
            match parse_manifest(&path) {
                Ok(declared) => {
                    for class in declared {
                        if classes.contains_key(&class.name) {
                            warn!(
                                class = %class.name,
                                file = %path.display(),
                                "class declared more than once, keeping the first"
                            );
                            continue;
                        }
                        debug!(class = %class.name, file = %path.display(), "loaded class manifest");
                        classes.insert(class.name.clone(), class);
                    }
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping class manifest");
                    skipped.push(path);
                }
            }
        }

        info!(
            classes = classes.len(),
            skipped = skipped.len(),
            "class manifests indexed"
        );
        Ok(Self {
            root,
            classes,
            skipped,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifests that were skipped because they failed to load.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassSource for DirectoryClassSource {
    fn describe(&self, type_name: &TypeName) -> MetamodelResult<Option<RawClass>> {
        Ok(self.classes.get(type_name).cloned())
    }

    fn type_names(&self) -> MetamodelResult<Vec<TypeName>> {
        Ok(self.classes.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamodel_core::domain::MemberKind;
    use tempfile::TempDir;

    const CUSTOMER: &str = r#"
[[class]]
name = "crm.Customer"
superclass = "crm.Party"

[class.attributes]
object_type = "crm.Customer"

[[class.members]]
name = "firstName"
type = "string"
attributes = { max_length = 40 }

[[class.members]]
name = "orders"
type = "list<sales.Order>"

[[class.members]]
name = "placeOrder"
kind = "method"
type = "sales.Order"
params = [ { name = "quantity", type = "int" } ]
"#;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn open_fails_for_missing_dir() {
        let result = DirectoryClassSource::open("/absolutely/does/not/exist");
        assert!(result.is_err());
    }

    #[test]
    fn parses_members_and_attributes() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "crm/customer.toml", CUSTOMER);

        let source = DirectoryClassSource::open(temp.path()).unwrap();
        let class = source
            .describe(&TypeName::new("crm.Customer"))
            .unwrap()
            .unwrap();

        assert_eq!(class.superclass, Some(TypeName::new("crm.Party")));
        assert_eq!(class.members.len(), 3);
        assert!(class.members[1].type_ref.is_collection());
        assert_eq!(class.members[2].kind, MemberKind::Method);
        assert_eq!(class.members[2].params[0].name, "quantity");
        assert!(class.attributes.contains("object_type"));
    }

    #[test]
    fn one_bad_manifest_does_not_block_others() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "good.toml", CUSTOMER);
        write(temp.path(), "broken.toml", "[[class]\nname = ");
        write(temp.path(), "empty.toml", "# nothing here\n");
        write(temp.path(), "notes.txt", "not a manifest");

        let source = DirectoryClassSource::open(temp.path()).unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.skipped().len(), 2);
    }

    #[test]
    fn several_classes_per_file_first_declaration_wins() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "a.toml",
            "[[class]]\nname = \"Order\"\n\n[[class]]\nname = \"Invoice\"\n",
        );
        write(temp.path(), "b.toml", "[[class]]\nname = \"Order\"\nabstract = true\n");

        let source = DirectoryClassSource::open(temp.path()).unwrap();
        let names: Vec<_> = source
            .type_names()
            .unwrap()
            .into_iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(names, ["Invoice", "Order"]);
        assert!(
            !source
                .describe(&TypeName::new("Order"))
                .unwrap()
                .unwrap()
                .is_abstract
        );
    }
}
