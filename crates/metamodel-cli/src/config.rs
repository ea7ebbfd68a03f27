//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `METAMODEL_<SECTION>__<KEY>`, e.g.
//!    `METAMODEL_SOURCES__CLASSES_DIR=model/classes`
//! 3. Config file: `--config FILE`, else `./metamodel.toml`, else the
//!    platform config directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use metamodel_adapters::persistence::{DEFAULT_MEMBER_PREFIXES, DEFAULT_PROXY_SUFFIXES};

/// File name used by `metamodel init --local` and picked up from the CWD.
pub const LOCAL_CONFIG_FILE: &str = "metamodel.toml";

const ENV_PREFIX: &str = "METAMODEL";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where class manifests and layout files live.
    pub sources: SourcesConfig,
    /// Which persistence artefacts to hide from the metamodel.
    pub persistence: PersistenceConfig,
    /// Metamodel validation switches.
    pub validation: ValidationConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub classes_dir: PathBuf,
    pub layouts_dir: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            classes_dir: PathBuf::from("classes"),
            layouts_dir: PathBuf::from("layouts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// `enhancement` or `none`.
    pub mechanism: String,
    pub synthetic_member_prefixes: Vec<String>,
    pub proxy_class_suffixes: Vec<String>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            mechanism: "enhancement".into(),
            synthetic_member_prefixes: DEFAULT_MEMBER_PREFIXES.map(String::from).to_vec(),
            proxy_class_suffixes: DEFAULT_PROXY_SUFFIXES.map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Require every concrete entity to declare its object type.
    pub explicit_object_type: bool,
    /// Make `validate` fail on warnings too.
    pub fail_on_warnings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Used when `--output-format` is left at `auto`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .context("failed to seed configuration defaults")?;

        let mut builder = config::Config::builder().add_source(defaults);
        builder = match config_file {
            Some(path) => builder.add_source(toml_file(path).required(true)),
            None => builder
                .add_source(toml_file(&Self::config_path()).required(false))
                .add_source(toml_file(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("persistence.synthetic_member_prefixes")
                .with_list_parse_key("persistence.proxy_class_suffixes")
                .try_parsing(true),
        );

        let loaded = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(loaded)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `metamodel.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "metamodel", "metamodel")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }
}

fn toml_file(path: &Path) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(path).format(config::FileFormat::Toml)
}
