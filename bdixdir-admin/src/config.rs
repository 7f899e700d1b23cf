//! Configuration loading from `bdixdir.toml`.
//!
//! The file is looked up, in order, at the path given on the command line,
//! at `$BDIXDIR_CONFIG`, and at `./bdixdir.toml`. The first two must exist
//! if given; the last is optional and a missing file means defaults.
//!
//! ## Example
//!
//! ```toml
//! store = "servers.bdixdir"
//! format = "msgpack"
//! default-category = "all"
//! fallback-category = "others"
//! log-file = "bdixdir.log"
//! ```
//!
//! Relative paths are taken relative to the directory holding the config
//! file.

use bdixdir_base::{err, Result};
use bdixdir_rank::{CategoryFilter, DEFAULT_FALLBACK_CATEGORY};
use bdixdir_store::Format;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "BDIXDIR_CONFIG";
pub const CONFIG_FILE_NAME: &str = "bdixdir.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct Config {
    /// File the collection is kept in.
    pub store: PathBuf,
    pub format: Format,
    /// Filter the directory opens on.
    pub default_category: String,
    /// Category given to records that arrive without any.
    pub fallback_category: String,
    pub log_file: Option<PathBuf>,
    /// Where this config was read from, if anywhere.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: PathBuf::from("bdixdir.store"),
            format: Format::default(),
            default_category: CategoryFilter::ALL.to_string(),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
            log_file: None,
            source: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if config.fallback_category.trim().is_empty() {
            return Err(err("fallback-category must not be empty"));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.store = dir.join(&config.store);
            config.log_file = config.log_file.map(|f| dir.join(f));
        }
        config.source = Some(path.to_path_buf());
        debug!(target: "bdixdir", path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Finds and loads the config, see the module docs for the lookup order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Config::default())
    }

    pub fn default_filter(&self) -> CategoryFilter {
        CategoryFilter::from(self.default_category.as_str())
    }
}
