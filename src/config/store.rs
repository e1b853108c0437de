//! TOML configuration file read through the `config` crate.
//!
//! Layout: a `[general]` table plus one `[domain."<name>"]` table per domain. Values are
//! read as strings; scalars of other types are converted by the `config` crate.

use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{ConfigStore, GENERAL_SECTION};
use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    general: HashMap<String, String>,

    #[serde(default)]
    domain: HashMap<String, HashMap<String, String>>,
}

/// File-backed configuration store
#[derive(Debug)]
pub struct FileConfigStore {
    path: Option<PathBuf>,
    document: ConfigDocument,
}

impl FileConfigStore {
    /// Open and parse the configuration file. A missing file is an error.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()
            .map_err(|source| ConfigError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let document: ConfigDocument = settings.try_deserialize()?;
        tracing::debug!(
            config_path = %path.display(),
            domains = document.domain.len(),
            "Configuration loaded"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
        })
    }

    /// Parse configuration held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        let document: ConfigDocument = settings.try_deserialize()?;
        Ok(Self {
            path: None,
            document,
        })
    }

    /// Path the store was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn section(&self, section: &str) -> Option<&HashMap<String, String>> {
        if section == GENERAL_SECTION {
            return Some(&self.document.general);
        }
        let name = section.strip_prefix("domain/")?;
        // Table keys come back case-folded from the config crate.
        self.document.domain.get(name).or_else(|| {
            self.document
                .domain
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, table)| table)
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn get_string(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self
            .section(section)
            .and_then(|values| values.get(key))
            .cloned())
    }

    fn has_section(&self, section: &str) -> bool {
        self.section(section).is_some()
    }
}
