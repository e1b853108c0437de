//! Configuration System
//!
//! Read-only access to the daemon configuration shared by all tools. The store is
//! consumed through the [`ConfigStore`] trait; [`FileConfigStore`] is the TOML-backed
//! implementation opened from the well-known path in [`ToolPaths`].

mod paths;
mod store;

pub use paths::{ToolPaths, CONFIG_PATH_ENV, DB_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_DB_PATH};
pub use store::FileConfigStore;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Section holding settings shared by every domain.
pub const GENERAL_SECTION: &str = "general";

pub const KEY_DOMAINS: &str = "domains";
pub const KEY_DEFAULT_DOMAIN: &str = "default_domain_suffix";
pub const KEY_RE_EXPRESSION: &str = "re_expression";
pub const KEY_FULL_NAME_FORMAT: &str = "full_name_format";
pub const KEY_FLAT_NAME: &str = "flat_name";
pub const KEY_CASE_SENSITIVE: &str = "case_sensitive";

/// Section name for a configured domain, e.g. `domain/example.com`.
pub fn domain_section(name: &str) -> String {
    format!("domain/{}", name)
}

/// A domain as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: String,
    pub flat_name: Option<String>,
    pub case_sensitive: bool,
}

/// Configuration store interface
pub trait ConfigStore {
    /// Read a string value. `Ok(None)` when the key is not set.
    fn get_string(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError>;

    /// Whether the section exists at all.
    fn has_section(&self, section: &str) -> bool;

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_string(section, key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get_string(section, key)? {
            None => Ok(default),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                other => Err(ConfigError::InvalidValue {
                    section: section.to_string(),
                    key: key.to_string(),
                    message: format!("expected a boolean, got '{}'", other),
                }),
            },
        }
    }

    /// Configured domains in declaration order.
    fn domains(&self) -> Result<Vec<DomainConfig>, ConfigError> {
        let listed = self
            .get_string(GENERAL_SECTION, KEY_DOMAINS)?
            .unwrap_or_default();

        let mut domains: Vec<DomainConfig> = Vec::new();
        for name in listed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if domains.iter().any(|d| d.name == name) {
                return Err(ConfigError::DuplicateDomain(name.to_string()));
            }
            let section = domain_section(name);
            if !self.has_section(&section) {
                return Err(ConfigError::MissingDomainSection(name.to_string()));
            }
            domains.push(DomainConfig {
                name: name.to_string(),
                flat_name: self.get_string(&section, KEY_FLAT_NAME)?,
                case_sensitive: self.get_bool(&section, KEY_CASE_SENSITIVE, true)?,
            });
        }

        if domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }
        Ok(domains)
    }
}
