//! Well-known locations of the configuration file and the identity database.

use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/idm/idm.conf";
pub const DEFAULT_DB_PATH: &str = "/var/lib/idm/db";

/// Overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "IDM_CONF";
/// Overrides [`DEFAULT_DB_PATH`].
pub const DB_PATH_ENV: &str = "IDM_DB_PATH";

/// Paths a tool opens during bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub config_file: PathBuf,
    pub db_path: PathBuf,
}

impl ToolPaths {
    pub fn new(config_file: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            db_path: db_path.into(),
        }
    }

    /// Deployment defaults, overridable through `IDM_CONF` and `IDM_DB_PATH`.
    pub fn from_env() -> Self {
        let config_file = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let db_path = std::env::var_os(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        Self::new(config_file, db_path)
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH, DEFAULT_DB_PATH)
    }
}
