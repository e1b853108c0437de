//! Shared test utilities for integration tests
//!
//! Temporary configuration files, identity databases and serialized access to the
//! `IDM_*` environment variables.

use std::path::Path;
use std::sync::Mutex;

use idm_tools::config::{ToolPaths, CONFIG_PATH_ENV, DB_PATH_ENV};
use idm_tools::store::SledIdentityStore;
use tempfile::TempDir;

/// Serializes tests that read or write `IDM_*` variables
static IDM_ENV_MUTEX: Mutex<()> = Mutex::new(());

pub const TWO_DOMAINS: &str = r#"
[general]
domains = "example.com, corp.test"
default_domain_suffix = "example.com"

[domain."example.com"]
flat_name = "EXAMPLE"

[domain."corp.test"]
flat_name = "CORP"
case_sensitive = "false"
"#;

/// Config file and database directory inside one temporary directory
pub struct TestEnv {
    pub dir: TempDir,
    pub paths: ToolPaths,
}

impl TestEnv {
    pub fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config_file = dir.path().join("idm.conf");
        std::fs::write(&config_file, config).unwrap();
        let paths = ToolPaths::new(config_file, dir.path().join("db"));
        Self { dir, paths }
    }

    /// Open the database the tools will use, e.g. to seed sub-domains.
    /// Drop the handle before the tools open the database again.
    pub fn open_store(&self) -> SledIdentityStore {
        SledIdentityStore::open(&self.paths.db_path).unwrap()
    }

    pub fn missing_config(&self) -> ToolPaths {
        ToolPaths::new(self.dir.path().join("absent.conf"), self.paths.db_path.clone())
    }
}

pub fn argv(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Run `f` with `IDM_CONF` and `IDM_DB_PATH` set, restoring them afterwards.
pub fn with_idm_env<F, R>(config: &Path, db: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = IDM_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved_config = std::env::var(CONFIG_PATH_ENV).ok();
    let saved_db = std::env::var(DB_PATH_ENV).ok();

    std::env::set_var(CONFIG_PATH_ENV, config);
    std::env::set_var(DB_PATH_ENV, db);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    match saved_config {
        Some(value) => std::env::set_var(CONFIG_PATH_ENV, value),
        None => std::env::remove_var(CONFIG_PATH_ENV),
    }
    match saved_db {
        Some(value) => std::env::set_var(DB_PATH_ENV, value),
        None => std::env::remove_var(DB_PATH_ENV),
    }

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
