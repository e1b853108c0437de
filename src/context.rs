//! Tool context: everything a command handler needs, built once per invocation.

use tracing::{debug, error, warn};

use crate::cli::CommonOptions;
use crate::config::{ConfigStore, FileConfigStore, ToolPaths, GENERAL_SECTION, KEY_DEFAULT_DOMAIN};
use crate::domain::{load_domains, DomainRegistry};
use crate::error::{BootstrapError, BootstrapWarning, NameError};
use crate::logging::{init_logging, DebugLevel, LoggingConfig};
use crate::names::{resolve_name, ResolvedName};
use crate::store::{IdentityStore, SledIdentityStore};

/// Fully initialized runtime state of one tool invocation.
///
/// Only [`ToolContext::init`] and [`ToolContext::with_services`] produce one, and both
/// either finish every bootstrap stage or return an error.
pub struct ToolContext {
    config: Box<dyn ConfigStore>,
    store: Box<dyn IdentityStore>,
    domains: DomainRegistry,
    default_domain: Option<String>,
    debug_level: DebugLevel,
    warnings: Vec<BootstrapWarning>,
}

impl ToolContext {
    /// Strip common options from `argv`, set up logging, then open the configuration and
    /// identity store found at `paths`.
    pub fn init(argv: &mut Vec<String>, paths: &ToolPaths) -> Result<Self, BootstrapError> {
        let common = CommonOptions::strip_from(argv);
        init_logging(&LoggingConfig::new(common.debug_level));
        if let Some(value) = &common.invalid_debug {
            warn!(value = %value, "Invalid debug level, using default");
        }

        let config = FileConfigStore::open(&paths.config_file).map_err(|e| {
            error!(path = %paths.config_file.display(), error = %e, "Unable to open configuration");
            BootstrapError::Config(e)
        })?;

        let store = SledIdentityStore::open(&paths.db_path).map_err(|e| {
            error!(path = %paths.db_path.display(), error = %e, "Could not open identity storage");
            BootstrapError::Storage(e)
        })?;

        Self::with_services(Box::new(config), Box::new(store), common.debug_level)
    }

    /// Build a context over already opened services.
    pub fn with_services(
        config: Box<dyn ConfigStore>,
        store: Box<dyn IdentityStore>,
        debug_level: DebugLevel,
    ) -> Result<Self, BootstrapError> {
        let loaded = load_domains(config.as_ref(), store.as_ref()).map_err(|e| {
            error!(error = %e, "Unable to setup domains");
            e
        })?;

        let default_domain = config
            .get_string(GENERAL_SECTION, KEY_DEFAULT_DOMAIN)
            .map_err(|e| {
                warn!(error = %e, "Cannot get the default domain");
                BootstrapError::DefaultDomain(e)
            })?;

        debug!(
            domains = loaded.registry.len(),
            default_domain = default_domain.as_deref().unwrap_or("<none>"),
            warnings = loaded.warnings.len(),
            "Tool context ready"
        );

        Ok(Self {
            config,
            store,
            domains: loaded.registry,
            default_domain,
            debug_level,
            warnings: loaded.warnings,
        })
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }

    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    pub fn domains_mut(&mut self) -> &mut DomainRegistry {
        &mut self.domains
    }

    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain.as_deref()
    }

    pub fn debug_level(&self) -> DebugLevel {
        self.debug_level
    }

    /// Non-fatal problems met while bootstrapping.
    pub fn warnings(&self) -> &[BootstrapWarning] {
        &self.warnings
    }

    /// Split `input` into a short name and the domain it belongs to.
    pub fn resolve_name(&self, input: &str) -> Result<ResolvedName<'_>, NameError> {
        resolve_name(&self.domains, self.default_domain.as_deref(), input)
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("domains", &self.domains)
            .field("default_domain", &self.default_domain)
            .field("debug_level", &self.debug_level)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

/// Context over an in-memory configuration with one domain and a temporary database.
#[cfg(test)]
pub(crate) fn test_context() -> ToolContext {
    let config = FileConfigStore::from_toml_str(
        r#"
[general]
domains = "example.com"
default_domain_suffix = "example.com"

[domain."example.com"]
flat_name = "EXAMPLE"
"#,
    )
    .unwrap();
    let store = SledIdentityStore::temporary().unwrap();
    ToolContext::with_services(Box::new(config), Box::new(store), DebugLevel::DEFAULT).unwrap()
}
