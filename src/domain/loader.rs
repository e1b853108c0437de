//! Domain registry loading.
//!
//! Two passes over the registry in descend order. The first refreshes the sub-domains of
//! every top-level domain; the second initializes name rules for every domain, including
//! the sub-domains the first pass just attached. Refresh failures are only warnings,
//! rule failures abort the load.

use tracing::{debug, info};

use crate::config::ConfigStore;
use crate::domain::DomainRegistry;
use crate::error::{BootstrapError, BootstrapWarning};
use crate::names::NameRules;
use crate::store::IdentityStore;

/// Outcome of a successful load
#[derive(Debug)]
pub struct LoadedDomains {
    pub registry: DomainRegistry,
    pub warnings: Vec<BootstrapWarning>,
}

/// Build the domain registry from configuration and the identity store.
pub fn load_domains(
    config: &dyn ConfigStore,
    store: &dyn IdentityStore,
) -> Result<LoadedDomains, BootstrapError> {
    let configured = config.domains().map_err(|e| {
        debug!(error = %e, "Unable to setup domains");
        BootstrapError::Config(e)
    })?;

    store.init(&configured).map_err(|e| {
        debug!(error = %e, "Could not initialize connection to the identity store");
        BootstrapError::Storage(e)
    })?;

    let mut registry = DomainRegistry::from_configs(&configured);
    let mut warnings = Vec::new();

    for id in registry.ids_descend() {
        if registry.get(id).is_subdomain() {
            continue;
        }
        let name = registry.get(id).name().to_string();
        match store.update_subdomains(&name) {
            Ok(subdomains) => {
                debug!(domain = %name, count = subdomains.len(), "Subdomains updated");
                registry.set_subdomains(id, subdomains);
            }
            Err(source) => {
                info!(domain = %name, error = %source, "Failed to update subdomains for domain");
                warnings.push(BootstrapWarning::SubdomainRefresh {
                    domain: name,
                    source,
                });
            }
        }
    }

    for id in registry.ids_descend() {
        let name = registry.get(id).name().to_string();
        let rules = NameRules::init(config, &name).map_err(|source| {
            debug!(domain = %name, error = %source, "Name rules initialization failed");
            BootstrapError::NameRules {
                domain: name.clone(),
                source,
            }
        })?;
        registry.set_names(id, rules);
    }

    Ok(LoadedDomains { registry, warnings })
}
