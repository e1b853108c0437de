//! Identity Store
//!
//! Local cache of identity data maintained by the daemon. Tools only need two things
//! from it during bootstrap: initialization for the configured domains, and the
//! sub-domains the daemon has discovered for each top-level domain.

pub mod persistence;

pub use persistence::{SledIdentityStore, DB_VERSION};

use crate::config::DomainConfig;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// A sub-domain discovered for a top-level domain (e.g. a trusted realm)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainRecord {
    pub name: String,
    pub flat_name: Option<String>,
    pub case_sensitive: bool,
}

impl SubdomainRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flat_name: None,
            case_sensitive: true,
        }
    }

    pub fn with_flat_name(mut self, flat_name: impl Into<String>) -> Self {
        self.flat_name = Some(flat_name.into());
        self
    }
}

/// Identity store interface
pub trait IdentityStore {
    /// Prepare storage for every configured domain. Fails with
    /// [`StoreError::VersionMismatch`] when on-disk data has an incompatible format.
    fn init(&self, domains: &[DomainConfig]) -> Result<(), StoreError>;

    /// Current sub-domain set of a top-level domain, in stored order.
    fn update_subdomains(&self, domain: &str) -> Result<Vec<SubdomainRecord>, StoreError>;
}
