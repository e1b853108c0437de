//! Persistence layer for the identity store

use crate::config::DomainConfig;
use crate::error::StoreError;
use crate::store::{IdentityStore, SubdomainRecord};
use std::path::Path;

/// On-disk format version written by this build.
pub const DB_VERSION: u32 = 2;

const META_TREE: &str = "meta";
const DOMAINS_TREE: &str = "domains";
const VERSION_KEY: &[u8] = b"version";

fn subdomains_tree(parent: &str) -> String {
    format!("subdomains/{}", parent)
}

/// Sled-based implementation of IdentityStore
pub struct SledIdentityStore {
    db: sled::Db,
}

impl SledIdentityStore {
    /// Open the identity database at the given directory, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::io("Failed to open identity database", e))?;
        Ok(Self { db })
    }

    /// In-memory database removed when dropped. Used by tests and dry runs.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| StoreError::io("Failed to open temporary identity database", e))?;
        Ok(Self { db })
    }

    /// Stored format version, if the database has been initialized.
    pub fn version(&self) -> Result<Option<u32>, StoreError> {
        let meta = self.tree(META_TREE)?;
        match meta
            .get(VERSION_KEY)
            .map_err(|e| StoreError::io("Failed to read database version", e))?
        {
            Some(raw) => {
                let version: u32 = bincode::deserialize(&raw)
                    .map_err(|e| StoreError::invalid_data("Failed to decode database version", e))?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }

    /// Overwrite the stored format version.
    pub fn set_version(&self, version: u32) -> Result<(), StoreError> {
        let raw = bincode::serialize(&version)
            .map_err(|e| StoreError::invalid_data("Failed to encode database version", e))?;
        self.tree(META_TREE)?
            .insert(VERSION_KEY, raw)
            .map_err(|e| StoreError::io("Failed to write database version", e))?;
        Ok(())
    }

    /// Whether a top-level domain has been registered by [`IdentityStore::init`].
    pub fn contains_domain(&self, domain: &str) -> Result<bool, StoreError> {
        self.tree(DOMAINS_TREE)?
            .contains_key(domain.as_bytes())
            .map_err(|e| StoreError::io("Failed to check domain", e))
    }

    /// Persist a discovered sub-domain under its parent.
    pub fn store_subdomain(&self, parent: &str, record: &SubdomainRecord) -> Result<(), StoreError> {
        if !self.contains_domain(parent)? {
            return Err(StoreError::UnknownDomain(parent.to_string()));
        }
        let value = bincode::serialize(record)
            .map_err(|e| StoreError::invalid_data("Failed to serialize subdomain", e))?;
        self.tree(&subdomains_tree(parent))?
            .insert(record.name.as_bytes(), value)
            .map_err(|e| StoreError::io("Failed to store subdomain", e))?;
        Ok(())
    }

    /// Forget a sub-domain. Returns whether it was present.
    pub fn remove_subdomain(&self, parent: &str, name: &str) -> Result<bool, StoreError> {
        let removed = self
            .tree(&subdomains_tree(parent))?
            .remove(name.as_bytes())
            .map_err(|e| StoreError::io("Failed to remove subdomain", e))?;
        Ok(removed.is_some())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::io("Failed to flush identity database", e))?;
        Ok(())
    }

    fn tree(&self, name: &str) -> Result<sled::Tree, StoreError> {
        self.db
            .open_tree(name)
            .map_err(|e| StoreError::io("Failed to open tree", e))
    }
}

impl IdentityStore for SledIdentityStore {
    fn init(&self, domains: &[DomainConfig]) -> Result<(), StoreError> {
        match self.version()? {
            Some(found) if found != DB_VERSION => {
                return Err(StoreError::VersionMismatch {
                    expected: DB_VERSION,
                    found,
                });
            }
            Some(_) => {}
            None => {
                tracing::info!(version = DB_VERSION, "Initializing new identity database");
                self.set_version(DB_VERSION)?;
            }
        }

        let registered = self.tree(DOMAINS_TREE)?;
        for domain in domains {
            let value = bincode::serialize(domain)
                .map_err(|e| StoreError::invalid_data("Failed to serialize domain", e))?;
            registered
                .insert(domain.name.as_bytes(), value)
                .map_err(|e| StoreError::io("Failed to register domain", e))?;
        }
        Ok(())
    }

    fn update_subdomains(&self, domain: &str) -> Result<Vec<SubdomainRecord>, StoreError> {
        if !self.contains_domain(domain)? {
            return Err(StoreError::UnknownDomain(domain.to_string()));
        }

        let mut records = Vec::new();
        for item in self.tree(&subdomains_tree(domain))?.iter() {
            let (_, value) = item.map_err(|e| StoreError::io("Failed to iterate subdomains", e))?;
            let record: SubdomainRecord = bincode::deserialize(&value)
                .map_err(|e| StoreError::invalid_data("Failed to deserialize subdomain", e))?;
            records.push(record);
        }
        Ok(records)
    }
}
