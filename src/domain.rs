//! Domain registry
//!
//! Every identity source the tools can act on. Top-level domains come from
//! configuration; sub-domains are discovered through the identity store and hang off
//! their parent. Domains live in an arena and refer to each other by [`DomainId`].

mod loader;

pub use loader::{load_domains, LoadedDomains};

use crate::config::DomainConfig;
use crate::names::NameRules;
use crate::store::SubdomainRecord;

/// Index of a domain inside its [`DomainRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainId(usize);

/// One identity source
#[derive(Debug)]
pub struct Domain {
    name: String,
    flat_name: Option<String>,
    case_sensitive: bool,
    parent: Option<DomainId>,
    subdomains: Vec<DomainId>,
    names: Option<NameRules>,
}

impl Domain {
    fn new(name: String, flat_name: Option<String>, case_sensitive: bool, parent: Option<DomainId>) -> Self {
        Self {
            name,
            flat_name,
            case_sensitive,
            parent,
            subdomains: Vec::new(),
            names: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flat_name(&self) -> Option<&str> {
        self.flat_name.as_deref()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn parent(&self) -> Option<DomainId> {
        self.parent
    }

    pub fn is_subdomain(&self) -> bool {
        self.parent.is_some()
    }

    pub fn subdomains(&self) -> &[DomainId] {
        &self.subdomains
    }

    /// Name parsing rules. Always present once the registry has been loaded.
    pub fn names(&self) -> Option<&NameRules> {
        self.names.as_ref()
    }

    /// `short` qualified with this domain's name using its full name format.
    pub fn fully_qualified_name(&self, short: &str) -> String {
        match &self.names {
            Some(rules) => rules.fully_qualified(short, &self.name),
            None => format!("{}@{}", short, self.name),
        }
    }

    fn matches(&self, candidate: &str) -> bool {
        self.name.eq_ignore_ascii_case(candidate)
            || self
                .flat_name
                .as_deref()
                .is_some_and(|flat| flat.eq_ignore_ascii_case(candidate))
    }
}

/// Ordered collection of domains. Iteration order is the descend order: each top-level
/// domain in configuration order, immediately followed by its sub-domains.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    domains: Vec<Domain>,
    top_level: Vec<DomainId>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the configured top-level domains, without sub-domains or rules.
    pub fn from_configs(configs: &[DomainConfig]) -> Self {
        let mut registry = Self::new();
        for config in configs {
            registry.add_domain(config);
        }
        registry
    }

    /// Append a top-level domain.
    pub fn add_domain(&mut self, config: &DomainConfig) -> DomainId {
        let id = self.push(Domain::new(
            config.name.clone(),
            config.flat_name.clone(),
            config.case_sensitive,
            None,
        ));
        self.top_level.push(id);
        id
    }

    fn push(&mut self, domain: Domain) -> DomainId {
        let id = DomainId(self.domains.len());
        self.domains.push(domain);
        id
    }

    /// Domain behind an id handed out by this registry.
    pub fn get(&self, id: DomainId) -> &Domain {
        &self.domains[id.0]
    }

    pub fn len(&self) -> usize {
        self.iter_descend().count()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    pub fn top_level(&self) -> impl Iterator<Item = &Domain> + '_ {
        self.top_level.iter().map(move |id| self.get(*id))
    }

    /// Ids in descend order.
    pub fn ids_descend(&self) -> Vec<DomainId> {
        self.top_level
            .iter()
            .flat_map(move |&top| std::iter::once(top).chain(self.get(top).subdomains.iter().copied()))
            .collect()
    }

    /// Domains in descend order.
    pub fn iter_descend(&self) -> impl Iterator<Item = &Domain> + '_ {
        self.top_level.iter().flat_map(move |&top| {
            std::iter::once(self.get(top)).chain(self.get(top).subdomains.iter().map(move |id| self.get(*id)))
        })
    }

    /// Replace the sub-domain set of a top-level domain. Sub-domains already known under
    /// the same name keep their id; ones no longer reported are detached.
    pub fn set_subdomains(&mut self, parent: DomainId, records: Vec<SubdomainRecord>) {
        let previous = std::mem::take(&mut self.domains[parent.0].subdomains);
        let mut current = Vec::with_capacity(records.len());

        for record in records {
            let existing = previous
                .iter()
                .copied()
                .find(|id| self.domains[id.0].name == record.name);
            let id = match existing {
                Some(id) => {
                    let domain = &mut self.domains[id.0];
                    domain.flat_name = record.flat_name;
                    domain.case_sensitive = record.case_sensitive;
                    id
                }
                None => self.push(Domain::new(
                    record.name,
                    record.flat_name,
                    record.case_sensitive,
                    Some(parent),
                )),
            };
            current.push(id);
        }

        self.domains[parent.0].subdomains = current;
    }

    /// Attach name rules to a domain, replacing any previous set.
    pub fn set_names(&mut self, id: DomainId, rules: NameRules) {
        self.domains[id.0].names = Some(rules);
    }

    /// Exact name lookup across top-level domains and their sub-domains.
    pub fn find_by_name(&self, name: &str) -> Option<&Domain> {
        self.iter_descend().find(|domain| domain.name == name)
    }

    /// Case-insensitive lookup by name or flat name within `root` and its sub-domains.
    pub fn match_name_or_flat<'a>(&'a self, root: &'a Domain, candidate: &str) -> Option<&'a Domain> {
        std::iter::once(root)
            .chain(root.subdomains.iter().map(|id| self.get(*id)))
            .find(|domain| domain.matches(candidate))
    }
}
