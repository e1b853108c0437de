//! Name resolution across the domain registry.

use crate::domain::{Domain, DomainRegistry};
use crate::error::NameError;

/// A name split into its short form and the live domain it belongs to
#[derive(Debug, Clone)]
pub struct ResolvedName<'a> {
    pub short_name: String,
    pub domain: &'a Domain,
}

/// Split `input` into a short name and a domain name.
///
/// Each top-level domain's rules are tried in order. A domain qualifier that matches the
/// parsing domain or one of its sub-domains (name or flat name, ignoring case) wins at
/// once. Unqualified matches must agree on the name, ignoring case, and then take
/// `default_domain`. Only when no rule produced an unqualified name does an unmatched
/// qualifier yield [`NameError::UnknownDomain`]: it may be a sub-domain that has not been
/// discovered yet.
pub fn split_name_for_domains(
    registry: &DomainRegistry,
    default_domain: Option<&str>,
    input: &str,
) -> Result<(String, String), NameError> {
    let mut candidate_name: Option<&str> = None;
    let mut unmatched_domain: Option<&str> = None;

    for domain in registry.top_level() {
        let Some(rules) = domain.names() else {
            tracing::warn!(domain = domain.name(), "Domain has no name rules, skipping");
            continue;
        };
        let Some(parsed) = rules.parse(input) else {
            continue;
        };

        match parsed.domain {
            Some(qualifier) => match registry.match_name_or_flat(domain, qualifier) {
                Some(found) => return Ok((parsed.name.to_string(), found.name().to_string())),
                None => {
                    unmatched_domain.get_or_insert(qualifier);
                }
            },
            None => match candidate_name {
                None => candidate_name = Some(parsed.name),
                Some(previous) if previous.eq_ignore_ascii_case(parsed.name) => {}
                Some(previous) => {
                    tracing::debug!(
                        first = previous,
                        second = parsed.name,
                        "Domain rules disagree on the name"
                    );
                    return Err(NameError::Unparseable(input.to_string()));
                }
            },
        }
    }

    match (candidate_name, default_domain, unmatched_domain) {
        (Some(name), Some(default), _) => Ok((name.to_string(), default.to_string())),
        (Some(name), None, _) => Err(NameError::NoDomain(name.to_string())),
        (None, _, Some(qualifier)) => Err(NameError::UnknownDomain(qualifier.to_string())),
        (None, _, None) => Err(NameError::Unparseable(input.to_string())),
    }
}

/// Split `input` and look its domain up among top-level domains and sub-domains.
pub fn resolve_name<'a>(
    registry: &'a DomainRegistry,
    default_domain: Option<&str>,
    input: &str,
) -> Result<ResolvedName<'a>, NameError> {
    let (short_name, domain_name) = split_name_for_domains(registry, default_domain, input)
        .map_err(|e| {
            tracing::debug!(input, error = %e, "Unable to parse name");
            e
        })?;

    let domain = registry
        .find_by_name(&domain_name)
        .ok_or(NameError::DomainNotFound(domain_name))?;

    Ok(ResolvedName { short_name, domain })
}
