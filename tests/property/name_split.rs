//! Name splitting across the domain registry

use idm_tools::config::DomainConfig;
use idm_tools::domain::DomainRegistry;
use idm_tools::error::NameError;
use idm_tools::names::{split_name_for_domains, NameRules, DEFAULT_FULL_NAME_FORMAT, DEFAULT_RE_EXPRESSION};
use idm_tools::store::SubdomainRecord;
use proptest::prelude::*;

fn registry() -> DomainRegistry {
    let mut registry = DomainRegistry::from_configs(&[
        DomainConfig {
            name: "example.com".to_string(),
            flat_name: Some("EXAMPLE".to_string()),
            case_sensitive: true,
        },
        DomainConfig {
            name: "corp.test".to_string(),
            flat_name: None,
            case_sensitive: false,
        },
    ]);
    let top = registry.ids_descend()[0];
    registry.set_subdomains(top, vec![SubdomainRecord::new("child.example.com")]);
    registry
}

fn with_rules(mut registry: DomainRegistry) -> DomainRegistry {
    for id in registry.ids_descend() {
        let name = registry.get(id).name().to_string();
        let rules = NameRules::new(&name, DEFAULT_RE_EXPRESSION, DEFAULT_FULL_NAME_FORMAT).unwrap();
        registry.set_names(id, rules);
    }
    registry
}

#[test]
fn test_known_domains_split_back_to_their_parts() {
    let registry = with_rules(registry());
    let known = ["example.com", "child.example.com", "corp.test", "EXAMPLE"];
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z][a-z0-9._-]{0,10}", 0..known.len()),
            |(user, index)| {
                let input = format!("{}@{}", user, known[index]);
                let (name, domain) = split_name_for_domains(&registry, None, &input).unwrap();
                prop_assert_eq!(name, user);
                let expected = if known[index] == "EXAMPLE" { "example.com" } else { known[index] };
                prop_assert_eq!(domain, expected);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_unknown_qualifiers_are_never_generic_failures() {
    let registry = with_rules(registry());
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z]{1,8}", "[a-z]{1,8}\\.invalid"),
            |(user, domain)| {
                let input = format!("{}@{}", user, domain);
                let err = split_name_for_domains(&registry, Some("example.com"), &input).unwrap_err();
                prop_assert_eq!(err, NameError::UnknownDomain(domain));
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_short_names_take_the_default_domain() {
    let registry = with_rules(registry());
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&"[a-z][a-z0-9_]{0,12}", |user| {
            let (name, domain) = split_name_for_domains(&registry, Some("corp.test"), &user).unwrap();
            prop_assert_eq!(name, user);
            prop_assert_eq!(domain, "corp.test");
            Ok(())
        })
        .unwrap();
}
