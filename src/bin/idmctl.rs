//! idmctl
//!
//! Inspect the domains the identity tools see and how names resolve against them.

use std::process::ExitCode;

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::{json, Value};

use idm_tools::cli::{
    parse_command_options, parse_options, Cmdline, FreeArg, OptionRequirement, OptionSpec,
};
use idm_tools::domain::DomainRegistry;
use idm_tools::{tool_main, CommandEntry, ExitStatus, ToolContext};

const COMMANDS: &[CommandEntry<()>] = &[
    CommandEntry::new("domain-list", domain_list),
    CommandEntry::new("name-parse", name_parse),
];

const DOMAIN_LIST_OPTIONS: &[OptionSpec] = &[OptionSpec::flag("json", "Print domains as JSON")];

const NAME_ARG: FreeArg = FreeArg::new("NAME", "Name to resolve");

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    tool_main(argv, COMMANDS, &mut ()).into()
}

fn domain_list(cmdline: &Cmdline<'_>, ctx: &mut ToolContext, _: &mut ()) -> ExitStatus {
    let options = match parse_command_options(cmdline, DOMAIN_LIST_OPTIONS, OptionRequirement::None) {
        Ok(options) => options,
        Err(e) => return e.exit_status(),
    };

    if options.flag("json") {
        match serde_json::to_string_pretty(&domains_json(ctx.domains(), ctx.default_domain())) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize domains: {}", e);
                return ExitStatus::FAILURE;
            }
        }
    } else {
        println!("{}", domains_table(ctx.domains(), ctx.default_domain()));
    }
    ExitStatus::SUCCESS
}

fn name_parse(cmdline: &Cmdline<'_>, ctx: &mut ToolContext, _: &mut ()) -> ExitStatus {
    let options = match parse_options(cmdline, &[], OptionRequirement::None, None, Some(&NAME_ARG)) {
        Ok(options) => options,
        Err(e) => return e.exit_status(),
    };
    let Some(input) = options.free_arg() else {
        return ExitStatus::FAILURE;
    };

    match ctx.resolve_name(input) {
        Ok(resolved) => {
            println!("Short name: {}", resolved.short_name);
            println!("Domain: {}", resolved.domain.name());
            println!(
                "Fully qualified: {}",
                resolved.domain.fully_qualified_name(&resolved.short_name)
            );
            ExitStatus::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitStatus::FAILURE
        }
    }
}

fn parent_name(registry: &DomainRegistry, domain: &idm_tools::domain::Domain) -> Option<String> {
    domain.parent().map(|id| registry.get(id).name().to_string())
}

fn domains_json(registry: &DomainRegistry, default_domain: Option<&str>) -> Value {
    let domains: Vec<Value> = registry
        .iter_descend()
        .map(|domain| {
            json!({
                "name": domain.name(),
                "flat_name": domain.flat_name(),
                "parent": parent_name(registry, domain),
                "case_sensitive": domain.case_sensitive(),
                "full_name_format": domain.names().map(|rules| rules.full_name_format()),
            })
        })
        .collect();

    json!({
        "default_domain": default_domain,
        "domains": domains,
    })
}

fn domains_table(registry: &DomainRegistry, default_domain: Option<&str>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Domain", "Flat name", "Parent", "Case sensitive", "Default"]);
    for domain in registry.iter_descend() {
        table.add_row(vec![
            domain.name().to_string(),
            domain.flat_name().unwrap_or("-").to_string(),
            parent_name(registry, domain).unwrap_or_else(|| "-".to_string()),
            if domain.case_sensitive() { "yes" } else { "no" }.to_string(),
            if default_domain == Some(domain.name()) { "*" } else { "" }.to_string(),
        ]);
    }
    table.to_string()
}
