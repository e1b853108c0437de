//! Option parsing as seen from command handlers

use idm_tools::cli::{
    parse_options_to, Cmdline, FreeArg, OptionHit, OptionRequirement, OptionSpec, OptionValue,
};
use idm_tools::error::OptionError;

use super::test_utils::argv;

const GROUP_MOD: &[OptionSpec] = &[
    OptionSpec::string("append-group", "Groups to add the member to")
        .short('a')
        .value_name("GROUPS")
        .reported(1),
    OptionSpec::string("remove-group", "Groups to remove the member from")
        .short('r')
        .value_name("GROUPS")
        .reported(2),
    OptionSpec::int("gid", "New group ID"),
];

const GROUP_NAME: FreeArg = FreeArg::new("GROUP", "Group name");

struct Outcome {
    result: Result<Vec<(i32, String)>, OptionError>,
    free_arg: Option<String>,
    gid: Option<i64>,
    stderr: String,
}

fn run(args: &[&str], requirement: OptionRequirement) -> Outcome {
    let args = argv(args);
    let cmdline = Cmdline {
        exec: "idm-groupmod",
        command: "modify",
        args: &args,
    };

    let mut hits = Vec::new();
    let mut collect = |hit: &OptionHit| -> anyhow::Result<()> {
        match &hit.value {
            OptionValue::Str(groups) if groups == "root" => anyhow::bail!("root group cannot be modified"),
            OptionValue::Str(groups) => hits.push((hit.code, groups.clone())),
            other => anyhow::bail!("unexpected value {:?}", other),
        }
        Ok(())
    };

    let mut out = Vec::new();
    let mut err = Vec::new();
    let parsed = parse_options_to(
        &mut out,
        &mut err,
        &cmdline,
        GROUP_MOD,
        requirement,
        Some(&mut collect),
        Some(&GROUP_NAME),
    );

    let (free_arg, gid) = match &parsed {
        Ok(options) => (options.free_arg().map(str::to_string), options.get_int("gid")),
        Err(_) => (None, None),
    };
    Outcome {
        result: parsed.map(|_| hits),
        free_arg,
        gid,
        stderr: String::from_utf8(err).unwrap(),
    }
}

#[test]
fn test_reported_and_bound_options_together() {
    let outcome = run(
        &["-a", "admins", "wheel", "--gid", "0755", "--remove-group=users"],
        OptionRequirement::Required,
    );
    assert_eq!(
        outcome.result.unwrap(),
        vec![(1, "admins".to_string()), (2, "users".to_string())]
    );
    assert_eq!(outcome.free_arg.as_deref(), Some("wheel"));
    assert_eq!(outcome.gid, Some(0o755));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn test_handler_rejection_stops_parsing_quietly() {
    let outcome = run(&["wheel", "--append-group=root"], OptionRequirement::None);
    assert!(matches!(outcome.result, Err(OptionError::Rejected(_))));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn test_free_argument_alone_does_not_satisfy_required() {
    let outcome = run(&["wheel"], OptionRequirement::Required);
    assert!(matches!(outcome.result, Err(OptionError::OptionRequired)));
    assert!(outcome.stderr.starts_with("At least one option is required!"));
    assert!(outcome.stderr.contains("idm-groupmod modify GROUP [OPTIONS...]"));
}

#[test]
fn test_optional_command_accepts_bare_free_argument() {
    let outcome = run(&["wheel"], OptionRequirement::None);
    assert!(outcome.result.unwrap().is_empty());
    assert_eq!(outcome.free_arg.as_deref(), Some("wheel"));
}

#[test]
fn test_double_dash_ends_options() {
    let outcome = run(&["--gid", "5", "--", "-wheel"], OptionRequirement::Required);
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.free_arg.as_deref(), Some("-wheel"));
    assert_eq!(outcome.gid, Some(5));
}

#[test]
fn test_help_lists_both_option_groups() {
    let args = argv(&["--help"]);
    let cmdline = Cmdline {
        exec: "idm-groupmod",
        command: "modify",
        args: &args,
    };
    let mut out = Vec::new();
    let mut err = Vec::new();

    let result = parse_options_to(
        &mut out,
        &mut err,
        &cmdline,
        GROUP_MOD,
        OptionRequirement::Required,
        None,
        Some(&GROUP_NAME),
    );

    let failure = result.unwrap_err();
    assert!(failure.exit_status().is_success());
    let help = String::from_utf8(out).unwrap();
    let command_section = help.find("Command options").unwrap();
    let common_section = help.find("Common options").unwrap();
    assert!(command_section < common_section);
    assert!(help.contains("--append-group"));
    assert!(help.contains("--debug"));
}
