//! Router dispatch properties

use idm_tools::cli::{route_to, Cmdline, CommandEntry};
use idm_tools::config::FileConfigStore;
use idm_tools::logging::DebugLevel;
use idm_tools::store::SledIdentityStore;
use idm_tools::{ExitStatus, ToolContext};
use proptest::prelude::*;
use std::cell::RefCell;

#[derive(Default)]
struct Seen {
    calls: Vec<(usize, Vec<String>)>,
}

fn record<const N: usize>(cmdline: &Cmdline<'_>, _: &mut ToolContext, seen: &mut Seen) -> ExitStatus {
    seen.calls.push((N, cmdline.args.to_vec()));
    ExitStatus::new(N as u8 + 10)
}

const COMMANDS: &[CommandEntry<Seen>] = &[
    CommandEntry::new("add", record::<0>),
    CommandEntry::new("del", record::<1>),
    CommandEntry::new("mod", record::<2>),
    CommandEntry::new("show", record::<3>),
];

fn context() -> ToolContext {
    let config = FileConfigStore::from_toml_str(
        "[general]\ndomains = \"example.com\"\n\n[domain.\"example.com\"]\nflat_name = \"EXAMPLE\"\n",
    )
    .unwrap();
    let store = SledIdentityStore::temporary().unwrap();
    ToolContext::with_services(Box::new(config), Box::new(store), DebugLevel::DEFAULT).unwrap()
}

/// Matching token dispatches to exactly that entry with the residual arguments intact
#[test]
fn test_matching_command_dispatches_once() {
    let ctx = RefCell::new(context());
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0..COMMANDS.len(), prop::collection::vec("[a-z=-]{0,8}", 0..5)),
            |(index, rest)| {
                let mut argv = vec!["tool".to_string(), COMMANDS[index].command.to_string()];
                argv.extend(rest.iter().cloned());

                let mut seen = Seen::default();
                let mut err = Vec::new();
                let status = route_to(&mut err, &argv, &mut ctx.borrow_mut(), COMMANDS, &mut seen);

                prop_assert_eq!(status.code(), index as u8 + 10);
                prop_assert_eq!(seen.calls, vec![(index, rest)]);
                prop_assert!(err.is_empty());
                Ok(())
            },
        )
        .unwrap();
}

/// Anything that is not a registered token prints usage and invokes nothing
#[test]
fn test_unmatched_command_never_dispatches() {
    let ctx = RefCell::new(context());
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec("[A-Za-z-]{0,6}", 0..4),
            |tail| {
                prop_assume!(tail
                    .first()
                    .map_or(true, |token| COMMANDS.iter().all(|c| c.command != token.as_str())));

                let mut argv = vec!["tool".to_string()];
                argv.extend(tail);

                let mut seen = Seen::default();
                let mut err = Vec::new();
                let status = route_to(&mut err, &argv, &mut ctx.borrow_mut(), COMMANDS, &mut seen);

                prop_assert_eq!(status, ExitStatus::FAILURE);
                prop_assert!(seen.calls.is_empty());
                let usage = String::from_utf8(err).unwrap();
                prop_assert!(usage.starts_with("Usage:\ntool COMMAND COMMAND-ARGS\n\n"));
                prop_assert!(usage.ends_with("--debug=INT            Enable debug at level\n"));
                Ok(())
            },
        )
        .unwrap();
}
