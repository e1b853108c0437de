//! End-to-end runs through the tool entry point

use idm_tools::cli::{run_tool, Cmdline, CommandEntry, PRIVILEGED_UID};
use idm_tools::{ExitStatus, ToolContext};

use super::test_utils::{argv, TestEnv, TWO_DOMAINS};

#[derive(Default)]
struct Recorder {
    calls: Vec<(String, String, Vec<String>, Option<String>)>,
}

fn show(cmdline: &Cmdline<'_>, ctx: &mut ToolContext, recorder: &mut Recorder) -> ExitStatus {
    recorder.calls.push((
        cmdline.exec.to_string(),
        cmdline.command.to_string(),
        cmdline.args.to_vec(),
        ctx.default_domain().map(str::to_string),
    ));
    ExitStatus::SUCCESS
}

fn fail(_: &Cmdline<'_>, _: &mut ToolContext, _: &mut Recorder) -> ExitStatus {
    ExitStatus::new(4)
}

const COMMANDS: &[CommandEntry<Recorder>] = &[
    CommandEntry::new("show", show),
    CommandEntry::new("fail", fail),
];

fn run(env: &TestEnv, uid: u32, args: &[&str], recorder: &mut Recorder) -> (ExitStatus, String) {
    let mut err = Vec::new();
    let status = run_tool(&mut err, uid, argv(args), &env.paths, COMMANDS, recorder);
    (status, String::from_utf8(err).unwrap())
}

#[test]
fn test_dispatch_with_common_options_removed() {
    let env = TestEnv::new(TWO_DOMAINS);
    let mut recorder = Recorder::default();

    let (status, err) = run(
        &env,
        PRIVILEGED_UID,
        &["idmctl", "show", "--debug", "2", "alice", "--force"],
        &mut recorder,
    );

    assert!(status.is_success());
    assert!(err.is_empty());
    assert_eq!(
        recorder.calls,
        vec![(
            "idmctl".to_string(),
            "show".to_string(),
            argv(&["alice", "--force"]),
            Some("example.com".to_string()),
        )]
    );
}

#[test]
fn test_handler_status_is_returned_verbatim() {
    let env = TestEnv::new(TWO_DOMAINS);
    let (status, _) = run(&env, PRIVILEGED_UID, &["idmctl", "fail"], &mut Recorder::default());
    assert_eq!(status.code(), 4);
}

#[test]
fn test_missing_command_prints_command_list() {
    let env = TestEnv::new(TWO_DOMAINS);
    let mut recorder = Recorder::default();

    let (status, err) = run(&env, PRIVILEGED_UID, &["idmctl", "--debug=2"], &mut recorder);

    assert_eq!(status, ExitStatus::FAILURE);
    assert!(recorder.calls.is_empty());
    assert_eq!(
        err,
        "Usage:\nidmctl COMMAND COMMAND-ARGS\n\nAvailable commands:\n* show\n* fail\n\n\
Common options:\n  --debug=INT            Enable debug at level\n"
    );
}

#[test]
fn test_unknown_command_prints_command_list() {
    let env = TestEnv::new(TWO_DOMAINS);
    let mut recorder = Recorder::default();

    let (status, err) = run(&env, PRIVILEGED_UID, &["idmctl", "shows"], &mut recorder);

    assert_eq!(status, ExitStatus::FAILURE);
    assert!(recorder.calls.is_empty());
    assert!(err.contains("* show\n* fail\n"));
}

#[test]
fn test_unprivileged_user_never_reaches_bootstrap() {
    let env = TestEnv::new(TWO_DOMAINS);
    let mut recorder = Recorder::default();

    let (status, err) = run(&env, 1000, &["idmctl", "show"], &mut recorder);

    assert_eq!(status, ExitStatus::FAILURE);
    assert_eq!(err, "idmctl must be run as root\n");
    assert!(!env.paths.db_path.exists());
    assert!(recorder.calls.is_empty());
}

#[test]
fn test_bootstrap_failure_stops_before_routing() {
    let env = TestEnv::new("[general]\n");
    let mut recorder = Recorder::default();

    let (status, err) = run(&env, PRIVILEGED_UID, &["idmctl", "show"], &mut recorder);

    assert_eq!(status, ExitStatus::FAILURE);
    assert!(err.starts_with("Unable to create tool context"));
    assert!(recorder.calls.is_empty());
}

#[test]
fn test_version_mismatch_prints_upgrade_hint() {
    let env = TestEnv::new(TWO_DOMAINS);
    {
        let store = env.open_store();
        store.set_version(1).unwrap();
        store.flush().unwrap();
    }

    let (status, err) = run(&env, PRIVILEGED_UID, &["idmctl", "show"], &mut Recorder::default());

    assert_eq!(status, ExitStatus::FAILURE);
    assert!(err.contains("version mismatch"));
    assert!(err.contains("Start the identity daemon once to upgrade it."));
}
