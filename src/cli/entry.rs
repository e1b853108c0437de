//! Tool entry point: privilege gate, context bootstrap, routing.

use std::io::Write;

use crate::cli::route::{route_to, CommandEntry};
use crate::cli::ExitStatus;
use crate::config::ToolPaths;
use crate::context::ToolContext;
use crate::error::{BootstrapError, StoreError};

/// Only this user may run the tools.
pub const PRIVILEGED_UID: libc::uid_t = 0;

/// Run a tool for the current process: checks the real user id and reads paths from the
/// environment.
pub fn tool_main<P>(argv: Vec<String>, commands: &[CommandEntry<P>], pvt: &mut P) -> ExitStatus {
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    run_tool(
        &mut std::io::stderr(),
        uid,
        argv,
        &ToolPaths::from_env(),
        commands,
        pvt,
    )
}

/// [`tool_main`] with the caller's user id, paths and diagnostic stream.
pub fn run_tool<P>(
    err: &mut dyn Write,
    uid: libc::uid_t,
    mut argv: Vec<String>,
    paths: &ToolPaths,
    commands: &[CommandEntry<P>],
    pvt: &mut P,
) -> ExitStatus {
    let program = argv.first().cloned().unwrap_or_default();

    if uid != PRIVILEGED_UID {
        tracing::error!(uid, "Running as unprivileged user, must be root");
        let _ = writeln!(err, "{} must be run as root", program);
        return ExitStatus::FAILURE;
    }

    let mut context = match ToolContext::init(&mut argv, paths) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "Unable to create tool context");
            let _ = writeln!(err, "Unable to create tool context: {}", e);
            if let Some(hint) = upgrade_hint(&e, &program) {
                let _ = writeln!(err, "{}", hint);
            }
            return ExitStatus::FAILURE;
        }
    };

    for warning in context.warnings() {
        tracing::info!(warning = %warning, "Bootstrap completed with warning");
    }

    route_to(err, &argv, &mut context, commands, pvt)
}

fn upgrade_hint(error: &BootstrapError, program: &str) -> Option<String> {
    match error {
        BootstrapError::Storage(StoreError::VersionMismatch { expected, found }) if found < expected => Some(format!(
            "The identity database uses format {} but {} expects {}. Start the identity daemon once to upgrade it.",
            found, program, expected
        )),
        BootstrapError::Storage(StoreError::VersionMismatch { expected, found }) => Some(format!(
            "The identity database uses format {} which is newer than {} supports ({}). Upgrade the tools.",
            found, program, expected
        )),
        _ => None,
    }
}
