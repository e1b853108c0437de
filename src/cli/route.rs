//! Command routing: first token after the program name selects the handler.

use std::io::Write;

use crate::cli::common::print_common_options;
use crate::cli::ExitStatus;
use crate::context::ToolContext;

/// View of the command line handed to a command handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cmdline<'a> {
    /// Program name as invoked (`argv[0]`)
    pub exec: &'a str,
    /// Matched command token (`argv[1]`)
    pub command: &'a str,
    /// Everything after the command token, borrowed from the process arguments
    pub args: &'a [String],
}

pub type CommandHandler<P> = fn(&Cmdline<'_>, &mut ToolContext, &mut P) -> ExitStatus;

/// One routable command
pub struct CommandEntry<P> {
    pub command: &'static str,
    pub handler: CommandHandler<P>,
}

impl<P> CommandEntry<P> {
    pub const fn new(command: &'static str, handler: CommandHandler<P>) -> Self {
        Self { command, handler }
    }
}

impl<P> Clone for CommandEntry<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for CommandEntry<P> {}

impl<P> std::fmt::Debug for CommandEntry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// Dispatch `argv` to the first entry whose token matches `argv[1]` exactly. Usage goes
/// to stderr when no command or an unknown one is given.
pub fn route<P>(
    argv: &[String],
    context: &mut ToolContext,
    commands: &[CommandEntry<P>],
    pvt: &mut P,
) -> ExitStatus {
    route_to(&mut std::io::stderr(), argv, context, commands, pvt)
}

/// [`route`] with an explicit diagnostic stream.
pub fn route_to<P>(
    err: &mut dyn Write,
    argv: &[String],
    context: &mut ToolContext,
    commands: &[CommandEntry<P>],
    pvt: &mut P,
) -> ExitStatus {
    if commands.is_empty() {
        tracing::error!("Bug: commands can't be empty!");
        return ExitStatus::FAILURE;
    }

    let exec = argv.first().map(String::as_str).unwrap_or_default();
    let Some(token) = argv.get(1) else {
        return usage(err, exec, commands);
    };

    match commands.iter().find(|entry| entry.command == token.as_str()) {
        Some(entry) => {
            tracing::debug!(command = entry.command, "Routing command");
            let cmdline = Cmdline {
                exec,
                command: token,
                args: &argv[2..],
            };
            (entry.handler)(&cmdline, context, pvt)
        }
        None => {
            tracing::debug!(command = %token, "Unknown command");
            usage(err, exec, commands)
        }
    }
}

/// Tool usage: synopsis, every command token in table order, then the common options.
pub fn print_usage<P>(out: &mut dyn Write, exec: &str, commands: &[CommandEntry<P>]) -> std::io::Result<()> {
    write!(out, "Usage:\n{} COMMAND COMMAND-ARGS\n\n", exec)?;
    writeln!(out, "Available commands:")?;
    for entry in commands {
        writeln!(out, "* {}", entry.command)?;
    }
    writeln!(out)?;
    print_common_options(out)
}

fn usage<P>(err: &mut dyn Write, exec: &str, commands: &[CommandEntry<P>]) -> ExitStatus {
    let _ = print_usage(err, exec, commands);
    ExitStatus::FAILURE
}
