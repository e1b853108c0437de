//! Layered option parsing for tool commands.
//!
//! Each call composes one clap [`Command`] from three groups: the command's own
//! options, the options common to every tool, and the help option. Options are either
//! bound (their value is simply collected) or reported (each occurrence is handed to the
//! caller's handler, in command line order).

use std::collections::HashMap;
use std::io::Write;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::cli::common::common_options;
use crate::cli::route::Cmdline;
use crate::error::OptionError;
use crate::logging::parse_c_integer;

const FREE_ARG_ID: &str = "free-argument";
const HELP_ID: &str = "help";
const COMMAND_HEADING: &str = "Command options";
const COMMON_HEADING: &str = "Common options";

/// Value type an option takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Int,
    String,
}

/// How a parsed option reaches the command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDelivery {
    /// Collected into [`ParsedOptions`]
    Bound,
    /// Passed to the option handler with this code
    Reported(i32),
}

/// Whether a command must be given at least one option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionRequirement {
    #[default]
    None,
    Required,
}

/// Declarative description of one long option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub long: &'static str,
    pub short: Option<char>,
    pub kind: OptionKind,
    pub value_name: Option<&'static str>,
    pub help: &'static str,
    pub delivery: OptionDelivery,
}

impl OptionSpec {
    const fn with_kind(long: &'static str, kind: OptionKind, help: &'static str) -> Self {
        Self {
            long,
            short: None,
            kind,
            value_name: None,
            help,
            delivery: OptionDelivery::Bound,
        }
    }

    pub const fn flag(long: &'static str, help: &'static str) -> Self {
        Self::with_kind(long, OptionKind::Flag, help)
    }

    pub const fn int(long: &'static str, help: &'static str) -> Self {
        Self::with_kind(long, OptionKind::Int, help)
    }

    pub const fn string(long: &'static str, help: &'static str) -> Self {
        Self::with_kind(long, OptionKind::String, help)
    }

    pub const fn short(self, short: char) -> Self {
        Self {
            short: Some(short),
            ..self
        }
    }

    pub const fn value_name(self, value_name: &'static str) -> Self {
        Self {
            value_name: Some(value_name),
            ..self
        }
    }

    /// Deliver every occurrence to the option handler instead of binding it.
    pub const fn reported(self, code: i32) -> Self {
        Self {
            delivery: OptionDelivery::Reported(code),
            ..self
        }
    }

    fn to_arg(self) -> Arg {
        let mut arg = Arg::new(self.long).long(self.long).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        let reported = matches!(self.delivery, OptionDelivery::Reported(_));
        match self.kind {
            OptionKind::Flag if reported => arg.action(ArgAction::Count),
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
            OptionKind::Int => {
                let arg = arg
                    .value_parser(parse_c_integer)
                    .allow_negative_numbers(true)
                    .value_name(self.value_name.unwrap_or("INT"));
                if reported {
                    arg.action(ArgAction::Append)
                } else {
                    arg.action(ArgAction::Set)
                }
            }
            OptionKind::String => {
                let arg = arg.value_name(self.value_name.unwrap_or("STRING"));
                if reported {
                    arg.action(ArgAction::Append)
                } else {
                    arg.action(ArgAction::Set)
                }
            }
        }
    }
}

/// The single positional argument a command may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeArg {
    pub name: &'static str,
    pub help: &'static str,
}

impl FreeArg {
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self { name, help }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag,
    Int(i64),
    Str(String),
}

/// One occurrence of a reported option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionHit {
    pub code: i32,
    pub long: &'static str,
    pub value: OptionValue,
}

/// Callback receiving reported options. Returning an error aborts parsing.
pub type OptionHandler<'a> = &'a mut dyn FnMut(&OptionHit) -> anyhow::Result<()>;

/// Bound option values and the free argument of a successful parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<&'static str, OptionValue>,
    free_arg: Option<String>,
}

impl ParsedOptions {
    pub fn get_str(&self, long: &str) -> Option<&str> {
        match self.values.get(long) {
            Some(OptionValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_int(&self, long: &str) -> Option<i64> {
        match self.values.get(long) {
            Some(OptionValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn flag(&self, long: &str) -> bool {
        matches!(self.values.get(long), Some(OptionValue::Flag))
    }

    pub fn free_arg(&self) -> Option<&str> {
        self.free_arg.as_deref()
    }
}

/// Parse a command's arguments, printing help to stdout and diagnostics to stderr.
pub fn parse_options(
    cmdline: &Cmdline<'_>,
    options: &[OptionSpec],
    requirement: OptionRequirement,
    handler: Option<OptionHandler<'_>>,
    free_arg: Option<&FreeArg>,
) -> Result<ParsedOptions, OptionError> {
    parse_options_to(
        &mut std::io::stdout(),
        &mut std::io::stderr(),
        cmdline,
        options,
        requirement,
        handler,
        free_arg,
    )
}

/// Short form: no option handler, no free argument.
pub fn parse_command_options(
    cmdline: &Cmdline<'_>,
    options: &[OptionSpec],
    requirement: OptionRequirement,
) -> Result<ParsedOptions, OptionError> {
    parse_options(cmdline, options, requirement, None, None)
}

/// [`parse_options`] with explicit output streams.
pub fn parse_options_to(
    out: &mut dyn Write,
    err: &mut dyn Write,
    cmdline: &Cmdline<'_>,
    options: &[OptionSpec],
    requirement: OptionRequirement,
    mut handler: Option<OptionHandler<'_>>,
    free_arg: Option<&FreeArg>,
) -> Result<ParsedOptions, OptionError> {
    let table = compose_table(options);
    let mut command = build_command(cmdline, &table, options.len(), free_arg);

    let argv = std::iter::once(cmdline.exec.to_string()).chain(cmdline.args.iter().cloned());
    let matches = match command.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = write!(out, "{}", command.render_help());
            return Err(OptionError::HelpDisplayed);
        }
        Err(e) => {
            let failure = OptionError::InvalidOption {
                option: invalid_option_name(&e),
                reason: invalid_option_reason(e.kind()).to_string(),
            };
            return Err(report(err, &mut command, failure));
        }
    };

    let mut parsed = ParsedOptions::default();
    for spec in &table {
        if spec.delivery == OptionDelivery::Bound && from_command_line(&matches, spec.long) {
            if let Some(value) = bound_value(&matches, spec) {
                parsed.values.insert(spec.long, value);
            }
        }
    }

    for hit in reported_hits(&matches, &table) {
        match handler.as_mut() {
            Some(handler) => {
                if let Err(e) = handler(&hit) {
                    tracing::debug!(option = hit.long, error = %e, "Option handler rejected option");
                    return Err(OptionError::Rejected(e));
                }
            }
            None => {
                let failure = OptionError::InvalidOption {
                    option: format!("--{}", hit.long),
                    reason: "unexpected option".to_string(),
                };
                return Err(report(err, &mut command, failure));
            }
        }
    }

    if let Some(free) = free_arg {
        let mut values = matches
            .get_many::<String>(FREE_ARG_ID)
            .into_iter()
            .flatten();
        match (values.next(), values.next()) {
            (None, _) => {
                let failure = OptionError::MissingFreeArgument(free.help.to_string());
                return Err(report(err, &mut command, failure));
            }
            (Some(_), Some(_)) => {
                return Err(report(err, &mut command, OptionError::TooManyFreeArguments));
            }
            (Some(value), None) => parsed.free_arg = Some(value.clone()),
        }
    }

    let given = cmdline.args.len();
    if requirement == OptionRequirement::Required && ((free_arg.is_some() && given < 2) || given < 1) {
        return Err(report(err, &mut command, OptionError::OptionRequired));
    }

    Ok(parsed)
}

/// Command options first, then common options the command does not shadow.
fn compose_table(options: &[OptionSpec]) -> Vec<OptionSpec> {
    let mut table = options.to_vec();
    for common in common_options() {
        if !options.iter().any(|o| o.long == common.long) {
            table.push(common);
        }
    }
    table
}

fn build_command(
    cmdline: &Cmdline<'_>,
    table: &[OptionSpec],
    command_options: usize,
    free_arg: Option<&FreeArg>,
) -> Command {
    let usage = match free_arg {
        Some(free) => format!("{} {} {} [OPTIONS...]", cmdline.exec, cmdline.command, free.name),
        None => format!("{} {} [OPTIONS...]", cmdline.exec, cmdline.command),
    };

    let mut command = Command::new(cmdline.exec.to_string())
        .override_usage(usage)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true);

    // Left in place when no free argument is requested so stray positionals are ignored.
    let positional = Arg::new(FREE_ARG_ID)
        .num_args(1..)
        .action(ArgAction::Append);
    command = command.arg(match free_arg {
        Some(free) => positional.value_name(free.name).help(free.help),
        None => positional.hide(true),
    });

    for (position, spec) in table.iter().enumerate() {
        let heading = if position < command_options {
            COMMAND_HEADING
        } else {
            COMMON_HEADING
        };
        command = command.next_help_heading(heading).arg(spec.to_arg());
    }

    command.next_help_heading(COMMON_HEADING).arg(
        Arg::new(HELP_ID)
            .short('?')
            .long(HELP_ID)
            .action(ArgAction::Help)
            .help("Show this help message"),
    )
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

fn bound_value(matches: &ArgMatches, spec: &OptionSpec) -> Option<OptionValue> {
    match spec.kind {
        OptionKind::Flag => matches.get_flag(spec.long).then_some(OptionValue::Flag),
        OptionKind::Int => matches.get_one::<i64>(spec.long).map(|v| OptionValue::Int(*v)),
        OptionKind::String => matches
            .get_one::<String>(spec.long)
            .map(|v| OptionValue::Str(v.clone())),
    }
}

/// Every occurrence of a reported option, in command line order.
fn reported_hits(matches: &ArgMatches, table: &[OptionSpec]) -> Vec<OptionHit> {
    let mut hits: Vec<(usize, OptionHit)> = Vec::new();

    for spec in table {
        let OptionDelivery::Reported(code) = spec.delivery else {
            continue;
        };
        if !from_command_line(matches, spec.long) {
            continue;
        }
        let hit = |value| OptionHit {
            code,
            long: spec.long,
            value,
        };

        match spec.kind {
            OptionKind::Flag => {
                let index = matches.index_of(spec.long).unwrap_or(0);
                for _ in 0..matches.get_count(spec.long) {
                    hits.push((index, hit(OptionValue::Flag)));
                }
            }
            OptionKind::Int => {
                let values = matches.get_many::<i64>(spec.long).into_iter().flatten();
                let indices = matches.indices_of(spec.long).into_iter().flatten();
                for (index, value) in indices.zip(values) {
                    hits.push((index, hit(OptionValue::Int(*value))));
                }
            }
            OptionKind::String => {
                let values = matches.get_many::<String>(spec.long).into_iter().flatten();
                let indices = matches.indices_of(spec.long).into_iter().flatten();
                for (index, value) in indices.zip(values) {
                    hits.push((index, hit(OptionValue::Str(value.clone()))));
                }
            }
        }
    }

    hits.sort_by_key(|(index, _)| *index);
    hits.into_iter().map(|(_, hit)| hit).collect()
}

fn invalid_option_name(error: &clap::Error) -> String {
    match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg
            .split_whitespace()
            .next()
            .unwrap_or(arg.as_str())
            .to_string(),
        _ => "(unknown)".to_string(),
    }
}

fn invalid_option_reason(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::UnknownArgument => "unknown option",
        ErrorKind::ValueValidation => "invalid numeric value",
        ErrorKind::InvalidValue => "missing argument",
        other => other.as_str().unwrap_or("invalid argument"),
    }
}

/// One-line diagnostic followed by the full help text.
fn report(err: &mut dyn Write, command: &mut Command, failure: OptionError) -> OptionError {
    let _ = write!(err, "{}\n\n{}", failure, command.render_help());
    failure
}
