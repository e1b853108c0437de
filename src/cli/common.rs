//! Options shared by every command of every tool.

use std::io::Write;

use crate::cli::options::OptionSpec;
use crate::logging::DebugLevel;

pub const DEBUG_OPTION: OptionSpec =
    OptionSpec::int("debug", "The debug level to run with").value_name("INT");

/// Fresh copy of the common option table.
pub fn common_options() -> Vec<OptionSpec> {
    vec![DEBUG_OPTION]
}

/// Common options found on the raw command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonOptions {
    pub debug_level: DebugLevel,
    /// Value given to `--debug` that is not an integer
    pub invalid_debug: Option<String>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::DEFAULT,
            invalid_debug: None,
        }
    }
}

impl CommonOptions {
    /// Remove common options from `argv` in place and return their values. `argv[0]` is
    /// the program name; scanning stops at `--`. A repeated option keeps the last value.
    pub fn strip_from(argv: &mut Vec<String>) -> Self {
        let flag = format!("--{}", DEBUG_OPTION.long);
        let prefix = format!("{}=", flag);

        let mut options = Self::default();
        let mut kept = Vec::with_capacity(argv.len());
        let mut raw = std::mem::take(argv).into_iter();

        if let Some(program) = raw.next() {
            kept.push(program);
        }

        while let Some(arg) = raw.next() {
            if arg == "--" {
                kept.push(arg);
                kept.extend(raw.by_ref());
                break;
            }
            let value = if arg == flag {
                raw.next()
            } else if let Some(value) = arg.strip_prefix(&prefix) {
                Some(value.to_string())
            } else {
                kept.push(arg);
                continue;
            };
            options.apply_debug(value);
        }

        *argv = kept;
        options
    }

    fn apply_debug(&mut self, value: Option<String>) {
        match value.as_deref().map(str::parse::<DebugLevel>) {
            Some(Ok(level)) => {
                self.debug_level = level;
                self.invalid_debug = None;
            }
            _ => {
                self.debug_level = DebugLevel::DEFAULT;
                self.invalid_debug = Some(value.unwrap_or_default());
            }
        }
    }
}

/// Common options block of the tool usage text.
pub fn print_common_options(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Common options:")?;
    writeln!(out, "  --debug=INT            Enable debug at level")
}
