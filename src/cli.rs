//! CLI framework shared by every administration tool: common options, layered option
//! parsing, command routing and the tool entry point.

mod common;
mod entry;
mod options;
mod route;

pub use common::{common_options, print_common_options, CommonOptions, DEBUG_OPTION};
pub use entry::{run_tool, tool_main, PRIVILEGED_UID};
pub use options::{
    parse_command_options, parse_options, parse_options_to, FreeArg, OptionDelivery, OptionHandler,
    OptionHit, OptionKind, OptionRequirement, OptionSpec, OptionValue, ParsedOptions,
};
pub use route::{print_usage, route, route_to, Cmdline, CommandEntry, CommandHandler};

/// Process exit status returned by handlers and the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(u8);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);

    pub const fn new(code: u8) -> Self {
        ExitStatus(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.0)
    }
}
