//! IDM Tools: shared framework for identity daemon administration tools
//!
//! Builds the tool context from configuration and the identity store, routes the
//! command line to a command handler, parses command options in layers and resolves
//! user-supplied names to their domain.

pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod logging;
pub mod names;
pub mod store;

pub use cli::{tool_main, CommandEntry, ExitStatus};
pub use context::ToolContext;
