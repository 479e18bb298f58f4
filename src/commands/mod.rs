//! CLI command handlers.
//!
//! Each submodule corresponds to a command or group of commands.

pub mod bootstrap;
