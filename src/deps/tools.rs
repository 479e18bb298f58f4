//! External build tools (`bootstrap`, `b2`) behind the [`ToolRunner`] seam.

use crate::error::CheckoutError;
use colored::*;
use std::process::Command;

/// Runs external build tools in the current working directory.
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CheckoutError>;
}

/// Spawns real processes and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTools;

impl ToolRunner for SystemTools {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CheckoutError> {
        println!("   {} Running {} {}", "🔨".yellow(), program, args.join(" "));
        log::debug!("spawning {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| CheckoutError::ToolSpawn {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CheckoutError::Tool {
                program: program.to_string(),
                status,
            })
        }
    }
}
