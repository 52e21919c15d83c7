//! CLI module for schemaguard
//!
//! Provides command-line interface for:
//! - check: validate a JSON document against a schema file
//! - verify: verify a bearer token
//! - schemas: list the schemas in the configured directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, check_to, run_command, schemas, schemas_to, verify, verify_token};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_input, read_input, write_json, write_json_to};

use crate::observability::Logger;

/// Parse arguments and run the selected command.
///
/// Stdout carries exactly one JSON document; logs go to stderr.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::reserve_stdout();
    run_command(cli.command)
}
