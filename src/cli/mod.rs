//! CLI module for fauxbase
//!
//! Provides command-line interface for:
//! - check-schema: validate a schema definition file
//! - validate: validate one record from stdin
//! - mock: print a batch of mock records
//! - records: list/get/create/update/delete/seed a stored collection

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, RecordOp};
pub use commands::{check_schema, load_schema, mock, records, run_command, validate};
pub use config::{Config, RecordLimits, Tier};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json_file, read_request, write_error, write_response};

/// Parse arguments, run the command and write its response.
///
/// A failed command is written as an error response and also returned, so
/// the caller can exit non-zero.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(&err)?;
            Err(err)
        }
    }
}
