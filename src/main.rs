//! fauxbase CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The response,
//! including any error, has already been written to stdout; the error is
//! repeated on stderr and the process exits non-zero.

use fauxbase::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
