//! CLI argument definitions using clap
//!
//! Commands:
//! - fauxbase check-schema --schema <path>
//! - fauxbase validate --schema <path>
//! - fauxbase mock --schema <path>
//! - fauxbase records --config <path> --collection <id> --schema <path> <op>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fauxbase - schema-defined records, validation and mock data
#[derive(Parser, Debug)]
#[command(name = "fauxbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a schema definition file
    CheckSchema {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Validate one JSON record read from stdin
    Validate {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,

        /// Report undeclared keys instead of dropping them
        #[arg(long)]
        reject_unknown: bool,
    },

    /// Print a batch of mock records
    Mock {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Operate on a stored record collection
    Records {
        /// Path to configuration file
        #[arg(long, default_value = "./fauxbase.json")]
        config: PathBuf,

        /// Collection id
        #[arg(long)]
        collection: String,

        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,

        #[command(subcommand)]
        op: RecordOp,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordOp {
    /// List records, sorted and paginated
    List {
        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        order: String,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Page size, clamped to 1..=100
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch one record by primary key
    Get { key: String },

    /// Create a record from stdin, or update the one with the same key
    Create,

    /// Merge a patch from stdin into a record
    Update { key: String },

    /// Delete one record by primary key
    Delete { key: String },

    /// Fill an empty collection with mock records
    Seed {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
