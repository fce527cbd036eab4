use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::logging::LogLevel;

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub network_file_location: PathBuf,
    pub log_level: LogLevel,
    pub operation: Operation,
}

/// One transaction to run between Init and Close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Write {
        function: String,
        table: String,
        payload: String,
    },
    Read {
        function: String,
        table: String,
        payload: String,
    },
}

impl CliConfig {
    pub fn from_args() -> Result<Self, CliError> {
        Self::from_parsed(Args::parse())
    }

    pub fn try_from_iter<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let args = Args::try_parse_from(args).map_err(|e| CliError::Args(e.to_string()))?;
        Self::from_parsed(args)
    }
}

// -----------------------------------------------------------------------------
// ----- CliConfig: Private ----------------------------------------------------

impl CliConfig {
    fn from_parsed(args: Args) -> Result<Self, CliError> {
        let operation = match args.command {
            Command::Write(call) => Operation::Write {
                function: call.function,
                table: call.table,
                payload: call.payload,
            },
            Command::Read(call) => Operation::Read {
                function: call.function,
                table: call.table,
                payload: call.payload,
            },
        };

        let cfg = Self {
            network_file_location: args.network_file,
            log_level: args.log_level,
            operation,
        };
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<(), CliError> {
        must_exist_file(&self.network_file_location, "--network / network.toml")
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ledger-bridge",
    version,
    about = "Run one ledger transaction through a pooled gateway session"
)]
struct Args {
    // Must exist; no defaults.
    #[arg(long = "network", env = "LEDGER_BRIDGE_NETWORK_FILE")]
    network_file: PathBuf,

    // Not required via CLI or ENV (defaults to info).
    #[arg(long = "log", default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction and wait for it to commit.
    Write(Call),
    /// Evaluate a query and print the result.
    Read(Call),
}

#[derive(clap::Args, Debug)]
struct Call {
    #[arg(long)]
    function: String,

    #[arg(long)]
    table: String,

    // JSON value passed through to the contract untouched.
    #[arg(long, default_value = "")]
    payload: String,
}

// -----------------------------------------------------------------------------
// ----- Private Utils ---------------------------------------------------------

fn must_exist_file(path: &Path, hint: &str) -> Result<(), CliError> {
    let md = fs::metadata(path).map_err(|_| CliError::MissingFile {
        path: path.to_path_buf(),
        hint: hint.to_string(),
    })?;

    if !md.is_file() {
        return Err(CliError::NotAFile {
            path: path.to_path_buf(),
            hint: hint.to_string(),
        });
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Args(String),

    #[error("required file missing: {path:?} (from {hint})")]
    MissingFile { path: PathBuf, hint: String },

    #[error("path is not a file: {path:?} (from {hint})")]
    NotAFile { path: PathBuf, hint: String },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
