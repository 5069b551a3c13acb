//! Core library entry for the `planboard` CLI.
//!
//! [`aggregator::TaskAggregator`] merges a personal calendar with workspace
//! tasks assigned to the same identity and derives filtered, today and
//! upcoming views over them. Stores and notification delivery sit behind the
//! traits in [`ports`].

pub mod adapters;
pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod ports;
pub mod store;
pub mod task;

pub use error::{Error, Result};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["planboard", "unknown"]);
        assert!(result.is_err());
    }
}
