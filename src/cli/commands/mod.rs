//! CLI command implementations

mod explain;
mod info;
mod train;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Explain(args) => explain::run_explain(args),
        Command::Info(args) => info::run_info(args, log_level),
    }
}
