//! Kerf CLI
//!
//! # Usage
//!
//! ```bash
//! # Train and export one model type
//! kerf train --model-type waste_predictor --data jobs.json --output-dir models
//!
//! # Explain one prediction
//! kerf explain --model-type waste_predictor --model-path models/waste_predictor.kerf \
//!     --input-data '{"totalPieceCount": 120, "kerf": 3}'
//!
//! # Show the side-car of an artifact
//! kerf info --model-path models/waste_predictor.kerf
//! ```

use clap::Parser;
use kerf::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
