// upmix-cli/src/main.rs
//
// This file defines the command-line interface for the upmix batch
// conversion tool.
//
// Responsibilities include:
// - Parsing user-provided arguments (clap).
// - Setting up logging (env_logger, RUST_LOG).
// - Invoking the core conversion pipeline (upmix-core).
// - Managing process exit codes based on success or failure.

use clap::Parser;
use std::process;

mod cli;
mod convert;
mod logging;
mod output;

use cli::{Cli, Commands};

fn main() {
    logging::init();

    let parsed = Cli::parse();
    let exit_code = match parsed.command {
        Commands::Convert(args) => match convert::run_convert(args) {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                log::error!("{e}");
                eprintln!("Error: {e}");
                2
            }
        },
    };
    process::exit(exit_code);
}
