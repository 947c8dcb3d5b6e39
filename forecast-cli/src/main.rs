//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Optional interactive prompting for coordinates
//! - Logging setup and mapping failures to exit codes

use std::{io, process::ExitCode};

use clap::Parser;

mod cli;
mod logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();

    if let Err(err) = logging::init(cmd.verbose) {
        eprintln!("warning: {err}");
    }

    let mut stdout = io::stdout().lock();
    match cmd.run(&mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
