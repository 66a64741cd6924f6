//! typed-settings: resolve and convert typed settings from the command line

use anyhow::Result;
use std::process::ExitCode;

mod cli;

fn main() -> Result<ExitCode> {
    cli::run()
}
