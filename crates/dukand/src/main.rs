//! Dukan checkout API daemon

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use anyhow::Result;
use clap::Parser;
use dukand::cli::CLIArgs;
use dukand::{get_work_directory, load_settings, run_dukand, setup_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = CLIArgs::parse();
    let work_dir = get_work_directory(&args)?;
    let settings = load_settings(&work_dir, args.config)?;

    run_dukand(&settings).await
}
