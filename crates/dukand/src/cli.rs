//! Command line arguments

use clap::Parser;

/// Daemon arguments
#[derive(Parser)]
#[command(about = "A homemade-foods checkout API written in rust", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"))]
pub struct CLIArgs {
    #[arg(
        short,
        long,
        help = "Use the <file name> as the location of the config file",
        required = false
    )]
    pub config: Option<String>,
    #[arg(
        short,
        long,
        help = "Use the <directory> as the working directory",
        required = false
    )]
    pub work_dir: Option<String>,
}
