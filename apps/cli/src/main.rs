//! crateprov CLI: workflow-step provenance from RO-Crate metadata.
//!
//! Extracts the steps of a crate's workflow and prints them, their
//! document views, or the aggregated workflow context as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
