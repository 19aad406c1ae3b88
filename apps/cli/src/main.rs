//! repofrag CLI — repository fragment extraction for summarization prompts.
//!
//! `extract` captures excerpts of build, container, config and source files
//! into `fragments.json`; `build-payload` turns that into a size-bounded
//! `prompt_payload.json`.

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
