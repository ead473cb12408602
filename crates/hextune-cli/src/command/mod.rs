use clap::{Parser, Subcommand};

use self::{fit::FitArg, inspect::InspectArg};

mod fit;
mod inspect;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fit behavior parameters to recorded trajectory logs
    Fit(#[clap(flatten)] FitArg),
    /// Parse trajectory logs and print per-file summaries
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Fit(arg) => fit::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
