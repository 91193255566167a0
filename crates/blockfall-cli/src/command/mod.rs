use clap::{Parser, Subcommand};

use self::{run_script::RunScriptArg, simulate::SimulateArg};

mod run_script;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run headless sessions with a random-input bot and report statistics
    Simulate(#[clap(flatten)] SimulateArg),
    /// Replay a JSON command script and print the final session snapshot
    RunScript(#[clap(flatten)] RunScriptArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::RunScript(arg) => run_script::run(&arg)?,
    }
    Ok(())
}
