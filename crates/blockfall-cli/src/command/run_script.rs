use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameSession, Scheduler};

use crate::{
    schema::script::{Script, ScriptStep},
    util::{Output, read_json_file},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunScriptArg {
    /// Script JSON file
    script: PathBuf,
    /// Output file path for the final snapshot
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print every step and its outcome to stderr
    #[arg(long)]
    verbose: bool,
}

pub(crate) fn run(arg: &RunScriptArg) -> anyhow::Result<()> {
    let script: Script = read_json_file("script", &arg.script)?;
    eprintln!(
        "Running {} steps from {}",
        script.steps.len(),
        arg.script.display()
    );
    let session = run_steps(&script, arg.verbose)?;
    Output::save_json(&session.snapshot(), arg.output.clone())?;
    Ok(())
}

fn run_steps(script: &Script, verbose: bool) -> anyhow::Result<GameSession> {
    let mut config = script.config.clone().unwrap_or_default();
    if script.seed.is_some() {
        config.seed = script.seed;
    }
    let mut session = GameSession::new(config)?;
    let mut scheduler = Scheduler::new();
    eprintln!("Seed: {}", serde_json::to_string(&session.seed())?);

    for (i, step) in script.steps.iter().enumerate() {
        match *step {
            ScriptStep::WaitMs(ms) => {
                let fired = scheduler.advance(&mut session, Duration::from_millis(ms));
                if verbose {
                    eprintln!("step {i}: waited {ms} ms, fired {fired:?}");
                }
            }
            ScriptStep::Restart => {
                session.restart();
                scheduler.cancel_all();
                if verbose {
                    eprintln!("step {i}: restarted");
                }
            }
            input => {
                let Some(command) = input.command() else {
                    continue;
                };
                match session.apply(command) {
                    Ok(()) if verbose => eprintln!("step {i}: {input:?}"),
                    Ok(()) => {}
                    Err(e) => eprintln!("step {i}: {input:?} rejected: {e}"),
                }
            }
        }
        if let Some(event) = session.take_last_lock_event()
            && verbose
        {
            eprintln!(
                "step {i}: locked {} clearing {} line(s), +{}",
                event.piece,
                event.cleared_lines,
                event.score.total()
            );
        }
    }
    Ok(session)
}
