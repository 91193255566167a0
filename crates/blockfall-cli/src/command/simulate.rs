use std::{io::Write as _, path::PathBuf, time::Duration};

use anyhow::Context as _;
use blockfall_engine::{Command, GameSession, PieceSeed, Scheduler, SessionConfig};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::report::{
        AggregateStats, EndReason, LockEventRecord, SessionSummary, SimulationReport,
    },
    util::{Output, SessionConfigArg},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of sessions to run
    #[arg(long, default_value_t = 10)]
    sessions: usize,
    /// Base seed; session `i` uses `seed + i`. Random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Virtual milliseconds between bot inputs
    #[arg(long, default_value_t = 250)]
    input_interval_ms: u64,
    /// Stop a session after this much virtual time
    #[arg(long, default_value_t = 600)]
    max_duration_secs: u64,
    #[clap(flatten)]
    config: SessionConfigArg,
    /// Output file path for the report
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write one JSON line per piece lock to this file
    #[arg(long)]
    events: Option<PathBuf>,
}

/// Bot inputs and their relative weights.
const BOT_COMMANDS: [(Command, u32); 7] = [
    (Command::MoveLeft, 6),
    (Command::MoveRight, 6),
    (Command::RotateClockwise, 4),
    (Command::RotateCounterClockwise, 2),
    (Command::SoftDropStep, 3),
    (Command::Hold, 1),
    (Command::HardDrop, 2),
];

#[derive(Debug)]
struct RandomBot {
    rng: Pcg32,
}

impl RandomBot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn next_command(&mut self) -> Command {
        let total: u32 = BOT_COMMANDS.iter().map(|(_, weight)| weight).sum();
        let mut pick = self.rng.random_range(0..total);
        for (command, weight) in BOT_COMMANDS {
            if pick < weight {
                return command;
            }
            pick -= weight;
        }
        Command::HardDrop
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        sessions,
        seed,
        input_interval_ms,
        max_duration_secs,
        config,
        output,
        events,
    } = arg;

    anyhow::ensure!(*input_interval_ms > 0, "--input-interval-ms must be positive");
    let config = config.load()?;
    let base_seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut events = events.clone().map(Output::open).transpose()?;

    eprintln!("Simulating {sessions} sessions (base seed {base_seed})...");
    let mut summaries = Vec::with_capacity(*sessions);
    for index in 0..*sessions {
        let session_seed = base_seed.wrapping_add(u64::try_from(index)?);
        let summary = run_session(
            index,
            session_seed,
            &config,
            Duration::from_millis(*input_interval_ms),
            Duration::from_secs(*max_duration_secs),
            events.as_mut(),
        )?;
        eprintln!(
            "Session {index}: {:?} after {} pieces, score {}, lines {}",
            summary.end_reason,
            summary.final_stats.completed_pieces(),
            summary.final_stats.score(),
            summary.final_stats.total_cleared_lines(),
        );
        summaries.push(summary);
    }
    if let Some(events) = &mut events {
        events
            .flush()
            .with_context(|| format!("Failed to flush {}", events.display_path()))?;
    }

    let aggregate = AggregateStats::from_summaries(&summaries);
    eprintln!(
        "Mean score {:.1}, mean lines {:.1}, top-outs {}/{}",
        aggregate.mean_score, aggregate.mean_lines, aggregate.top_outs, aggregate.sessions
    );
    let report = SimulationReport {
        generated_at: chrono::Utc::now(),
        config: SessionConfig {
            seed: None,
            ..config
        },
        input_interval_ms: *input_interval_ms,
        max_duration_secs: *max_duration_secs,
        sessions: summaries,
        aggregate,
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}

fn run_session(
    index: usize,
    seed: u64,
    config: &SessionConfig,
    input_interval: Duration,
    max_duration: Duration,
    mut events: Option<&mut Output>,
) -> anyhow::Result<SessionSummary> {
    let piece_seed = PieceSeed::from(seed);
    let mut session = GameSession::new(SessionConfig {
        seed: Some(piece_seed),
        ..config.clone()
    })?;
    let mut scheduler = Scheduler::new();
    let mut bot = RandomBot::new(seed);
    let mut commands = 0;
    let mut rejected_commands = 0;

    while !session.is_game_over() && scheduler.now() < max_duration {
        commands += 1;
        if session.apply(bot.next_command()).is_err() {
            rejected_commands += 1;
        }
        record_lock(&mut session, &scheduler, index, events.as_deref_mut())?;
        scheduler.advance(&mut session, input_interval);
        record_lock(&mut session, &scheduler, index, events.as_deref_mut())?;
    }

    let end_reason = match (session.is_game_over(), session.remaining_secs()) {
        (false, _) => EndReason::MaxDuration,
        (true, Some(0)) => EndReason::TimeUp,
        (true, _) => EndReason::TopOut,
    };
    Ok(SessionSummary {
        index,
        seed: piece_seed,
        end_reason,
        duration_ms: u64::try_from(scheduler.now().as_millis())?,
        commands,
        rejected_commands,
        final_stats: session.stats().clone(),
    })
}

fn record_lock(
    session: &mut GameSession,
    scheduler: &Scheduler,
    index: usize,
    events: Option<&mut Output>,
) -> anyhow::Result<()> {
    let Some(event) = session.take_last_lock_event() else {
        return Ok(());
    };
    if let Some(events) = events {
        events.write_json_line(LockEventRecord {
            session: index,
            at_ms: u64::try_from(scheduler.now().as_millis())?,
            event,
        })?;
    }
    Ok(())
}
