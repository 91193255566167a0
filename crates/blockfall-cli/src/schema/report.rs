use blockfall_engine::{GameStats, LockEvent, PieceSeed, SessionConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a `simulate` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Timestamp when the report was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Config shared by every session (seed excluded)
    pub config: SessionConfig,
    pub input_interval_ms: u64,
    pub max_duration_secs: u64,
    pub sessions: Vec<SessionSummary>,
    pub aggregate: AggregateStats,
}

/// How a simulated session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A spawned piece collided with the stack
    TopOut,
    /// The countdown reached zero
    TimeUp,
    /// The simulation stopped at `max_duration_secs`
    MaxDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub index: usize,
    pub seed: PieceSeed,
    pub end_reason: EndReason,
    /// Virtual time the session ran, in milliseconds
    pub duration_ms: u64,
    pub commands: usize,
    pub rejected_commands: usize,
    pub final_stats: GameStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub sessions: usize,
    pub mean_score: f64,
    pub max_score: usize,
    pub mean_lines: f64,
    pub mean_pieces: f64,
    pub max_combo: usize,
    pub perfect_clears: usize,
    pub top_outs: usize,
}

impl AggregateStats {
    #[expect(clippy::cast_precision_loss)]
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }
        let n = summaries.len() as f64;
        let mean = |f: fn(&GameStats) -> usize| {
            summaries
                .iter()
                .map(|s| f(&s.final_stats) as f64)
                .sum::<f64>()
                / n
        };
        Self {
            sessions: summaries.len(),
            mean_score: mean(GameStats::score),
            max_score: summaries
                .iter()
                .map(|s| s.final_stats.score())
                .max()
                .unwrap_or(0),
            mean_lines: mean(GameStats::total_cleared_lines),
            mean_pieces: mean(GameStats::completed_pieces),
            max_combo: summaries
                .iter()
                .map(|s| s.final_stats.max_combo())
                .max()
                .unwrap_or(0),
            perfect_clears: summaries
                .iter()
                .map(|s| s.final_stats.perfect_clears())
                .sum(),
            top_outs: summaries
                .iter()
                .filter(|s| s.end_reason == EndReason::TopOut)
                .count(),
        }
    }
}

/// One line of the `--events` stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockEventRecord {
    pub session: usize,
    /// Virtual time of the lock, in milliseconds
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: LockEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(index: usize, lines: &[usize], end_reason: EndReason) -> SessionSummary {
        let mut stats = GameStats::new();
        for &n in lines {
            stats.complete_piece_drop(n, false);
        }
        SessionSummary {
            index,
            seed: PieceSeed::from(u64::try_from(index).unwrap()),
            end_reason,
            duration_ms: 1000,
            commands: 10,
            rejected_commands: 0,
            final_stats: stats,
        }
    }

    #[test]
    fn test_aggregate_from_summaries() {
        let summaries = [
            summary(0, &[1, 1, 0], EndReason::TopOut),
            summary(1, &[4], EndReason::TimeUp),
        ];
        let aggregate = AggregateStats::from_summaries(&summaries);
        assert_eq!(aggregate.sessions, 2);
        // 100 + (100 + 50) and 800
        assert_eq!(aggregate.max_score, 800);
        assert!((aggregate.mean_score - 525.0).abs() < f64::EPSILON);
        assert!((aggregate.mean_lines - 3.0).abs() < f64::EPSILON);
        assert!((aggregate.mean_pieces - 2.0).abs() < f64::EPSILON);
        assert_eq!(aggregate.max_combo, 2);
        assert_eq!(aggregate.top_outs, 1);
    }

    #[test]
    fn test_aggregate_of_nothing() {
        assert_eq!(AggregateStats::from_summaries(&[]), AggregateStats::default());
    }
}
