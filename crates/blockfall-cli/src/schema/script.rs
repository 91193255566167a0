use blockfall_engine::{Command, PieceSeed, SessionConfig};
use serde::{Deserialize, Serialize};

/// Scripted play-through for `run-script`.
///
/// ```json
/// {
///   "seed": "000000000000000000000000000000ff",
///   "config": { "time_limit_secs": null },
///   "steps": ["move_left", "rotate_clockwise", { "wait_ms": 600 }, "hard_drop"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Overrides the config's seed when present
    #[serde(default)]
    pub seed: Option<PieceSeed>,
    #[serde(default)]
    pub config: Option<SessionConfig>,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    MoveLeft,
    MoveRight,
    SoftDropStep,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
    Hold,
    TogglePause,
    Restart,
    /// Advance the virtual clock, letting gravity, lock delay and the
    /// countdown fire
    WaitMs(u64),
}

impl ScriptStep {
    /// The session command for input steps; `None` for restart and waits.
    pub fn command(self) -> Option<Command> {
        let command = match self {
            ScriptStep::MoveLeft => Command::MoveLeft,
            ScriptStep::MoveRight => Command::MoveRight,
            ScriptStep::SoftDropStep => Command::SoftDropStep,
            ScriptStep::HardDrop => Command::HardDrop,
            ScriptStep::RotateClockwise => Command::RotateClockwise,
            ScriptStep::RotateCounterClockwise => Command::RotateCounterClockwise,
            ScriptStep::Hold => Command::Hold,
            ScriptStep::TogglePause => Command::TogglePause,
            ScriptStep::Restart | ScriptStep::WaitMs(_) => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(
            r#"{
                "seed": "000000000000000000000000000000ff",
                "config": { "time_limit_secs": null },
                "steps": ["move_left", { "wait_ms": 600 }, "hard_drop", "restart"]
            }"#,
        )
        .unwrap();
        assert_eq!(script.seed, Some(PieceSeed::from(0xFF)));
        assert_eq!(script.config.unwrap().time_limit_secs, None);
        assert_eq!(
            script.steps,
            [
                ScriptStep::MoveLeft,
                ScriptStep::WaitMs(600),
                ScriptStep::HardDrop,
                ScriptStep::Restart
            ]
        );
        assert_eq!(script.steps[0].command(), Some(Command::MoveLeft));
        assert_eq!(script.steps[1].command(), None);
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let result: Result<Script, _> = serde_json::from_str(r#"{ "steps": ["teleport"] }"#);
        assert!(result.is_err());
    }
}
