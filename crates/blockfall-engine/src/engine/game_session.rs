use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    CommandError, ConfigError,
    core::{Board, MoveDirection, Piece, PieceKind, RotationDirection},
};

use super::{
    bag::{Bag, PieceSeed},
    config::SessionConfig,
    game_field::GameField,
    game_stats::{GameStats, ScoreBreakdown},
    lock_delay::{LockDecision, LockDelay, LockTimer, LockTimerToken, PieceId},
    piece_buffer::{HoldSlot, PieceBuffer},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A discrete input to a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDropStep,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
    Hold,
    TogglePause,
    GravityTick,
    LockDelayExpire(LockTimerToken),
    CountdownTick,
}

/// Record of one piece lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEvent {
    pub piece: Piece,
    pub piece_id: PieceId,
    pub cleared_lines: usize,
    pub combo: usize,
    pub perfect_clear: bool,
    pub score: ScoreBreakdown,
    pub total_score: usize,
    pub level: usize,
    pub game_over: bool,
}

/// A play-through driven by serialized commands.
///
/// Every command either applies fully and returns `Ok(())`, or is rejected
/// with a [`CommandError`] and leaves the session untouched. The session
/// never reads a clock: gravity, lock delay and the countdown arrive as
/// [`Self::gravity_tick`], [`Self::lock_delay_expire`] and
/// [`Self::countdown_tick`] from an external driver such as
/// [`Scheduler`](super::Scheduler).
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default()).unwrap();
/// session.move_left().ok();
/// session.rotate_clockwise().ok();
/// session.hard_drop().unwrap();
///
/// let event = session.take_last_lock_event().unwrap();
/// assert_eq!(event.cleared_lines, 0);
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    seed: PieceSeed,
    field: GameField,
    stats: GameStats,
    lock_delay: LockDelay,
    session_state: SessionState,
    elapsed_secs: u64,
    remaining_secs: Option<u64>,
    last_lock_event: Option<LockEvent>,
}

impl GameSession {
    /// Starts a session: empty board, fresh bag, full next queue, empty hold.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let buffer = PieceBuffer::new(Bag::with_seed(seed), config.next_queue_len);
        let mut this = Self {
            seed,
            field: GameField::new(buffer),
            stats: GameStats::new(),
            lock_delay: LockDelay::new(config.lock_delay(), config.max_lock_resets),
            session_state: SessionState::Playing,
            elapsed_secs: 0,
            remaining_secs: config.time_limit_secs,
            last_lock_event: None,
            config,
        };
        this.spawn_piece();
        Ok(this)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Seed actually used by the randomizer.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.session_state.is_game_over()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.session_state.is_paused()
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<Piece> {
        self.field.active_piece()
    }

    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.field.ghost_piece()
    }

    #[must_use]
    pub fn hold_slot(&self) -> HoldSlot {
        self.field.hold_slot()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.hold_slot().piece
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.hold_slot().can_hold
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.field.next_pieces()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.stats.level()
    }

    #[must_use]
    pub fn combo(&self) -> usize {
        self.stats.combo()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Seconds left on the countdown; `None` when untimed.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs
    }

    /// The pending lock timer, if the active piece is grounded.
    #[must_use]
    pub fn lock_timer(&self) -> Option<LockTimer> {
        self.lock_delay.armed()
    }

    /// Grounded resets used by the active piece so far.
    #[must_use]
    pub fn lock_resets(&self) -> u32 {
        self.lock_delay.resets()
    }

    /// Returns the most recent lock, once.
    pub fn take_last_lock_event(&mut self) -> Option<LockEvent> {
        self.last_lock_event.take()
    }

    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDropStep => self.soft_drop_step(),
            Command::HardDrop => self.hard_drop(),
            Command::RotateClockwise => self.rotate_clockwise(),
            Command::RotateCounterClockwise => self.rotate_counter_clockwise(),
            Command::Hold => self.hold(),
            Command::TogglePause => self.toggle_pause(),
            Command::GravityTick => self.gravity_tick(),
            Command::LockDelayExpire(token) => self.lock_delay_expire(token),
            Command::CountdownTick => self.countdown_tick(),
        }
    }

    /// Applies `command` and returns the resulting session, unchanged when
    /// the command was rejected.
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        let _ = self.apply(command);
        self
    }

    fn ensure_playing(&self) -> Result<(), CommandError> {
        match self.session_state {
            SessionState::Playing => Ok(()),
            SessionState::Paused => Err(CommandError::Paused),
            SessionState::GameOver => Err(CommandError::GameOver),
        }
    }

    fn try_move(&mut self, direction: MoveDirection) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.field.try_move(direction)?;
        self.reevaluate_ground();
        Ok(())
    }

    fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.field.try_rotate(direction)?;
        self.reevaluate_ground();
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), CommandError> {
        self.try_move(MoveDirection::Left)
    }

    pub fn move_right(&mut self) -> Result<(), CommandError> {
        self.try_move(MoveDirection::Right)
    }

    pub fn soft_drop_step(&mut self) -> Result<(), CommandError> {
        self.try_move(MoveDirection::Down)
    }

    pub fn rotate_clockwise(&mut self) -> Result<(), CommandError> {
        self.try_rotate(RotationDirection::Clockwise)
    }

    pub fn rotate_counter_clockwise(&mut self) -> Result<(), CommandError> {
        self.try_rotate(RotationDirection::CounterClockwise)
    }

    /// Drops the active piece to its ghost position and locks it at once.
    pub fn hard_drop(&mut self) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.field.hard_drop()?;
        self.lock_piece();
        Ok(())
    }

    pub fn hold(&mut self) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.field.try_hold()?;
        self.lock_delay.cancel();
        self.reevaluate_ground();
        Ok(())
    }

    /// Switches between playing and paused.
    ///
    /// Pausing drops any pending lock timer; resuming re-evaluates the
    /// active piece so a grounded piece gets a fresh full-length timer.
    pub fn toggle_pause(&mut self) -> Result<(), CommandError> {
        match self.session_state {
            SessionState::Playing => {
                self.session_state = SessionState::Paused;
                self.lock_delay.cancel();
            }
            SessionState::Paused => {
                self.session_state = SessionState::Playing;
                self.reevaluate_ground();
            }
            SessionState::GameOver => return Err(CommandError::GameOver),
        }
        Ok(())
    }

    /// Moves the piece one row down; if it is grounded with no lock timer
    /// pending, starts the lock-delay cycle instead.
    pub fn gravity_tick(&mut self) -> Result<(), CommandError> {
        self.ensure_playing()?;
        match self.field.try_move(MoveDirection::Down) {
            Ok(()) => {
                self.reevaluate_ground();
                Ok(())
            }
            Err(CommandError::Collision) if self.lock_delay.armed().is_none() => {
                self.reevaluate_ground();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Locks the active piece if `token` is the currently armed lock timer.
    pub fn lock_delay_expire(&mut self, token: LockTimerToken) -> Result<(), CommandError> {
        self.ensure_playing()?;
        if !self.lock_delay.is_current(token) {
            return Err(CommandError::StaleLockTimer);
        }
        self.lock_piece();
        Ok(())
    }

    /// Advances the session clock by one second.
    pub fn countdown_tick(&mut self) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.elapsed_secs += 1;
        if let Some(remaining) = &mut self.remaining_secs {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.game_over();
            }
        }
        Ok(())
    }

    /// Starts over with the same config, keeping the random stream.
    pub fn restart(&mut self) {
        self.field.reset();
        self.stats = GameStats::new();
        self.lock_delay.cancel();
        self.session_state = SessionState::Playing;
        self.elapsed_secs = 0;
        self.remaining_secs = self.config.time_limit_secs;
        self.last_lock_event = None;
        self.spawn_piece();
    }

    fn spawn_piece(&mut self) {
        self.lock_delay.cancel();
        if self.field.spawn_next().is_err() {
            self.game_over();
            return;
        }
        self.reevaluate_ground();
    }

    fn reevaluate_ground(&mut self) {
        let Some(piece) = self.field.active_piece() else {
            return;
        };
        let grounded = piece.is_grounded(self.field.board());
        match self.lock_delay.on_ground_state(self.field.piece_id(), grounded) {
            LockDecision::Idle | LockDecision::Armed(_) => {}
            LockDecision::LockNow => self.lock_piece(),
        }
    }

    fn lock_piece(&mut self) {
        self.lock_delay.cancel();
        let Some((outcome, spawn_result)) = self.field.complete_piece_drop() else {
            return;
        };
        let score = self
            .stats
            .complete_piece_drop(outcome.cleared_lines, outcome.perfect_clear);
        let game_over = spawn_result.is_err();
        self.last_lock_event = Some(LockEvent {
            piece: outcome.piece,
            piece_id: outcome.piece_id,
            cleared_lines: outcome.cleared_lines,
            combo: self.stats.combo(),
            perfect_clear: outcome.perfect_clear,
            score,
            total_score: self.stats.score(),
            level: self.stats.level(),
            game_over,
        });
        if game_over {
            self.game_over();
        } else {
            self.reevaluate_ground();
        }
    }

    fn game_over(&mut self) {
        self.session_state = SessionState::GameOver;
        self.lock_delay.cancel();
        self.field.end_game();
    }
}
