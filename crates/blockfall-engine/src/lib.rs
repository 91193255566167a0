//! Rules engine for a falling-block puzzle game.
//!
//! - [`core`](crate::core) - static shape and kick tables, pieces and the board
//! - [`engine`](crate::engine) - the 7-bag, next queue and hold, lock delay, scoring and the
//!   command-driven [`GameSession`]
//!
//! The engine performs no I/O and reads no clock. An external driver (such
//! as [`Scheduler`]) issues commands one at a time and reads state back
//! through accessors or a [`SessionSnapshot`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// The spawned piece overlaps the board; the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("spawned piece collides with the board")]
pub struct SpawnCollisionError;

/// Reason a command was rejected.
///
/// A rejected command leaves the session exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CommandError {
    #[display("game is over")]
    GameOver,
    #[display("game is paused")]
    Paused,
    #[display("no active piece")]
    NoActivePiece,
    #[display("target position is occupied or out of bounds")]
    Collision,
    #[display("no kick offset produces a valid rotation")]
    NoValidKick,
    #[display("hold already used for this piece")]
    HoldUsed,
    #[display("piece colliding when holding piece")]
    HoldBlocked,
    #[display("lock timer is no longer armed")]
    StaleLockTimer,
}

/// Invalid [`SessionConfig`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("next queue length must be between 1 and {max}, got {len}")]
    NextQueueLength { len: usize, max: usize },
    #[display("lock delay must be positive")]
    ZeroLockDelay,
    #[display("time limit must be positive when set")]
    ZeroTimeLimit,
}
