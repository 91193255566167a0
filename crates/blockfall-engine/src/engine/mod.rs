//! Game rules and state management.
//!
//! This module builds the play-through on top of the [`core`](crate::core)
//! geometry:
//!
//! - [`Bag`] - seeded 7-bag randomizer ([`PieceSeed`])
//! - [`PieceBuffer`] - next queue and [`HoldSlot`]
//! - [`GameField`] - board, active piece and the lock pipeline
//! - [`GameStats`] - line clears, combo, perfect clears, score and level
//! - [`GameSession`] - the command surface, lock delay, pause and countdown
//! - [`SessionSnapshot`] - serializable read model
//! - [`Scheduler`] - virtual-clock driver for the session timers
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a [`SessionConfig`]
//! 2. Issue commands (move, rotate, hold, drop) one at a time
//! 3. Drive gravity, lock delay and the countdown through a [`Scheduler`]
//!    or by calling the tick commands directly
//! 4. Each lock merges the piece, clears lines, scores and spawns the next
//!    piece; the game ends when a spawn collides or time runs out
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{GameSession, Scheduler, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::default()).unwrap();
//! let mut scheduler = Scheduler::new();
//!
//! session.move_right().ok();
//! scheduler.advance(&mut session, Duration::from_millis(16));
//! session.hard_drop().unwrap();
//!
//! if session.is_game_over() {
//!     println!("Game over!");
//! }
//! ```

pub use self::{
    bag::*, config::*, game_field::*, game_session::*, game_stats::*, lock_delay::*,
    piece_buffer::*, scheduler::*, snapshot::*,
};

mod bag;
mod config;
mod game_field;
mod game_session;
mod game_stats;
mod lock_delay;
mod piece_buffer;
mod scheduler;
mod snapshot;
