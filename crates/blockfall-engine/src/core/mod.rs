pub use self::{board::*, kick::*, piece::*, shape::*};

pub(crate) mod board;
pub(crate) mod kick;
pub(crate) mod piece;
pub(crate) mod shape;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows shown to the player.
pub const VISIBLE_HEIGHT: usize = 20;
/// Hidden rows above the visible area where pieces spawn.
pub const BUFFER_HEIGHT: usize = 2;
/// Total number of rows stored by the board.
pub const TOTAL_HEIGHT: usize = VISIBLE_HEIGHT + BUFFER_HEIGHT;
