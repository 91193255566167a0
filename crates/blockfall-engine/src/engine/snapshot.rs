use std::fmt;

use serde::Serialize;

use crate::core::{Board, Piece, PieceKind};

use super::{
    game_session::{GameSession, SessionState},
    piece_buffer::HoldSlot,
};

/// Read model of a session for renderers and reports.
///
/// `board` holds the visible rows top to bottom, one character per cell:
/// `.` for empty, the piece letter otherwise. The active piece is not
/// merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: Vec<String>,
    pub active_piece: Option<Piece>,
    pub ghost_piece: Option<Piece>,
    pub hold: HoldSlot,
    pub next_queue: Vec<PieceKind>,
    pub score: usize,
    pub total_lines: usize,
    pub level: usize,
    pub combo: usize,
    pub elapsed_secs: u64,
    pub remaining_secs: Option<u64>,
    pub state: SessionState,
}

fn render_rows(board: &Board) -> Vec<String> {
    board
        .visible_rows()
        .map(|row| row.iter().map(|cell| cell.as_char()).collect())
        .collect()
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        Self {
            board: render_rows(session.board()),
            active_piece: session.active_piece(),
            ghost_piece: session.ghost_piece(),
            hold: session.hold_slot(),
            next_queue: session.next_pieces().collect(),
            score: session.score(),
            total_lines: session.total_lines(),
            level: session.level(),
            combo: session.combo(),
            elapsed_secs: session.elapsed_secs(),
            remaining_secs: session.remaining_secs(),
            state: session.session_state(),
        }
    }
}

impl GameSession {
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.board {
            writeln!(f, "|{row}|")?;
        }
        write!(
            f,
            "score {} lines {} level {} combo {}",
            self.score, self.total_lines, self.level, self.combo
        )
    }
}
