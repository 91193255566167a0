use crate::{
    CommandError, SpawnCollisionError,
    core::{Board, MoveDirection, Piece, PieceKind, RotationDirection},
};

use super::{
    lock_delay::PieceId,
    piece_buffer::{HoldSlot, PieceBuffer},
};

/// Result of committing a piece into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    pub piece: Piece,
    pub piece_id: PieceId,
    pub cleared_lines: usize,
    pub perfect_clear: bool,
}

/// Board, active piece, next queue and hold for a single play-through.
///
/// The active piece is only ever replaced by a candidate that passed
/// [`Board::is_valid`]. It is absent only after a top-out.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    active: Option<Piece>,
    piece_id: PieceId,
    piece_buffer: PieceBuffer,
}

impl GameField {
    /// Creates a field with an empty board and no active piece.
    ///
    /// Call [`Self::spawn_next`] to bring in the first piece.
    #[must_use]
    pub fn new(piece_buffer: PieceBuffer) -> Self {
        Self {
            board: Board::EMPTY,
            active: None,
            piece_id: PieceId(0),
            piece_buffer,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<Piece> {
        self.active
    }

    /// Identity of the current active-piece instance.
    #[must_use]
    pub fn piece_id(&self) -> PieceId {
        self.piece_id
    }

    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.active.map(|piece| piece.drop_position(&self.board))
    }

    #[must_use]
    pub fn hold_slot(&self) -> HoldSlot {
        self.piece_buffer.hold_slot()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    fn active_or_err(&self) -> Result<Piece, CommandError> {
        self.active.ok_or(CommandError::NoActivePiece)
    }

    pub fn try_move(&mut self, direction: MoveDirection) -> Result<(), CommandError> {
        let piece = self
            .active_or_err()?
            .moved(direction, &self.board)
            .ok_or(CommandError::Collision)?;
        self.active = Some(piece);
        Ok(())
    }

    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), CommandError> {
        let piece = self
            .active_or_err()?
            .super_rotated(direction, &self.board)
            .ok_or(CommandError::NoValidKick)?;
        self.active = Some(piece);
        Ok(())
    }

    /// Moves the active piece to its ghost position without locking it.
    pub fn hard_drop(&mut self) -> Result<(), CommandError> {
        let piece = self.active_or_err()?;
        self.active = Some(piece.drop_position(&self.board));
        Ok(())
    }

    #[must_use]
    pub fn peek_piece_after_hold(&self) -> Piece {
        Piece::spawn(self.piece_buffer.peek_hold_result())
    }

    /// Stashes the active piece and activates the held piece or the queue
    /// head in spawn form.
    pub fn try_hold(&mut self) -> Result<(), CommandError> {
        let current = self.active_or_err()?;
        if !self.piece_buffer.hold_slot().can_hold {
            return Err(CommandError::HoldUsed);
        }
        let candidate = self.peek_piece_after_hold();
        if !self.board.is_valid(&candidate) {
            return Err(CommandError::HoldBlocked);
        }

        let kind = self.piece_buffer.hold(current.kind());
        debug_assert_eq!(kind, candidate.kind());
        self.activate(candidate);
        Ok(())
    }

    fn activate(&mut self, piece: Piece) {
        self.piece_id = self.piece_id.next();
        self.active = Some(piece);
    }

    /// Promotes the queue head to the active piece.
    ///
    /// On collision the field is left without an active piece.
    pub fn spawn_next(&mut self) -> Result<(), SpawnCollisionError> {
        let piece = Piece::spawn(self.piece_buffer.pop_next());
        if !self.board.is_valid(&piece) {
            self.active = None;
            return Err(SpawnCollisionError);
        }
        self.activate(piece);
        Ok(())
    }

    /// Locks the active piece: merge, clear lines, re-enable hold and spawn
    /// the next piece.
    ///
    /// Returns `None` without changes when there is no active piece.
    pub fn complete_piece_drop(
        &mut self,
    ) -> Option<(DropOutcome, Result<(), SpawnCollisionError>)> {
        let piece = self.active.take()?;
        self.board.fill_piece(piece);
        let cleared_lines = self.board.clear_lines();
        let outcome = DropOutcome {
            piece,
            piece_id: self.piece_id,
            cleared_lines,
            perfect_clear: cleared_lines > 0 && self.board.is_empty(),
        };
        self.piece_buffer.enable_hold();
        Some((outcome, self.spawn_next()))
    }

    /// Removes the active piece and empties the bag after a game over.
    pub fn end_game(&mut self) {
        self.active = None;
        self.piece_buffer.reset_bag();
    }

    /// Empties the board, hold and queue. No piece is active afterwards.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.active = None;
        self.piece_buffer.reset();
    }

    #[cfg(test)]
    pub(crate) fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    #[cfg(test)]
    pub(crate) fn set_active_piece(&mut self, piece: Piece) {
        self.activate(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bag, PiecePosition, PieceRotation, PieceSeed};

    fn field() -> GameField {
        let buffer = PieceBuffer::new(Bag::with_seed(PieceSeed::from(3)), 5);
        let mut field = GameField::new(buffer);
        field.spawn_next().unwrap();
        field
    }

    #[test]
    fn test_spawn_issues_new_piece_ids() {
        let mut field = field();
        let first = field.piece_id();
        field.hard_drop().unwrap();
        let (outcome, result) = field.complete_piece_drop().unwrap();
        assert!(result.is_ok());
        assert_eq!(outcome.piece_id, first);
        assert_ne!(field.piece_id(), first);
    }

    #[test]
    fn test_failed_move_keeps_piece() {
        let mut field = field();
        let piece = Piece::new(PieceKind::O, PieceRotation::SPAWN, PiecePosition::new(-1, 5));
        field.set_active_piece(piece);
        assert_eq!(
            field.try_move(MoveDirection::Left),
            Err(CommandError::Collision)
        );
        assert_eq!(field.active_piece(), Some(piece));
    }

    #[test]
    fn test_complete_drop_clears_line() {
        let mut field = field();
        field.set_board(Board::from_ascii("IIII..IIII"));
        let piece = Piece::new(PieceKind::O, PieceRotation::SPAWN, PiecePosition::new(4, 20));
        field.set_active_piece(piece);

        let (outcome, result) = field.complete_piece_drop().unwrap();
        assert!(result.is_ok());
        assert_eq!(outcome.cleared_lines, 1);
        assert!(!outcome.perfect_clear);
        assert_eq!(*field.board(), Board::from_ascii("....OO...."));
    }

    #[test]
    fn test_perfect_clear_detected() {
        let mut field = field();
        field.set_board(Board::from_ascii(
            r"
            OOOO..OOOO
            OOOO..OOOO
            ",
        ));
        let piece = Piece::new(PieceKind::O, PieceRotation::SPAWN, PiecePosition::new(4, 20));
        field.set_active_piece(piece);

        let (outcome, _) = field.complete_piece_drop().unwrap();
        assert_eq!(outcome.cleared_lines, 2);
        assert!(outcome.perfect_clear);
        assert!(field.board().is_empty());
    }

    #[test]
    fn test_spawn_collision_leaves_no_active_piece() {
        let mut field = field();
        field.set_board(Board::from_ascii(&"IIIII.IIII\n".repeat(Board::TOTAL_HEIGHT)));
        assert_eq!(field.spawn_next(), Err(SpawnCollisionError));
        assert_eq!(field.active_piece(), None);
        assert_eq!(field.complete_piece_drop(), None);
    }

    fn board_with_buffer_filled() -> Board {
        let mut art = "IIIIIIIIII\n".repeat(2);
        art.push_str(&"..........\n".repeat(Board::VISIBLE_HEIGHT));
        Board::from_ascii(&art)
    }

    #[test]
    fn test_hold_blocked_from_empty_slot() {
        let mut field = field();
        let low = Piece::new(PieceKind::T, PieceRotation::SPAWN, PiecePosition::new(3, 10));
        field.set_active_piece(low);
        field.set_board(board_with_buffer_filled());
        let queue_before: Vec<_> = field.next_pieces().collect();

        assert_eq!(field.try_hold(), Err(CommandError::HoldBlocked));
        assert_eq!(field.active_piece(), Some(low));
        assert_eq!(field.hold_slot(), HoldSlot::default());
        assert_eq!(field.next_pieces().collect::<Vec<_>>(), queue_before);
    }

    #[test]
    fn test_hold_blocked_when_swap_target_collides() {
        let mut field = field();
        field.try_hold().unwrap();
        field.piece_buffer.enable_hold();
        let low = Piece::new(PieceKind::T, PieceRotation::SPAWN, PiecePosition::new(3, 10));
        field.set_active_piece(low);
        field.set_board(board_with_buffer_filled());
        let hold_before = field.hold_slot();
        let id_before = field.piece_id();

        assert_eq!(field.try_hold(), Err(CommandError::HoldBlocked));
        assert_eq!(field.active_piece(), Some(low));
        assert_eq!(field.hold_slot(), hold_before);
        assert_eq!(field.piece_id(), id_before);
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut field = field();
        let first = field.active_piece().unwrap().kind();
        let head = field.next_pieces().next().unwrap();
        field.try_hold().unwrap();
        assert_eq!(field.active_piece(), Some(Piece::spawn(head)));
        assert_eq!(field.hold_slot().piece, Some(first));
        assert_eq!(field.try_hold(), Err(CommandError::HoldUsed));
    }
}
