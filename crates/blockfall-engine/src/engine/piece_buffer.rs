use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::PieceKind;

use super::bag::Bag;

/// One-piece stash plus the gate that allows one hold per falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldSlot {
    pub piece: Option<PieceKind>,
    pub can_hold: bool,
}

impl Default for HoldSlot {
    fn default() -> Self {
        Self {
            piece: None,
            can_hold: true,
        }
    }
}

/// Next queue and hold slot, fed by a 7-bag.
///
/// # Next Queue
///
/// The queue always holds exactly `depth` upcoming pieces. Consuming the
/// head pulls one fresh draw from the bag onto the tail.
///
/// # Hold System
///
/// - Can hold one piece at a time
/// - First hold stores the current piece and promotes the queue head
/// - Subsequent holds swap the current piece with the held piece
/// - Only one hold is allowed until [`Self::enable_hold`] is called on lock
///
/// # Example
///
/// ```
/// use blockfall_engine::{Bag, PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::new(Bag::with_seed(PieceSeed::from(1)), 5);
/// let first = buffer.pop_next();
/// assert_eq!(buffer.next_pieces().count(), 5);
/// let swapped_in = buffer.hold(first);
/// assert_eq!(buffer.hold_slot().piece, Some(first));
/// assert!(!buffer.hold_slot().can_hold);
/// # let _ = swapped_in;
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    bag: Bag,
    next: VecDeque<PieceKind>,
    depth: usize,
    hold: HoldSlot,
}

impl PieceBuffer {
    /// Creates a buffer whose queue is filled to `depth` from `bag`.
    #[must_use]
    pub fn new(bag: Bag, depth: usize) -> Self {
        let mut this = Self {
            bag,
            next: VecDeque::with_capacity(depth),
            depth,
            hold: HoldSlot::default(),
        };
        this.fill_queue();
        this
    }

    fn fill_queue(&mut self) {
        while self.next.len() < self.depth {
            self.next.push_back(self.bag.draw());
        }
    }

    /// Consumes the queue head and refills the tail from the bag.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, which cannot happen for `depth >= 1`.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self
            .next
            .pop_front()
            .expect("Next queue should never be empty");
        self.fill_queue();
        kind
    }

    /// Returns the queue head without consuming it.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, which cannot happen for `depth >= 1`.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        *self.next.front().expect("Next queue should never be empty")
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.next.iter().copied()
    }

    #[must_use]
    pub fn hold_slot(&self) -> HoldSlot {
        self.hold
    }

    /// Returns what piece would become active if hold is used now.
    ///
    /// - If a piece is held: returns the held piece
    /// - If no piece is held: returns the queue head
    #[must_use]
    pub fn peek_hold_result(&self) -> PieceKind {
        self.hold.piece.unwrap_or_else(|| self.peek_next())
    }

    /// Stores `current` in the hold slot and returns the piece to activate.
    ///
    /// Closes the hold gate. Callers check [`HoldSlot::can_hold`] and the
    /// spawn validity of [`Self::peek_hold_result`] first.
    pub fn hold(&mut self, current: PieceKind) -> PieceKind {
        self.hold.can_hold = false;
        self.hold
            .piece
            .replace(current)
            .unwrap_or_else(|| self.pop_next())
    }

    /// Re-opens the hold gate. Called only when a piece locks.
    pub fn enable_hold(&mut self) {
        self.hold.can_hold = true;
    }

    /// Empties the bag so that the next draw starts a fresh cycle.
    pub fn reset_bag(&mut self) {
        self.bag.reset();
    }

    /// Clears hold and refills the queue from a freshly reset bag.
    pub fn reset(&mut self) {
        self.bag.reset();
        self.next.clear();
        self.hold = HoldSlot::default();
        self.fill_queue();
    }
}
