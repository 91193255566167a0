use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identity of one active-piece instance.
///
/// A fresh id is issued on every spawn and every hold swap, so a lock timer
/// can tell whether the piece it was armed for is still the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub(crate) u64);

impl PieceId {
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Token of one arming of the lock-delay timer.
///
/// Every arming gets a distinct token, even for the same piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockTimerToken {
    piece: PieceId,
    generation: u64,
}

impl LockTimerToken {
    #[must_use]
    pub fn piece(self) -> PieceId {
        self.piece
    }
}

/// A pending one-shot lock timer, as seen by the external driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTimer {
    token: LockTimerToken,
    delay: Duration,
}

impl LockTimer {
    #[must_use]
    pub fn token(&self) -> LockTimerToken {
        self.token
    }

    /// Time after arming at which the timer expires.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// What the session must do after re-evaluating groundedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockDecision {
    /// Piece is airborne; no timer pending.
    Idle,
    /// A fresh timer was armed.
    Armed(LockTimerToken),
    /// The reset cap was reached; lock without waiting.
    LockNow,
}

/// Lock-delay state machine for the active piece.
///
/// There is no "locked" state: locking happens outside, driven by the
/// returned [`LockDecision`] or by an expired timer.
#[derive(Debug, Clone)]
pub(crate) struct LockDelay {
    delay: Duration,
    max_resets: u32,
    resets: u32,
    armed: Option<LockTimerToken>,
    generation: u64,
}

impl LockDelay {
    pub(crate) fn new(delay: Duration, max_resets: u32) -> Self {
        Self {
            delay,
            max_resets,
            resets: 0,
            armed: None,
            generation: 0,
        }
    }

    pub(crate) fn on_ground_state(&mut self, piece: PieceId, grounded: bool) -> LockDecision {
        if !grounded {
            self.cancel();
            return LockDecision::Idle;
        }
        if self.resets >= self.max_resets {
            self.cancel();
            return LockDecision::LockNow;
        }
        self.resets += 1;
        self.generation += 1;
        let token = LockTimerToken {
            piece,
            generation: self.generation,
        };
        self.armed = Some(token);
        LockDecision::Armed(token)
    }

    /// Disarms the pending timer and zeroes the reset counter.
    pub(crate) fn cancel(&mut self) {
        self.armed = None;
        self.resets = 0;
    }

    pub(crate) fn armed(&self) -> Option<LockTimer> {
        self.armed.map(|token| LockTimer {
            token,
            delay: self.delay,
        })
    }

    pub(crate) fn is_current(&self, token: LockTimerToken) -> bool {
        self.armed == Some(token)
    }

    pub(crate) fn resets(&self) -> u32 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECE: PieceId = PieceId(1);

    fn lock_delay(max_resets: u32) -> LockDelay {
        LockDelay::new(Duration::from_millis(500), max_resets)
    }

    #[test]
    fn test_airborne_is_idle() {
        let mut lock = lock_delay(15);
        assert_eq!(lock.on_ground_state(PIECE, false), LockDecision::Idle);
        assert!(lock.armed().is_none());
    }

    #[test]
    fn test_grounded_arms_fresh_token_each_time() {
        let mut lock = lock_delay(15);
        let LockDecision::Armed(first) = lock.on_ground_state(PIECE, true) else {
            panic!("expected armed timer");
        };
        let LockDecision::Armed(second) = lock.on_ground_state(PIECE, true) else {
            panic!("expected armed timer");
        };
        assert_ne!(first, second);
        assert!(!lock.is_current(first));
        assert!(lock.is_current(second));
        assert_eq!(lock.armed().unwrap().delay(), Duration::from_millis(500));
        assert_eq!(lock.resets(), 2);
    }

    #[test]
    fn test_airborne_cancels_and_zeroes_resets() {
        let mut lock = lock_delay(15);
        let LockDecision::Armed(token) = lock.on_ground_state(PIECE, true) else {
            panic!("expected armed timer");
        };
        lock.on_ground_state(PIECE, false);
        assert!(!lock.is_current(token));
        assert_eq!(lock.resets(), 0);
    }

    #[test]
    fn test_cap_locks_immediately() {
        let mut lock = lock_delay(3);
        for _ in 0..3 {
            assert!(matches!(
                lock.on_ground_state(PIECE, true),
                LockDecision::Armed(_)
            ));
        }
        assert_eq!(lock.on_ground_state(PIECE, true), LockDecision::LockNow);
        assert!(lock.armed().is_none());
    }

    #[test]
    fn test_zero_cap_locks_on_first_grounding() {
        let mut lock = lock_delay(0);
        assert_eq!(lock.on_ground_state(PIECE, true), LockDecision::LockNow);
    }

    #[test]
    fn test_tokens_stay_unique_after_cancel() {
        let mut lock = lock_delay(15);
        let LockDecision::Armed(first) = lock.on_ground_state(PIECE, true) else {
            panic!("expected armed timer");
        };
        lock.cancel();
        let LockDecision::Armed(second) = lock.on_ground_state(PIECE, true) else {
            panic!("expected armed timer");
        };
        assert_ne!(first, second);
    }
}
