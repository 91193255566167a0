use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{game_session::GameSession, lock_delay::LockTimerToken};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Gravity interval for `level`: 1000 ms at level 1, 100 ms less per
/// level, never below 100 ms.
#[must_use]
pub fn gravity_interval(level: usize) -> Duration {
    let steps = u64::try_from(level.saturating_sub(1)).unwrap_or(u64::MAX);
    let millis = 100 + u64::saturating_sub(900, steps.saturating_mul(100));
    Duration::from_millis(millis)
}

/// Timer that fired during [`Scheduler::advance`].
///
/// Timers due at the same instant fire in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    LockDelay,
    Gravity,
    Countdown,
}

/// Virtual-clock driver for the gravity, lock-delay and countdown timers.
///
/// The scheduler owns no session. Each [`Self::advance`] call brings its
/// timers in line with the session (arming, re-arming or cancelling), then
/// fires every timer that falls due within the elapsed span in time order.
/// While the session is paused or over, no timer is armed.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{GameSession, Scheduler, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default()).unwrap();
/// let mut scheduler = Scheduler::new();
/// scheduler.advance(&mut session, Duration::from_secs(3));
/// assert_eq!(session.elapsed_secs(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    gravity_due: Option<Duration>,
    countdown_due: Option<Duration>,
    lock_token: Option<LockTimerToken>,
    lock_due: Option<Duration>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Drops every armed timer.
    pub fn cancel_all(&mut self) {
        self.gravity_due = None;
        self.countdown_due = None;
        self.lock_token = None;
        self.lock_due = None;
    }

    fn sync(&mut self, session: &GameSession) {
        if !session.session_state().is_playing() {
            self.cancel_all();
            return;
        }
        let now = self.now;
        self.gravity_due
            .get_or_insert_with(|| now + gravity_interval(session.level()));
        self.countdown_due.get_or_insert(now + COUNTDOWN_PERIOD);
        match session.lock_timer() {
            None => {
                self.lock_token = None;
                self.lock_due = None;
            }
            Some(timer) if self.lock_token != Some(timer.token()) => {
                self.lock_token = Some(timer.token());
                self.lock_due = Some(now + timer.delay());
            }
            Some(_) => {}
        }
    }

    fn next_due(&self) -> Option<(Duration, TimerKind)> {
        [
            self.lock_due.map(|due| (due, TimerKind::LockDelay)),
            self.gravity_due.map(|due| (due, TimerKind::Gravity)),
            self.countdown_due.map(|due| (due, TimerKind::Countdown)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Advances virtual time by `elapsed`, firing due timers against
    /// `session`, and returns the timers that fired in order.
    pub fn advance(&mut self, session: &mut GameSession, elapsed: Duration) -> Vec<TimerKind> {
        let target = self.now + elapsed;
        let mut fired = vec![];
        loop {
            self.sync(session);
            let Some((due, kind)) = self.next_due() else {
                break;
            };
            if due > target {
                break;
            }
            self.now = due;
            // Rejections are expected here (e.g. gravity on a grounded piece
            // whose lock timer is already running).
            let _ = match kind {
                TimerKind::LockDelay => {
                    self.lock_due = None;
                    match self.lock_token {
                        Some(token) => session.lock_delay_expire(token),
                        None => Ok(()),
                    }
                }
                TimerKind::Gravity => {
                    self.gravity_due = Some(due + gravity_interval(session.level()));
                    session.gravity_tick()
                }
                TimerKind::Countdown => {
                    self.countdown_due = Some(due + COUNTDOWN_PERIOD);
                    session.countdown_tick()
                }
            };
            fired.push(kind);
        }
        self.now = target;
        fired
    }
}
