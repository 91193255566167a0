use serde::{Deserialize, Serialize};

/// Score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Combo bonus bands as `(first combo of the band, bonus)`, ascending.
///
/// A combo value belongs to the last band whose start does not exceed it.
const COMBO_BANDS: [(usize, usize); 6] = [(1, 0), (2, 50), (4, 100), (6, 150), (8, 200), (11, 300)];

/// Bonus awarded when a lock leaves the board completely empty.
pub const PERFECT_CLEAR_BONUS: usize = 2000;

const LINES_PER_LEVEL: usize = 10;

const _: () = {
    let mut i = 1;
    while i < COMBO_BANDS.len() {
        assert!(COMBO_BANDS[i - 1].0 < COMBO_BANDS[i].0);
        assert!(COMBO_BANDS[i - 1].1 <= COMBO_BANDS[i].1);
        i += 1;
    }
};

/// Bonus for the combo count reached by the current lock.
///
/// Non-decreasing in `combo`; zero for no combo.
#[must_use]
pub fn combo_bonus(combo: usize) -> usize {
    COMBO_BANDS
        .iter()
        .rev()
        .find(|(start, _)| combo >= *start)
        .map_or(0, |(_, bonus)| *bonus)
}

/// Points earned by a single lock, split by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: usize,
    pub combo_bonus: usize,
    pub perfect_clear_bonus: usize,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn total(&self) -> usize {
        self.base + self.combo_bonus + self.perfect_clear_bonus
    }
}

/// Game statistics tracking score, lines cleared, combo and piece count.
///
/// - **Score**: base points for the clear size, plus combo and perfect-clear
///   bonuses
/// - **Level**: `total_cleared_lines / 10 + 1`
/// - **Combo**: consecutive locks that each cleared at least one line
/// - **Line clear distribution**: count of locks by number of lines cleared
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4, false);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.combo(), 1);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    combo: usize,
    max_combo: usize,
    perfect_clears: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            combo: 0,
            max_combo: 0,
            perfect_clears: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Level derived from total lines cleared, starting at 1.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / LINES_PER_LEVEL + 1
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by lines cleared; index `n` counts locks that
    /// cleared `n` lines.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn combo(&self) -> usize {
        self.combo
    }

    #[must_use]
    pub const fn max_combo(&self) -> usize {
        self.max_combo
    }

    #[must_use]
    pub const fn perfect_clears(&self) -> usize {
        self.perfect_clears
    }

    /// Updates statistics after a piece locks and returns the points earned.
    ///
    /// `perfect_clear` is only honored when lines were cleared.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize, perfect_clear: bool) -> ScoreBreakdown {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }

        if cleared_lines == 0 {
            self.combo = 0;
            return ScoreBreakdown::default();
        }

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        let perfect_clear_bonus = if perfect_clear {
            self.perfect_clears += 1;
            PERFECT_CLEAR_BONUS
        } else {
            0
        };
        let breakdown = ScoreBreakdown {
            base: SCORE_TABLE[cleared_lines.min(SCORE_TABLE.len() - 1)],
            combo_bonus: combo_bonus(self.combo),
            perfect_clear_bonus,
        };
        self.score += breakdown.total();
        breakdown
    }
}
