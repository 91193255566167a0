use std::{fmt::Write as _, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Seed for deterministic piece generation.
///
/// A 128-bit seed that initializes the bag's random number generator. The
/// same seed fed with the same command stream produces the same session.
///
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Bag, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// let mut a = Bag::with_seed(seed);
/// let mut b = Bag::with_seed(seed);
/// assert_eq!(a.draw(), b.draw());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed '{input}': {reason}")]
pub struct ParseSeedError {
    input: String,
    reason: &'static str,
}

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseSeedError {
            input: s.to_owned(),
            reason,
        };
        if s.len() != 32 {
            return Err(error("expected 32 characters"));
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error("not a hex number"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// 7-bag randomizer.
///
/// Each cycle of seven draws yields every [`PieceKind`] exactly once. The bag
/// is refilled with a fresh uniform shuffle only when it is empty.
#[derive(Debug, Clone)]
pub struct Bag {
    rng: Pcg32,
    remaining: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Bag {
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            remaining: ArrayVec::new(),
        }
    }

    /// Draws one piece, refilling with a shuffled permutation first if the
    /// current cycle is exhausted.
    ///
    /// # Panics
    ///
    /// Never panics in practice: the bag is refilled right before popping.
    pub fn draw(&mut self) -> PieceKind {
        if self.remaining.is_empty() {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.remaining.extend(new_bag);
        }
        self.remaining
            .pop()
            .expect("Piece bag should never be empty after refill")
    }

    /// Empties the bag without drawing, so the next draw starts a new cycle.
    ///
    /// The random stream is kept; only the partially consumed cycle is
    /// discarded.
    pub fn reset(&mut self) {
        self.remaining.clear();
    }

    /// Pieces left in the current cycle, in no particular order.
    #[must_use]
    pub fn remaining(&self) -> &[PieceKind] {
        &self.remaining
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_seed_known_value_sequential_bytes() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_accepts_uppercase_hex() {
        let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.0[7], 0xEF);
    }

    #[test]
    fn test_seed_from_u64() {
        let seed = PieceSeed::from(0xFFu64);
        assert_eq!(
            serde_json::to_string(&seed).unwrap(),
            "\"000000000000000000000000000000ff\""
        );
    }

    #[test]
    fn test_seed_parse_errors() {
        for input in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
        ] {
            let err = input.parse::<PieceSeed>().unwrap_err();
            assert!(err.to_string().contains("invalid hex seed"));
        }
        let result: Result<PieceSeed, _> = serde_json::from_str("\"xyz\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed: PieceSeed = rand::Rng::random(&mut rand::rng());
        let mut bag1 = Bag::with_seed(seed);
        let mut bag2 = Bag::with_seed(seed);
        for _ in 0..30 {
            assert_eq!(bag1.draw(), bag2.draw());
        }
    }

    #[test]
    fn test_reset_discards_partial_cycle() {
        let mut bag = Bag::with_seed(PieceSeed::from(7));
        bag.draw();
        bag.draw();
        assert_eq!(bag.remaining().len(), 5);
        bag.reset();
        assert!(bag.remaining().is_empty());
        bag.draw();
        assert_eq!(bag.remaining().len(), 6);
    }

    proptest! {
        #[test]
        fn prop_every_cycle_after_reset_is_a_permutation(
            seed in any::<u64>(),
            consumed in 0..7usize,
            cycles in 1..5usize,
        ) {
            let mut bag = Bag::with_seed(PieceSeed::from(seed));
            for _ in 0..consumed {
                bag.draw();
            }
            bag.reset();
            for _ in 0..cycles {
                let drawn: HashSet<_> = (0..PieceKind::LEN).map(|_| bag.draw()).collect();
                prop_assert_eq!(drawn.len(), PieceKind::LEN);
            }
        }
    }
}
