//! Difficulty Tiers
//!
//! Static configuration binding each tier to its counter probability and
//! payout multiplier. Probabilities are in basis points (10_000 = 100%) so
//! the client's 0.3 / 0.6 thresholds are represented exactly.

use serde::{Deserialize, Serialize};

/// Opponent difficulty tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Difficulty {
    /// Uniform random opponent, x2 payout.
    #[default]
    Easy = 0,
    /// Counters the player 30% of the time, x5 payout.
    Medium = 1,
    /// Counters the player 60% of the time, x10 payout.
    Hard = 2,
}

/// All difficulty tiers, in ascending order.
pub const ALL_DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

impl Difficulty {
    /// Chance the opponent deliberately counters the player's revealed
    /// move, in basis points.
    ///
    /// The rigged bias is a documented mechanic, not a bug. Thresholds
    /// must stay exactly 0 / 3_000 / 6_000.
    #[inline]
    pub fn counter_probability_bps(self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 3_000,
            Difficulty::Hard => 6_000,
        }
    }

    /// Multiplier applied to the stake on a player win.
    #[inline]
    pub fn payout_multiplier(self) -> u64 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 5,
            Difficulty::Hard => 10,
        }
    }

    /// Display label as the client shows it.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Get tier from index (0-2).
    pub fn from_index(index: u8) -> Option<Difficulty> {
        match index {
            0 => Some(Difficulty::Easy),
            1 => Some(Difficulty::Medium),
            2 => Some(Difficulty::Hard),
            _ => None,
        }
    }
}
