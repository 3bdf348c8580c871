//! Moves and Round Resolution
//!
//! The three duel moves and the pure outcome function over a pair of them.

use serde::{Deserialize, Serialize};

/// A duel move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Move {
    /// Crushes scissors.
    Rock = 0,
    /// Covers rock.
    Paper = 1,
    /// Cuts paper.
    Scissors = 2,
}

/// All moves, in wire order.
pub const ALL_MOVES: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

impl Move {
    /// The move this one defeats.
    #[inline]
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }

    /// The move that defeats this one.
    ///
    /// This is the "cheating" pick: against Rock the counter is Paper,
    /// against Paper it is Scissors, against Scissors it is Rock.
    #[inline]
    pub fn counter(self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }

    /// Get move from index (0-2).
    pub fn from_index(index: u8) -> Option<Move> {
        match index {
            0 => Some(Move::Rock),
            1 => Some(Move::Paper),
            2 => Some(Move::Scissors),
            _ => None,
        }
    }

    /// Display name as the client shows it.
    pub fn label(self) -> &'static str {
        match self {
            Move::Rock => "ROCK",
            Move::Paper => "PAPER",
            Move::Scissors => "SCISSORS",
        }
    }
}

/// Outcome of a round, from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Player's move beats the opponent's.
    PlayerWin,
    /// Opponent's move beats the player's.
    OpponentWin,
    /// Equal moves.
    Draw,
}

/// Resolve a round from the two moves.
///
/// Pure and total over all nine pairs: three draws, three player wins,
/// three opponent wins.
pub fn resolve_round(player: Move, opponent: Move) -> Outcome {
    if player == opponent {
        Outcome::Draw
    } else if player.beats() == opponent {
        Outcome::PlayerWin
    } else {
        Outcome::OpponentWin
    }
}
