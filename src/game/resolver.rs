//! Round Resolver
//!
//! The house AI's move selection and the payout accounting around it.
//!
//! Opponent selection per round:
//! 1. Draw a move uniformly at random.
//! 2. Draw a uniform fraction; below the tier's counter probability,
//!    discard the draw and play the counter of the player's move instead.
//! 3. Otherwise play the uniform draw.
//!
//! Stakes are pre-deducted by the session at submit time; the payout is a
//! non-negative credit applied at reveal. Net effect per round: player win
//! `-stake + stake*multiplier`, draw `0`, opponent win `-stake`.

use serde::{Deserialize, Serialize};

use crate::core::rng::DeterministicRng;
use crate::game::difficulty::Difficulty;
use crate::game::moves::{resolve_round, Move, Outcome, ALL_MOVES};

/// Pick the opponent's move for a round.
///
/// For Easy the counter probability is zero and this degenerates to a
/// uniform three-way draw. For Medium/Hard the opponent's effective win
/// rate exceeds 1/3 by design.
pub fn choose_opponent_move(
    player_move: Move,
    difficulty: Difficulty,
    rng: &mut DeterministicRng,
) -> Move {
    choose_opponent_move_bps(player_move, difficulty.counter_probability_bps(), rng)
}

/// Move selection with an explicit counter probability.
///
/// Split out so tests can force the biased branch (10_000 bps) or disable
/// it (0 bps) without going through a difficulty tier.
pub fn choose_opponent_move_bps(
    player_move: Move,
    counter_probability_bps: u32,
    rng: &mut DeterministicRng,
) -> Move {
    // The uniform draw happens first even when the counter branch is
    // taken, keeping the RNG stream identical across both branches.
    let random_move = ALL_MOVES[rng.next_int(3) as usize];

    if rng.next_bool_bps(counter_probability_bps) {
        player_move.counter()
    } else {
        random_move
    }
}

/// Credit owed to the player for a resolved round.
///
/// The stake was already deducted at submit time, so an opponent win pays
/// nothing and a draw refunds exactly the stake.
pub fn compute_payout(outcome: Outcome, stake: u64, difficulty: Difficulty) -> u64 {
    match outcome {
        Outcome::PlayerWin => stake * difficulty.payout_multiplier(),
        Outcome::Draw => stake,
        Outcome::OpponentWin => 0,
    }
}

/// A fully resolved round.
///
/// Ephemeral: lives from submit to reveal, then only as a wire value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Round {
    /// The player's move.
    pub player_move: Move,
    /// The opponent's move.
    pub opponent_move: Move,
    /// Outcome from the player's perspective.
    pub outcome: Outcome,
    /// Stake deducted for this round.
    pub stake: u64,
    /// Credit owed at reveal.
    pub payout: u64,
    /// Difficulty the round was played at.
    pub difficulty: Difficulty,
}

impl Round {
    /// Resolve a complete round for a submitted move.
    pub fn resolve(
        player_move: Move,
        difficulty: Difficulty,
        stake: u64,
        rng: &mut DeterministicRng,
    ) -> Round {
        let opponent_move = choose_opponent_move(player_move, difficulty, rng);
        let outcome = resolve_round(player_move, opponent_move);
        let payout = compute_payout(outcome, stake, difficulty);

        Round {
            player_move,
            opponent_move,
            outcome,
            stake,
            payout,
            difficulty,
        }
    }

    /// Net balance change across the whole round, including the
    /// pre-deducted stake.
    pub fn net(&self) -> i64 {
        self.payout as i64 - self.stake as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::BPS_SCALE;

    #[test]
    fn test_forced_counter_always_beats_player() {
        let mut rng = DeterministicRng::new(1);

        for mv in ALL_MOVES {
            for _ in 0..200 {
                let opponent = choose_opponent_move_bps(mv, BPS_SCALE, &mut rng);
                assert_eq!(opponent, mv.counter());
                assert_eq!(resolve_round(mv, opponent), Outcome::OpponentWin);
            }
        }
    }

    #[test]
    fn test_easy_distribution_uniform() {
        let mut rng = DeterministicRng::new(90210);

        let trials = 30_000;
        let mut counts = [0u32; 3];
        for _ in 0..trials {
            let mv = choose_opponent_move(Move::Rock, Difficulty::Easy, &mut rng);
            counts[mv as usize] += 1;
        }

        // Each bucket within 3% of the uniform share
        let expected = trials as f64 / 3.0;
        for count in counts {
            let deviation = (count as f64 - expected).abs() / trials as f64;
            assert!(deviation < 0.03, "counts were {counts:?}");
        }
    }

    #[test]
    fn test_hard_counter_rate() {
        let mut rng = DeterministicRng::new(31337);

        let trials = 30_000;
        let mut counters = 0u32;
        for _ in 0..trials {
            let mv = choose_opponent_move(Move::Scissors, Difficulty::Hard, &mut rng);
            if mv == Move::Scissors.counter() {
                counters += 1;
            }
        }

        // 60% forced counters plus 1/3 of the remaining 40% uniform draws
        // land on the counter anyway: ~73.3% overall.
        let ratio = counters as f64 / trials as f64;
        assert!((ratio - 0.7333).abs() < 0.02, "ratio was {ratio}");
    }

    #[test]
    fn test_payout_table() {
        assert_eq!(compute_payout(Outcome::PlayerWin, 100, Difficulty::Easy), 200);
        assert_eq!(compute_payout(Outcome::PlayerWin, 100, Difficulty::Medium), 500);
        assert_eq!(compute_payout(Outcome::PlayerWin, 100, Difficulty::Hard), 1000);

        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(compute_payout(Outcome::Draw, 100, difficulty), 100);
            assert_eq!(compute_payout(Outcome::OpponentWin, 100, difficulty), 0);
        }
    }

    #[test]
    fn test_forced_counter_round_trip() {
        // Stake 100, Medium, player picks Rock, biased branch forced:
        // opponent plays Paper, player loses the stake.
        let mut rng = DeterministicRng::new(7);

        let opponent = choose_opponent_move_bps(Move::Rock, BPS_SCALE, &mut rng);
        assert_eq!(opponent, Move::Paper);

        let outcome = resolve_round(Move::Rock, opponent);
        assert_eq!(outcome, Outcome::OpponentWin);

        let payout = compute_payout(outcome, 100, Difficulty::Medium);
        assert_eq!(payout as i64 - 100, -100);
    }

    #[test]
    fn test_round_resolve_consistent() {
        let mut rng = DeterministicRng::new(99);

        for _ in 0..500 {
            let round = Round::resolve(Move::Paper, Difficulty::Medium, 100, &mut rng);
            assert_eq!(round.outcome, resolve_round(round.player_move, round.opponent_move));
            assert_eq!(
                round.payout,
                compute_payout(round.outcome, round.stake, round.difficulty)
            );
            match round.outcome {
                Outcome::PlayerWin => assert_eq!(round.net(), 400),
                Outcome::Draw => assert_eq!(round.net(), 0),
                Outcome::OpponentWin => assert_eq!(round.net(), -100),
            }
        }
    }

    #[test]
    fn test_resolver_deterministic() {
        let mut rng1 = DeterministicRng::new(2024);
        let mut rng2 = DeterministicRng::new(2024);

        for _ in 0..100 {
            let a = Round::resolve(Move::Rock, Difficulty::Hard, 100, &mut rng1);
            let b = Round::resolve(Move::Rock, Difficulty::Hard, 100, &mut rng2);
            assert_eq!(a.opponent_move, b.opponent_move);
            assert_eq!(a.payout, b.payout);
        }
    }
}
