//! Duel Session State
//!
//! The per-player session owns everything the client used to keep in
//! component state: balance, streak, cooldown timestamp, message log, and
//! the phase machine around a round. The session is pure - the caller
//! supplies timestamps and the RNG is seeded at construction - so a
//! session is fully replayable.
//!
//! Round lifecycle:
//!
//! ```text
//!   Idle --submit--> Committing --reveal--> Resolved --reset--> Idle
//! ```
//!
//! The stake is deducted at submit; the payout is applied at reveal. The
//! outcome is fixed at submit time - the gap between the two is purely
//! presentational, and a reset while Committing discards the round.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{commitment_digest, CommitDigest};
use crate::core::rng::DeterministicRng;
use crate::game::chat::{self, MessageLog};
use crate::game::difficulty::Difficulty;
use crate::game::faucet::{self, FaucetError, FaucetGrant};
use crate::game::moves::{Move, Outcome};
use crate::game::resolver::Round;
use crate::{STAKE, STARTING_BALANCE};

/// Session identifier (UUID as bytes).
pub type SessionId = [u8; 16];

/// Phase of the round lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Ready to accept a move.
    #[default]
    Idle,
    /// Move submitted; fake confirmation sequence running.
    Committing,
    /// Outcome revealed; waiting for reset.
    Resolved,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct DuelConfig {
    /// Balance granted at session start.
    pub starting_balance: u64,
    /// Stake deducted per round.
    pub stake: u64,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            stake: STAKE,
        }
    }
}

/// Receipt returned at submit time.
///
/// Carries what the confirmation sequence needs; the outcome itself stays
/// hidden until reveal.
#[derive(Clone, Copy, Debug)]
pub struct SubmitReceipt {
    /// Round number, 1-based.
    pub round: u64,
    /// Commitment digest shown during the confirmation steps.
    pub digest: CommitDigest,
    /// Balance after the stake deduction.
    pub balance: u64,
}

/// Session errors. All locally recoverable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Balance below the stake at submit time.
    #[error("insufficient stake: balance {balance} below stake {stake}")]
    InsufficientStake {
        /// Current balance.
        balance: u64,
        /// Required stake.
        stake: u64,
    },

    /// Move submitted while a round is still committing.
    #[error("round already in progress")]
    RoundInProgress,

    /// Move submitted before the previous result was cleared.
    #[error("previous round awaiting reset")]
    AwaitingReset,

    /// Reveal called with no committed round.
    #[error("no round awaiting reveal")]
    NothingToReveal,

    /// Difficulty can only change between rounds.
    #[error("difficulty is locked while a round is active")]
    DifficultyLocked,
}

/// A single player's duel session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelSession {
    /// Session identifier.
    id: SessionId,
    /// Session RNG; every random decision flows through it.
    rng: DeterministicRng,
    /// Selected difficulty tier.
    difficulty: Difficulty,
    /// Round lifecycle phase.
    phase: GamePhase,
    /// Current balance ($DUEL).
    balance: u64,
    /// Fixed stake per round.
    stake: u64,
    /// Consecutive player wins; draws leave it untouched.
    streak: u32,
    /// Rounds submitted so far.
    rounds_played: u64,
    /// Gross payouts collected on wins (leaderboard figure).
    lifetime_winnings: u64,
    /// Last successful faucet claim (milliseconds).
    last_claim_ms: Option<u64>,
    /// Round resolved at submit, awaiting reveal.
    pending: Option<Round>,
    /// Last revealed round, until reset.
    presented: Option<Round>,
    /// Bounded chat log.
    log: MessageLog,
}

impl DuelSession {
    /// Create a session with default configuration.
    pub fn new(id: SessionId, seed: u64) -> Self {
        Self::with_config(id, seed, DuelConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(id: SessionId, seed: u64, config: DuelConfig) -> Self {
        Self {
            id,
            rng: DeterministicRng::new(seed),
            difficulty: Difficulty::default(),
            phase: GamePhase::Idle,
            balance: config.starting_balance,
            stake: config.stake,
            streak: 0,
            rounds_played: 0,
            lifetime_winnings: 0,
            last_claim_ms: None,
            pending: None,
            presented: None,
            log: MessageLog::new(),
        }
    }

    /// Push the connection greeting into the log.
    pub fn greet(&mut self, now_ms: u64) {
        self.log.push_system(chat::GREETING_SYSTEM, now_ms);
        self.log.push_bot(chat::GREETING_BOT, now_ms);
    }

    /// Change difficulty. Only allowed while idle.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        if self.phase != GamePhase::Idle {
            return Err(SessionError::DifficultyLocked);
        }
        self.difficulty = difficulty;
        Ok(())
    }

    /// Submit a move.
    ///
    /// Deducts the stake, fixes the outcome, and enters `Committing`. The
    /// resolved round stays hidden until [`DuelSession::reveal`].
    pub fn submit(&mut self, player_move: Move) -> Result<SubmitReceipt, SessionError> {
        match self.phase {
            GamePhase::Committing => return Err(SessionError::RoundInProgress),
            GamePhase::Resolved => return Err(SessionError::AwaitingReset),
            GamePhase::Idle => {}
        }

        if self.balance < self.stake {
            return Err(SessionError::InsufficientStake {
                balance: self.balance,
                stake: self.stake,
            });
        }

        self.balance -= self.stake;
        self.rounds_played += 1;

        // Digest binds the RNG state before the opponent draw
        let digest = commitment_digest(
            &self.id,
            self.rounds_played,
            player_move as u8,
            self.rng.state(),
        );

        let round = Round::resolve(player_move, self.difficulty, self.stake, &mut self.rng);
        self.pending = Some(round);
        self.phase = GamePhase::Committing;

        Ok(SubmitReceipt {
            round: self.rounds_played,
            digest,
            balance: self.balance,
        })
    }

    /// Reveal the committed round.
    ///
    /// Applies the payout and streak update, logs the AI's taunt, and
    /// enters `Resolved`.
    pub fn reveal(&mut self, now_ms: u64) -> Result<Round, SessionError> {
        let round = self.pending.take().ok_or(SessionError::NothingToReveal)?;

        self.balance += round.payout;
        match round.outcome {
            Outcome::PlayerWin => {
                self.streak += 1;
                self.lifetime_winnings += round.payout;
            }
            Outcome::OpponentWin => {
                self.streak = 0;
            }
            Outcome::Draw => {}
        }

        let taunt = chat::taunt_for(round.outcome, &mut self.rng);
        self.log.push_bot(taunt, now_ms);

        self.phase = GamePhase::Resolved;
        self.presented = Some(round);

        Ok(round)
    }

    /// Reset back to idle, discarding any pending or presented round.
    ///
    /// Allowed from any phase: a reset while Committing abandons the
    /// round (the stake stays spent - there is no cancellation).
    pub fn reset(&mut self, now_ms: u64) {
        let was_idle = self.phase == GamePhase::Idle;
        self.pending = None;
        self.presented = None;
        self.phase = GamePhase::Idle;

        if !was_idle {
            let taunt = chat::start_taunt(&mut self.rng);
            self.log.push_bot(taunt, now_ms);
        }
    }

    /// Claim the faucet.
    ///
    /// Credits the grant and records the claim time on success; reports
    /// remaining cooldown seconds otherwise.
    pub fn claim_faucet(&mut self, now_ms: u64) -> Result<FaucetGrant, FaucetError> {
        let grant = faucet::claim(self.last_claim_ms, now_ms)?;

        self.balance += grant.amount;
        self.last_claim_ms = Some(grant.claimed_at_ms);
        self.log.push_system(
            format!("Faucet claim successful: +{} $DUEL received", grant.amount),
            now_ms,
        );

        Ok(grant)
    }

    /// Append a system line (confirmation steps, notices).
    pub fn push_system(&mut self, text: impl Into<String>, now_ms: u64) {
        self.log.push_system(text, now_ms);
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current balance ($DUEL).
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Fixed stake per round.
    pub fn stake(&self) -> u64 {
        self.stake
    }

    /// Consecutive player wins.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Selected difficulty tier.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Rounds submitted so far.
    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Gross payouts collected on wins.
    pub fn lifetime_winnings(&self) -> u64 {
        self.lifetime_winnings
    }

    /// Last revealed round, until reset.
    pub fn last_round(&self) -> Option<&Round> {
        self.presented.as_ref()
    }

    /// Chat log, oldest first.
    pub fn messages(&self) -> &[crate::game::chat::ChatMessage] {
        self.log.messages()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::chat::ChatSender;

    fn test_session() -> DuelSession {
        DuelSession::new([7; 16], 12345)
    }

    #[test]
    fn test_new_session_defaults() {
        let session = test_session();

        assert_eq!(session.balance(), STARTING_BALANCE);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.difficulty(), Difficulty::Easy);
        assert_eq!(session.rounds_played(), 0);
        assert!(session.last_round().is_none());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_greeting() {
        let mut session = test_session();
        session.greet(1_000);

        let msgs = session.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].sender, ChatSender::System);
        assert_eq!(msgs[1].sender, ChatSender::Bot);
    }

    #[test]
    fn test_submit_deducts_stake_and_commits() {
        let mut session = test_session();

        let receipt = session.submit(Move::Rock).unwrap();
        assert_eq!(receipt.round, 1);
        assert_eq!(receipt.balance, STARTING_BALANCE - STAKE);
        assert_eq!(session.balance(), STARTING_BALANCE - STAKE);
        assert_eq!(session.phase(), GamePhase::Committing);
    }

    #[test]
    fn test_submit_while_committing_rejected() {
        let mut session = test_session();
        session.submit(Move::Rock).unwrap();

        let err = session.submit(Move::Paper).unwrap_err();
        assert_eq!(err, SessionError::RoundInProgress);
    }

    #[test]
    fn test_submit_while_resolved_rejected() {
        let mut session = test_session();
        session.submit(Move::Rock).unwrap();
        session.reveal(100).unwrap();

        let err = session.submit(Move::Paper).unwrap_err();
        assert_eq!(err, SessionError::AwaitingReset);
    }

    #[test]
    fn test_insufficient_stake() {
        let config = DuelConfig {
            starting_balance: 50,
            ..Default::default()
        };
        let mut session = DuelSession::with_config([1; 16], 1, config);

        let err = session.submit(Move::Rock).unwrap_err();
        assert_eq!(
            err,
            SessionError::InsufficientStake {
                balance: 50,
                stake: STAKE
            }
        );
        // Nothing was deducted or advanced
        assert_eq!(session.balance(), 50);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.rounds_played(), 0);
    }

    #[test]
    fn test_reveal_applies_payout_and_taunts() {
        let mut session = test_session();

        let balance_after_submit = session.submit(Move::Rock).unwrap().balance;
        let round = session.reveal(5_000).unwrap();

        assert_eq!(session.balance(), balance_after_submit + round.payout);
        assert_eq!(session.phase(), GamePhase::Resolved);
        assert_eq!(session.last_round().unwrap().outcome, round.outcome);

        // AI always taunts after a reveal
        let last = session.messages().last().unwrap();
        assert_eq!(last.sender, ChatSender::Bot);
        assert_eq!(last.timestamp_ms, 5_000);
    }

    #[test]
    fn test_reveal_without_submit_rejected() {
        let mut session = test_session();
        assert_eq!(session.reveal(0).unwrap_err(), SessionError::NothingToReveal);
    }

    #[test]
    fn test_streak_bookkeeping() {
        // Walk seeds until the first round of each outcome is found, then
        // verify the streak rule for that outcome.
        let mut saw_win = false;
        let mut saw_loss = false;
        let mut saw_draw = false;

        for seed in 0..200 {
            let mut session = DuelSession::new([3; 16], seed);
            session.submit(Move::Rock).unwrap();
            let round = session.reveal(0).unwrap();

            match round.outcome {
                Outcome::PlayerWin => {
                    assert_eq!(session.streak(), 1);
                    assert_eq!(session.lifetime_winnings(), round.payout);
                    saw_win = true;
                }
                Outcome::OpponentWin => {
                    assert_eq!(session.streak(), 0);
                    assert_eq!(session.lifetime_winnings(), 0);
                    saw_loss = true;
                }
                Outcome::Draw => {
                    assert_eq!(session.streak(), 0);
                    assert_eq!(session.lifetime_winnings(), 0);
                    saw_draw = true;
                }
            }

            if saw_win && saw_loss && saw_draw {
                return;
            }
        }

        panic!("200 seeds did not produce all three outcomes");
    }

    #[test]
    fn test_draw_preserves_streak() {
        // Find a winning round, then a drawing round, and check the streak
        // survives the draw.
        for seed in 0..500 {
            let mut session = DuelSession::new([4; 16], seed);

            session.submit(Move::Rock).unwrap();
            let first = session.reveal(0).unwrap();
            session.reset(0);

            if first.outcome != Outcome::PlayerWin {
                continue;
            }

            session.submit(Move::Rock).unwrap();
            let second = session.reveal(0).unwrap();

            if second.outcome == Outcome::Draw {
                assert_eq!(session.streak(), 1);
                return;
            }
        }

        panic!("500 seeds did not produce a win followed by a draw");
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = test_session();
        session.submit(Move::Scissors).unwrap();
        session.reveal(0).unwrap();

        session.reset(1_000);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.last_round().is_none());

        // Reboot line from the AI
        let last = session.messages().last().unwrap();
        assert_eq!(last.sender, ChatSender::Bot);
    }

    #[test]
    fn test_reset_while_committing_discards_round() {
        let mut session = test_session();
        session.submit(Move::Rock).unwrap();
        let balance = session.balance();

        session.reset(0);

        // Stake stays spent; the pending round is gone
        assert_eq!(session.balance(), balance);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.reveal(0).unwrap_err(), SessionError::NothingToReveal);
    }

    #[test]
    fn test_difficulty_locked_mid_round() {
        let mut session = test_session();
        session.set_difficulty(Difficulty::Hard).unwrap();
        assert_eq!(session.difficulty(), Difficulty::Hard);

        session.submit(Move::Rock).unwrap();
        let err = session.set_difficulty(Difficulty::Easy).unwrap_err();
        assert_eq!(err, SessionError::DifficultyLocked);

        session.reveal(0).unwrap();
        assert!(session.set_difficulty(Difficulty::Easy).is_err());

        session.reset(0);
        assert!(session.set_difficulty(Difficulty::Easy).is_ok());
    }

    #[test]
    fn test_faucet_claim_credits_and_logs() {
        let mut session = test_session();

        let grant = session.claim_faucet(0).unwrap();
        assert_eq!(grant.amount, crate::FAUCET_AMOUNT);
        assert_eq!(session.balance(), STARTING_BALANCE + crate::FAUCET_AMOUNT);

        let last = session.messages().last().unwrap();
        assert_eq!(last.sender, ChatSender::System);
        assert!(last.text.contains("+1000 $DUEL"));

        // Second claim inside the window fails and credits nothing
        let err = session.claim_faucet(30_000).unwrap_err();
        assert_eq!(err, FaucetError::CooldownActive { remaining_secs: 30 });
        assert_eq!(session.balance(), STARTING_BALANCE + crate::FAUCET_AMOUNT);

        // And succeeds after the window
        session.claim_faucet(61_000).unwrap();
        assert_eq!(session.balance(), STARTING_BALANCE + 2 * crate::FAUCET_AMOUNT);
    }

    #[test]
    fn test_session_replayable_from_seed() {
        let play = |seed: u64| {
            let mut session = DuelSession::new([9; 16], seed);
            let mut outcomes = Vec::new();
            for _ in 0..10 {
                session.submit(Move::Paper).unwrap();
                outcomes.push(session.reveal(0).unwrap().outcome);
                session.reset(0);
            }
            (outcomes, session.balance())
        };

        assert_eq!(play(777), play(777));
    }

    #[test]
    fn test_submit_receipt_digest_varies_per_round() {
        let mut session = test_session();

        let first = session.submit(Move::Rock).unwrap();
        session.reveal(0).unwrap();
        session.reset(0);

        let second = session.submit(Move::Rock).unwrap();
        assert_ne!(first.digest, second.digest);
    }
}
