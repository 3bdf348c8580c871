//! Duel Logic Module
//!
//! All game logic. 100% deterministic and free of I/O; wall-clock
//! timestamps are passed in by the caller.
//!
//! ## Module Structure
//!
//! - `moves`: Move and outcome types, round resolution
//! - `difficulty`: Difficulty tiers, counter probabilities, payout table
//! - `resolver`: Biased opponent-move selection and payout accounting
//! - `faucet`: Cooldown-gated credit grants
//! - `chat`: AI taunt pools and the session message log
//! - `leaderboard`: Mock leaderboard generation and live bumps
//! - `session`: Per-player session state machine

pub mod chat;
pub mod difficulty;
pub mod faucet;
pub mod leaderboard;
pub mod moves;
pub mod resolver;
pub mod session;

// Re-export key types
pub use chat::{ChatMessage, ChatSender, MessageLog};
pub use difficulty::Difficulty;
pub use faucet::FaucetError;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use moves::{resolve_round, Move, Outcome};
pub use resolver::{choose_opponent_move, compute_payout, Round};
pub use session::{DuelSession, GamePhase, SessionError};
