//! # MoltDuel Game Server
//!
//! Server-side rock-paper-scissors against the house AI, with the faux-Web3
//! trappings of the MoltDuel client (staged "submission" sequence, $DUEL
//! balance, faucet, mock leaderboard).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MOLTDUEL SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── rng.rs        - Deterministic Xorshift128+ PRNG         │
//! │  └── hash.rs       - Commitment digests (presentation only)  │
//! │                                                              │
//! │  game/             - Duel logic (pure, deterministic)        │
//! │  ├── moves.rs      - Moves and round resolution              │
//! │  ├── difficulty.rs - Difficulty tiers and payout table       │
//! │  ├── resolver.rs   - Biased opponent AI, payout accounting   │
//! │  ├── faucet.rs     - Cooldown-gated credit grants            │
//! │  ├── chat.rs       - AI taunts and message log               │
//! │  ├── leaderboard.rs- Mock leaderboard                        │
//! │  └── session.rs    - Per-player session state machine        │
//! │                                                              │
//! │  network/          - Networking (non-deterministic)          │
//! │  ├── server.rs     - WebSocket server                        │
//! │  ├── protocol.rs   - Message types                           │
//! │  └── session.rs    - Connected-player session management     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No system time dependencies (timestamps are passed in)
//! - All randomness from seeded Xorshift128+
//! - No I/O, no hidden globals
//!
//! Given the same seed and the same call sequence, a session produces
//! identical rounds, taunts, and balances on any platform. Wall clocks and
//! timers live exclusively in `network/`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::game::difficulty::Difficulty;
pub use crate::game::moves::{Move, Outcome};
pub use crate::game::resolver::Round;
pub use crate::game::session::{DuelSession, GamePhase};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed stake wagered per round ($DUEL).
pub const STAKE: u64 = 100;

/// Balance granted to a fresh session ($DUEL).
pub const STARTING_BALANCE: u64 = 1000;

/// Credits granted per successful faucet claim ($DUEL).
pub const FAUCET_AMOUNT: u64 = 1000;

/// Faucet cooldown window in milliseconds.
pub const FAUCET_COOLDOWN_MS: u64 = 60_000;

/// Delay between move submission and outcome reveal (milliseconds).
pub const REVEAL_DELAY_MS: u64 = 2500;

/// Interval between fake confirmation steps (milliseconds).
pub const COMMIT_STEP_INTERVAL_MS: u64 = 500;

/// Chat messages retained in the session log.
pub const MESSAGE_LOG_CAP: usize = 5;
