//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are serialized as JSON; the tagged-enum layout matches
//! what the browser client already speaks.

use serde::{Deserialize, Serialize};

use crate::game::chat::ChatMessage;
use crate::game::difficulty::Difficulty;
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::moves::{Move, Outcome};
use crate::game::session::GamePhase;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join with a display handle; creates the duel session.
    Join(JoinRequest),

    /// Select a difficulty tier (between rounds only).
    SetDifficulty {
        /// Requested tier.
        difficulty: Difficulty,
    },

    /// Submit a move for the next round.
    Play {
        /// The player's move.
        #[serde(rename = "move")]
        mv: Move,
    },

    /// Claim the faucet.
    ClaimFaucet,

    /// Clear the presented result and return to idle.
    Reset,

    /// Request a leaderboard snapshot.
    Leaderboard,

    /// Ping for latency measurement.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: u64,
    },

    /// Player is leaving.
    Leave,
}

/// Join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Display handle shown on the leaderboard.
    pub handle: String,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session created.
    Welcome(WelcomeInfo),

    /// A chat line (AI taunt or system notice).
    Chat(ChatMessage),

    /// One step of the fake confirmation sequence.
    CommitStep(CommitStepInfo),

    /// Round outcome, after the confirmation sequence.
    RoundResult(RoundResultInfo),

    /// Faucet claim result.
    FaucetResult(FaucetResultInfo),

    /// Difficulty change acknowledged.
    DifficultySet {
        /// The now-active tier.
        difficulty: Difficulty,
    },

    /// Leaderboard snapshot.
    LeaderboardUpdate {
        /// Ranked rows, best first.
        entries: Vec<LeaderboardEntry>,
    },

    /// Session returned to idle.
    ResetDone {
        /// Balance after the reset.
        balance: u64,
    },

    /// Pong response.
    Pong {
        /// Echoed client timestamp.
        timestamp: u64,
        /// Server wall-clock milliseconds.
        server_time: u64,
    },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown {
        /// Reason string.
        reason: String,
    },
}

/// Session details sent on join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeInfo {
    /// Session identifier (hex string for JSON compatibility).
    pub session_id: String,
    /// Echoed display handle.
    pub handle: String,
    /// Starting balance ($DUEL).
    pub balance: u64,
    /// Fixed stake per round.
    pub stake: u64,
    /// Selected difficulty tier.
    pub difficulty: Difficulty,
    /// Server version.
    pub server_version: String,
}

/// One confirmation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStepInfo {
    /// Round number the step belongs to.
    pub round: u64,
    /// Step index, 0-based.
    pub step: u8,
    /// Display label ("Hashing...", etc).
    pub label: String,
    /// Shortened commitment digest, `0x` + 8 hex chars.
    pub digest: String,
}

/// Revealed round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResultInfo {
    /// Round number.
    pub round: u64,
    /// The player's move.
    pub player_move: Move,
    /// The opponent's move.
    pub opponent_move: Move,
    /// Outcome from the player's perspective.
    pub outcome: Outcome,
    /// Credit applied at reveal.
    pub payout: u64,
    /// Balance after the payout.
    pub balance: u64,
    /// Consecutive player wins after this round.
    pub streak: u32,
    /// Phase after the reveal (always `Resolved`).
    pub phase: GamePhase,
    /// Fake block number "confirming" the round. Presentation only.
    pub block: u64,
}

/// Faucet claim result.
///
/// A cooled-down claim is not an [`ServerMessage::Error`]: it is the
/// expected answer, carrying the remaining wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetResultInfo {
    /// Whether the claim succeeded.
    pub success: bool,
    /// Credits granted (None on cooldown).
    pub amount: Option<u64>,
    /// Balance after the claim attempt.
    pub balance: u64,
    /// Seconds until the next claim can succeed (None on success).
    pub remaining_secs: Option<u64>,
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Balance below the stake.
    InsufficientStake,
    /// Faucet still cooling down.
    CooldownActive,
    /// A round is already committing.
    RoundInProgress,
    /// Previous result not yet cleared.
    AwaitingReset,
    /// Difficulty change attempted mid-round.
    DifficultyLocked,
    /// No session; Join required first.
    NotJoined,
    /// Session already created on this connection.
    AlreadyJoined,
    /// Malformed or unparseable message.
    InvalidInput,
    /// Internal error.
    InternalError,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
