//! AI Taunts and Message Log
//!
//! The house AI's canned lines and the bounded chat log each session
//! keeps. Taunt selection draws from the session RNG so replays taunt
//! identically.

use serde::{Deserialize, Serialize};

use crate::core::rng::DeterministicRng;
use crate::game::moves::Outcome;
use crate::MESSAGE_LOG_CAP;

/// Lines for a fresh or rebooted duel.
pub const TAUNTS_START: [&str; 3] = [
    "System initialized.",
    "Waiting for input...",
    "I can see your cursor shaking.",
];

/// Lines after the player wins a round.
pub const TAUNTS_WIN: [&str; 4] = [
    "Lucky guess.",
    "My algorithms missed that.",
    "Glitch in the matrix.",
    "You won... for now.",
];

/// Lines after the player loses a round.
pub const TAUNTS_LOSE: [&str; 5] = [
    "Calculated.",
    "Too easy.",
    "Thanks for the $DUEL.",
    "Predictable human.",
    "Better luck next block.",
];

/// Lines after a draw.
pub const TAUNTS_DRAW: [&str; 4] = [
    "Copycat.",
    "Sync error.",
    "Great minds?",
    "Stalemate detected.",
];

/// System line shown when a session connects.
pub const GREETING_SYSTEM: &str = "Connection established to MoltDuel Local Node";

/// Bot line shown right after the greeting.
pub const GREETING_BOT: &str = "Ready to lose some credits, human?";

/// System lines played during the fake confirmation sequence, one per
/// commit step.
pub const COMMIT_STEPS: [&str; 4] = [
    "Encrypting choice...",
    "Hashing...",
    "Submitting to mempool...",
    "Confirming block...",
];

/// Pick a taunt for a resolved round.
pub fn taunt_for(outcome: Outcome, rng: &mut DeterministicRng) -> &'static str {
    let pool: &[&str] = match outcome {
        Outcome::PlayerWin => &TAUNTS_WIN,
        Outcome::OpponentWin => &TAUNTS_LOSE,
        Outcome::Draw => &TAUNTS_DRAW,
    };
    // Pools are non-empty constants
    rng.choose(pool).copied().unwrap_or(pool[0])
}

/// Pick a line for a fresh round prompt.
pub fn start_taunt(rng: &mut DeterministicRng) -> &'static str {
    rng.choose(&TAUNTS_START).copied().unwrap_or(TAUNTS_START[0])
}

/// Who said a chat line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    /// The house AI.
    Bot,
    /// The server itself (connection and confirmation notices).
    System,
}

/// One line in the session chat log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sequence number within the session, unique and monotonic.
    pub id: u64,
    /// Who said it.
    pub sender: ChatSender,
    /// The line itself.
    pub text: String,
    /// When it was said (milliseconds).
    pub timestamp_ms: u64,
}

/// Bounded chat log; keeps only the most recent messages.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bot line.
    pub fn push_bot(&mut self, text: impl Into<String>, now_ms: u64) -> &ChatMessage {
        self.push(ChatSender::Bot, text.into(), now_ms)
    }

    /// Append a system line.
    pub fn push_system(&mut self, text: impl Into<String>, now_ms: u64) -> &ChatMessage {
        self.push(ChatSender::System, text.into(), now_ms)
    }

    fn push(&mut self, sender: ChatSender, text: String, now_ms: u64) -> &ChatMessage {
        if self.messages.len() >= MESSAGE_LOG_CAP {
            self.messages.remove(0);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text,
            timestamp_ms: now_ms,
        });
        // Just pushed, cannot be empty
        &self.messages[self.messages.len() - 1]
    }

    /// Messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
