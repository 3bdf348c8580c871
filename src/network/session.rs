//! Connected-Player Session Management
//!
//! Wraps the pure [`DuelSession`] for a live connection: holds the
//! outbound message channel, stamps wall-clock time onto pure calls, and
//! paces the fake confirmation sequence between submit and reveal.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, RwLock};
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::core::hash::{fake_block_number, short_digest, CommitDigest};
use crate::game::chat::COMMIT_STEPS;
use crate::game::session::{DuelSession, SessionId};
use crate::network::protocol::{CommitStepInfo, RoundResultInfo, ServerMessage};
use crate::{COMMIT_STEP_INTERVAL_MS, REVEAL_DELAY_MS};

/// Current wall-clock time in milliseconds.
///
/// The only clock in the crate; the pure layer receives this as a
/// parameter.
pub fn wall_clock_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// A player connected to the server.
pub struct PlayerSession {
    /// Display handle.
    pub handle: String,
    /// The pure duel session.
    pub session: DuelSession,
    /// Message channel to this player.
    pub sender: mpsc::Sender<ServerMessage>,
    /// When the connection joined.
    #[allow(dead_code)]
    connected_at: Instant,
}

impl PlayerSession {
    /// Wrap a fresh duel session for a connection.
    pub fn new(handle: String, session: DuelSession, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            handle,
            session,
            sender,
            connected_at: Instant::now(),
        }
    }
}

/// Play the fake confirmation sequence for a submitted round, then reveal.
///
/// Emits one [`ServerMessage::CommitStep`] per step at the step interval,
/// then reveals at the fixed delay and emits the result plus the AI's
/// taunt. If the session was reset while the sequence ran, the pending
/// round is gone and the sequence ends quietly - the outcome was computed
/// but the caller chose to discard it.
pub async fn run_commit_sequence(
    player: Arc<RwLock<PlayerSession>>,
    round: u64,
    digest: CommitDigest,
) {
    let digest_short = short_digest(&digest);

    for (step, label) in COMMIT_STEPS.iter().enumerate() {
        sleep(Duration::from_millis(COMMIT_STEP_INTERVAL_MS)).await;

        let mut p = player.write().await;
        p.session.push_system(*label, wall_clock_ms());
        let msg = ServerMessage::CommitStep(CommitStepInfo {
            round,
            step: step as u8,
            label: (*label).to_string(),
            digest: digest_short.clone(),
        });
        if p.sender.send(msg).await.is_err() {
            // Connection gone; the reveal below still settles the session
            debug!("commit step dropped, channel closed");
        }
    }

    let steps_ms = COMMIT_STEP_INTERVAL_MS * COMMIT_STEPS.len() as u64;
    sleep(Duration::from_millis(REVEAL_DELAY_MS.saturating_sub(steps_ms))).await;

    let mut p = player.write().await;
    let revealed = p.session.reveal(wall_clock_ms());
    match revealed {
        Ok(result) => {
            let round_msg = ServerMessage::RoundResult(RoundResultInfo {
                round,
                player_move: result.player_move,
                opponent_move: result.opponent_move,
                outcome: result.outcome,
                payout: result.payout,
                balance: p.session.balance(),
                streak: p.session.streak(),
                phase: p.session.phase(),
                block: fake_block_number(&digest),
            });
            let taunt = p.session.messages().last().cloned();

            let _ = p.sender.send(round_msg).await;
            if let Some(taunt) = taunt {
                let _ = p.sender.send(ServerMessage::Chat(taunt)).await;
            }
        }
        Err(_) => {
            // Session was reset mid-sequence; nothing to reveal
            debug!("round {round} discarded before reveal");
        }
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Registry of all connected player sessions.
pub struct SessionManager {
    sessions: RwLock<BTreeMap<SessionId, Arc<RwLock<PlayerSession>>>>,
}

impl SessionManager {
    /// Create new session manager.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a player session.
    pub async fn register(&self, id: SessionId, player: Arc<RwLock<PlayerSession>>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, player);
    }

    /// Get a session by ID.
    pub async fn get(&self, id: &SessionId) -> Option<Arc<RwLock<PlayerSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Remove a session.
    pub async fn remove(&self, id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
    }

    /// Get active session count.
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Snapshot of all sessions, for per-player broadcasts.
    pub async fn all(&self) -> Vec<Arc<RwLock<PlayerSession>>> {
        let sessions = self.sessions.read().await;
        sessions.values().cloned().collect()
    }

    /// Broadcast a message to every connected session.
    pub async fn broadcast(&self, message: ServerMessage) {
        for player in self.all().await {
            let p = player.read().await;
            let _ = p.sender.send(message.clone()).await;
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
