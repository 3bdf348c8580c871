//! WebSocket Duel Server
//!
//! Async WebSocket server for duel connections. One duel session per
//! connection; the server owns the wall clock, the confirmation-sequence
//! timers, and the leaderboard bump loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::interval;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::core::rng::{derive_session_seed, DeterministicRng};
use crate::game::faucet::FaucetError;
use crate::game::leaderboard::Leaderboard;
use crate::game::session::{DuelSession, SessionError, SessionId};
use crate::network::protocol::{
    ClientMessage, ErrorCode, FaucetResultInfo, ServerError, ServerMessage, WelcomeInfo,
};
use crate::network::session::{
    run_commit_sequence, wall_clock_ms, PlayerSession, SessionManager,
};

/// Map a session error to its wire error code.
fn error_code_for(err: &SessionError) -> ErrorCode {
    match err {
        SessionError::InsufficientStake { .. } => ErrorCode::InsufficientStake,
        SessionError::RoundInProgress => ErrorCode::RoundInProgress,
        SessionError::AwaitingReset => ErrorCode::AwaitingReset,
        SessionError::NothingToReveal => ErrorCode::InternalError,
        SessionError::DifficultyLocked => ErrorCode::DifficultyLocked,
    }
}

fn error_message(code: ErrorCode, err: impl std::fmt::Display) -> ServerMessage {
    ServerMessage::Error(ServerError {
        code,
        message: err.to_string(),
    })
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Interval between leaderboard bumps.
    pub leaderboard_interval: Duration,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().expect("static bind address"),
            max_connections: 1000,
            leaderboard_interval: Duration::from_secs(3),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("MOLT_DUEL_BIND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            max_connections: std::env::var("MOLT_DUEL_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            leaderboard_interval: defaults.leaderboard_interval,
            version: defaults.version,
        }
    }
}

/// Duel server errors.
#[derive(Debug, thiserror::Error)]
pub enum DuelServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// The duel server.
pub struct DuelServer {
    /// Server configuration.
    config: ServerConfig,
    /// Connected player sessions.
    sessions: Arc<SessionManager>,
    /// Shared mock leaderboard.
    leaderboard: Arc<RwLock<Leaderboard>>,
    /// RNG driving leaderboard bumps.
    board_rng: Arc<RwLock<DeterministicRng>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl DuelServer {
    /// Create a new duel server with a freshly generated leaderboard.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        // Board seed from a v4 UUID; the board is mock data, it only has
        // to be stable within one server run.
        let seed_bytes = *Uuid::new_v4().as_bytes();
        let seed = u64::from_le_bytes(seed_bytes[..8].try_into().expect("8 bytes"));
        let mut rng = DeterministicRng::new(seed);
        let leaderboard = Leaderboard::generate(&mut rng);

        Self {
            config,
            sessions: Arc::new(SessionManager::new()),
            leaderboard: Arc::new(RwLock::new(leaderboard)),
            board_rng: Arc::new(RwLock::new(rng)),
            shutdown_tx,
        }
    }

    /// Signal all tasks to shut down.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Run the server.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), DuelServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Duel server listening on {}", self.config.bind_addr);

        // Leaderboard bump loop
        let board_sessions = self.sessions.clone();
        let board = self.leaderboard.clone();
        let board_rng = self.board_rng.clone();
        let board_interval = self.config.leaderboard_interval;
        let board_handle = tokio::spawn(async move {
            Self::run_leaderboard_loop(board_sessions, board, board_rng, board_interval).await;
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let connected = self.sessions.count().await;
                            if connected >= self.config.max_connections {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.sessions
            .broadcast(ServerMessage::Shutdown {
                reason: "server stopping".to_string(),
            })
            .await;

        board_handle.abort();

        Ok(())
    }

    /// Periodically bump one leaderboard entry and push personalized
    /// snapshots to every connected player.
    async fn run_leaderboard_loop(
        sessions: Arc<SessionManager>,
        leaderboard: Arc<RwLock<Leaderboard>>,
        board_rng: Arc<RwLock<DeterministicRng>>,
        period: Duration,
    ) {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;

            {
                let mut board = leaderboard.write().await;
                let mut rng = board_rng.write().await;
                board.bump_random(&mut rng);
            }

            let board = leaderboard.read().await;
            for player in sessions.all().await {
                let p = player.read().await;
                let entries =
                    board.snapshot(Some((p.handle.as_str(), p.session.lifetime_winnings())));
                let _ = p
                    .sender
                    .send(ServerMessage::LeaderboardUpdate { entries })
                    .await;
            }
        }
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let sessions = self.sessions.clone();
        let leaderboard = self.leaderboard.clone();
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            // Session created by the first Join on this connection
            let mut joined: Option<(SessionId, Arc<RwLock<PlayerSession>>)> = None;

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let client_msg = match ClientMessage::from_json(&text) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        let _ = msg_tx.send(error_message(
                                            ErrorCode::InvalidInput,
                                            "Invalid message format",
                                        )).await;
                                        continue;
                                    }
                                };

                                let close = Self::handle_client_message(
                                    addr,
                                    client_msg,
                                    &mut joined,
                                    &sessions,
                                    &leaderboard,
                                    &config,
                                    &msg_tx,
                                ).await;

                                if close {
                                    break;
                                }
                            }
                            Some(Ok(Message::Ping(payload))) => {
                                // tungstenite answers pings at the protocol
                                // level; nothing to do here
                                debug!("ping from {} ({} bytes)", addr, payload.len());
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Ok(_)) => {
                                // Binary and pong frames are ignored
                            }
                            Some(Err(e)) => {
                                debug!("WebSocket error from {}: {}", addr, e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "server stopping".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            if let Some((session_id, _)) = joined {
                sessions.remove(&session_id).await;
                info!("Session {} closed", hex::encode(&session_id[..4]));
            }
            sender_task.abort();
        });
    }

    /// Handle one parsed client message. Returns true when the connection
    /// should close.
    async fn handle_client_message(
        addr: SocketAddr,
        msg: ClientMessage,
        joined: &mut Option<(SessionId, Arc<RwLock<PlayerSession>>)>,
        sessions: &Arc<SessionManager>,
        leaderboard: &Arc<RwLock<Leaderboard>>,
        config: &ServerConfig,
        msg_tx: &mpsc::Sender<ServerMessage>,
    ) -> bool {
        match msg {
            ClientMessage::Join(request) => {
                if joined.is_some() {
                    let _ = msg_tx
                        .send(error_message(
                            ErrorCode::AlreadyJoined,
                            "session already active on this connection",
                        ))
                        .await;
                    return false;
                }

                let session_id = *Uuid::new_v4().as_bytes();
                let seed = derive_session_seed(&session_id, &request.handle);
                let mut session = DuelSession::new(session_id, seed);
                session.greet(wall_clock_ms());

                info!(
                    "Player '{}' joined from {} (session {})",
                    request.handle,
                    addr,
                    hex::encode(&session_id[..4])
                );

                let welcome = ServerMessage::Welcome(WelcomeInfo {
                    session_id: hex::encode(session_id),
                    handle: request.handle.clone(),
                    balance: session.balance(),
                    stake: session.stake(),
                    difficulty: session.difficulty(),
                    server_version: config.version.clone(),
                });
                let greeting: Vec<ServerMessage> = session
                    .messages()
                    .iter()
                    .cloned()
                    .map(ServerMessage::Chat)
                    .collect();

                let player = Arc::new(RwLock::new(PlayerSession::new(
                    request.handle,
                    session,
                    msg_tx.clone(),
                )));
                sessions.register(session_id, player.clone()).await;
                *joined = Some((session_id, player));

                let _ = msg_tx.send(welcome).await;
                for chat in greeting {
                    let _ = msg_tx.send(chat).await;
                }
            }

            ClientMessage::SetDifficulty { difficulty } => {
                let Some((_, player)) = joined else {
                    let _ = msg_tx
                        .send(error_message(ErrorCode::NotJoined, "join first"))
                        .await;
                    return false;
                };

                let mut p = player.write().await;
                match p.session.set_difficulty(difficulty) {
                    Ok(()) => {
                        let _ = msg_tx
                            .send(ServerMessage::DifficultySet { difficulty })
                            .await;
                    }
                    Err(e) => {
                        let _ = msg_tx.send(error_message(error_code_for(&e), e)).await;
                    }
                }
            }

            ClientMessage::Play { mv } => {
                let Some((_, player)) = joined else {
                    let _ = msg_tx
                        .send(error_message(ErrorCode::NotJoined, "join first"))
                        .await;
                    return false;
                };

                let receipt = {
                    let mut p = player.write().await;
                    p.session.submit(mv)
                };

                match receipt {
                    Ok(receipt) => {
                        debug!("round {} submitted by {}", receipt.round, addr);
                        tokio::spawn(run_commit_sequence(
                            player.clone(),
                            receipt.round,
                            receipt.digest,
                        ));
                    }
                    Err(e) => {
                        let _ = msg_tx.send(error_message(error_code_for(&e), e)).await;
                    }
                }
            }

            ClientMessage::ClaimFaucet => {
                let Some((_, player)) = joined else {
                    let _ = msg_tx
                        .send(error_message(ErrorCode::NotJoined, "join first"))
                        .await;
                    return false;
                };

                let mut p = player.write().await;
                match p.session.claim_faucet(wall_clock_ms()) {
                    Ok(grant) => {
                        let notice = p.session.messages().last().cloned();
                        let _ = msg_tx
                            .send(ServerMessage::FaucetResult(FaucetResultInfo {
                                success: true,
                                amount: Some(grant.amount),
                                balance: p.session.balance(),
                                remaining_secs: None,
                            }))
                            .await;
                        if let Some(notice) = notice {
                            let _ = msg_tx.send(ServerMessage::Chat(notice)).await;
                        }
                    }
                    Err(FaucetError::CooldownActive { remaining_secs }) => {
                        let _ = msg_tx
                            .send(ServerMessage::FaucetResult(FaucetResultInfo {
                                success: false,
                                amount: None,
                                balance: p.session.balance(),
                                remaining_secs: Some(remaining_secs),
                            }))
                            .await;
                    }
                }
            }

            ClientMessage::Reset => {
                let Some((_, player)) = joined else {
                    let _ = msg_tx
                        .send(error_message(ErrorCode::NotJoined, "join first"))
                        .await;
                    return false;
                };

                let mut p = player.write().await;
                let before = p.session.messages().last().map(|m| m.id);
                p.session.reset(wall_clock_ms());

                let _ = msg_tx
                    .send(ServerMessage::ResetDone {
                        balance: p.session.balance(),
                    })
                    .await;

                // Forward the reboot taunt when one was logged
                if let Some(last) = p.session.messages().last() {
                    if before != Some(last.id) {
                        let _ = msg_tx.send(ServerMessage::Chat(last.clone())).await;
                    }
                }
            }

            ClientMessage::Leaderboard => {
                let Some((_, player)) = joined else {
                    let _ = msg_tx
                        .send(error_message(ErrorCode::NotJoined, "join first"))
                        .await;
                    return false;
                };

                let p = player.read().await;
                let board = leaderboard.read().await;
                let entries =
                    board.snapshot(Some((p.handle.as_str(), p.session.lifetime_winnings())));
                let _ = msg_tx
                    .send(ServerMessage::LeaderboardUpdate { entries })
                    .await;
            }

            ClientMessage::Ping { timestamp } => {
                let _ = msg_tx
                    .send(ServerMessage::Pong {
                        timestamp,
                        server_time: wall_clock_ms(),
                    })
                    .await;
            }

            ClientMessage::Leave => {
                debug!("Client {} leaving", addr);
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;
    use crate::game::session::GamePhase;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        }
    }

    async fn join(
        sessions: &Arc<SessionManager>,
        leaderboard: &Arc<RwLock<Leaderboard>>,
        config: &ServerConfig,
        handle: &str,
    ) -> (
        Option<(SessionId, Arc<RwLock<PlayerSession>>)>,
        mpsc::Receiver<ServerMessage>,
    ) {
        let (tx, rx) = mpsc::channel(64);
        let mut joined = None;
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        DuelServer::handle_client_message(
            addr,
            ClientMessage::Join(crate::network::protocol::JoinRequest {
                handle: handle.into(),
            }),
            &mut joined,
            sessions,
            leaderboard,
            config,
            &tx,
        )
        .await;

        (joined, rx)
    }

    fn test_board() -> Arc<RwLock<Leaderboard>> {
        let mut rng = DeterministicRng::new(1);
        Arc::new(RwLock::new(Leaderboard::generate(&mut rng)))
    }

    #[tokio::test]
    async fn test_join_creates_session_and_greets() {
        let sessions = Arc::new(SessionManager::new());
        let (joined, mut rx) = join(&sessions, &test_board(), &test_config(), "gladiator").await;

        assert!(joined.is_some());
        assert_eq!(sessions.count().await, 1);

        match rx.recv().await {
            Some(ServerMessage::Welcome(info)) => {
                assert_eq!(info.handle, "gladiator");
                assert_eq!(info.balance, crate::STARTING_BALANCE);
                assert_eq!(info.stake, crate::STAKE);
            }
            other => panic!("expected welcome, got {other:?}"),
        }

        // Greeting lines follow
        assert!(matches!(rx.recv().await, Some(ServerMessage::Chat(_))));
        assert!(matches!(rx.recv().await, Some(ServerMessage::Chat(_))));
    }

    #[tokio::test]
    async fn test_double_join_rejected() {
        let sessions = Arc::new(SessionManager::new());
        let board = test_board();
        let config = test_config();
        let (mut joined, mut rx) = join(&sessions, &board, &config, "gladiator").await;

        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let tx = {
            let p = joined.as_ref().unwrap().1.read().await;
            p.sender.clone()
        };

        DuelServer::handle_client_message(
            addr,
            ClientMessage::Join(crate::network::protocol::JoinRequest {
                handle: "again".into(),
            }),
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        // Skip welcome + greeting, then expect the error
        let mut saw_already_joined = false;
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::Error(err) = msg {
                assert_eq!(err.code, ErrorCode::AlreadyJoined);
                saw_already_joined = true;
            }
        }
        assert!(saw_already_joined);
        assert_eq!(sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_play_without_join_rejected() {
        let sessions = Arc::new(SessionManager::new());
        let (tx, mut rx) = mpsc::channel(8);
        let mut joined = None;
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        DuelServer::handle_client_message(
            addr,
            ClientMessage::Play { mv: Move::Rock },
            &mut joined,
            &sessions,
            &test_board(),
            &test_config(),
            &tx,
        )
        .await;

        match rx.recv().await {
            Some(ServerMessage::Error(err)) => assert_eq!(err.code, ErrorCode::NotJoined),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_play_submits_and_schedules_reveal() {
        let sessions = Arc::new(SessionManager::new());
        let board = test_board();
        let config = test_config();
        let (mut joined, mut rx) = join(&sessions, &board, &config, "gladiator").await;

        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let tx = {
            let p = joined.as_ref().unwrap().1.read().await;
            p.sender.clone()
        };

        DuelServer::handle_client_message(
            addr,
            ClientMessage::Play { mv: Move::Scissors },
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        // Stake deducted immediately; phase is Committing
        {
            let p = joined.as_ref().unwrap().1.read().await;
            assert_eq!(p.session.phase(), GamePhase::Committing);
            assert_eq!(p.session.balance(), crate::STARTING_BALANCE - crate::STAKE);
        }

        // A second play during the sequence is rejected
        DuelServer::handle_client_message(
            addr,
            ClientMessage::Play { mv: Move::Rock },
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        let mut saw_in_progress = false;
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::Error(err) = msg {
                if err.code == ErrorCode::RoundInProgress {
                    saw_in_progress = true;
                }
            }
        }
        assert!(saw_in_progress);
    }

    #[tokio::test]
    async fn test_faucet_flow() {
        let sessions = Arc::new(SessionManager::new());
        let board = test_board();
        let config = test_config();
        let (mut joined, mut rx) = join(&sessions, &board, &config, "gladiator").await;

        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let tx = {
            let p = joined.as_ref().unwrap().1.read().await;
            p.sender.clone()
        };

        // First claim succeeds
        DuelServer::handle_client_message(
            addr,
            ClientMessage::ClaimFaucet,
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        // Immediate second claim is on cooldown
        DuelServer::handle_client_message(
            addr,
            ClientMessage::ClaimFaucet,
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        let mut results = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::FaucetResult(info) = msg {
                results.push(info);
            }
        }

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(results[0].amount, Some(crate::FAUCET_AMOUNT));
        assert!(!results[1].success);
        assert!(results[1].remaining_secs.is_some());
        assert_eq!(
            results[1].balance,
            crate::STARTING_BALANCE + crate::FAUCET_AMOUNT
        );
    }

    #[tokio::test]
    async fn test_leaderboard_snapshot_includes_user_handle() {
        let sessions = Arc::new(SessionManager::new());
        let board = test_board();
        let config = test_config();
        let (mut joined, mut rx) = join(&sessions, &board, &config, "gladiator").await;

        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let tx = {
            let p = joined.as_ref().unwrap().1.read().await;
            p.sender.clone()
        };

        DuelServer::handle_client_message(
            addr,
            ClientMessage::Leaderboard,
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        let mut saw_board = false;
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::LeaderboardUpdate { entries } = msg {
                assert_eq!(entries.len(), crate::game::leaderboard::BOARD_SIZE);
                saw_board = true;
            }
        }
        assert!(saw_board);
    }

    #[tokio::test]
    async fn test_leave_closes_connection() {
        let sessions = Arc::new(SessionManager::new());
        let board = test_board();
        let config = test_config();
        let (mut joined, _rx) = join(&sessions, &board, &config, "gladiator").await;

        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let tx = {
            let p = joined.as_ref().unwrap().1.read().await;
            p.sender.clone()
        };

        let close = DuelServer::handle_client_message(
            addr,
            ClientMessage::Leave,
            &mut joined,
            &sessions,
            &board,
            &config,
            &tx,
        )
        .await;

        assert!(close);
    }

    #[tokio::test]
    async fn test_server_binds_ephemeral_port() {
        let server = DuelServer::new(test_config());
        let listener = TcpListener::bind(&server.config.bind_addr).await;
        assert!(listener.is_ok());
    }
}
