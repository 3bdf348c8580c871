//! Networking Module
//!
//! The non-deterministic edge of the server: WebSocket connections,
//! wall clocks, and the timers that pace the fake confirmation sequence
//! and the leaderboard bumps.
//!
//! - `protocol`: Wire message types
//! - `session`: Connected-player sessions and the session registry
//! - `server`: WebSocket accept/dispatch loops

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{ClientMessage, ServerMessage};
pub use server::{DuelServer, ServerConfig};
pub use session::{PlayerSession, SessionManager};
