//! Commitment Digests
//!
//! SHA-256 digests shown during the fake "submission to chain" sequence.
//! These are presentation only: nothing verifies them, no chain exists.
//! They are still computed deterministically so a replayed session shows
//! the same digests.

use sha2::{Digest, Sha256};

/// Digest output type (256 bits / 32 bytes)
pub type CommitDigest = [u8; 32];

/// Domain separator for round commitments.
const COMMITMENT_DOMAIN: &[u8] = b"MOLT_DUEL_COMMIT_V1";

/// Compute the commitment digest for a submitted round.
///
/// Binds the session, the round number, the player's move, and the RNG
/// state at submission time. Order of updates is fixed.
pub fn commitment_digest(
    session_id: &[u8; 16],
    round: u64,
    player_move: u8,
    rng_state: [u64; 2],
) -> CommitDigest {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(session_id);
    hasher.update(round.to_le_bytes());
    hasher.update([player_move]);
    hasher.update(rng_state[0].to_le_bytes());
    hasher.update(rng_state[1].to_le_bytes());
    hasher.finalize().into()
}

/// Render a digest the way the client displays transaction hashes:
/// `0x` + first 8 hex chars.
pub fn short_digest(digest: &CommitDigest) -> String {
    format!("0x{}", &hex::encode(digest)[..8])
}

/// Fake block number "confirming" a round, derived from its digest.
///
/// Lands in the 99,000,000..100,000,000 range the client footer shows.
pub fn fake_block_number(digest: &CommitDigest) -> u64 {
    let raw = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    99_000_000 + u64::from(raw) % 1_000_000
}
