//! Mock Leaderboard
//!
//! The "TOP GLADIATORS" board is mock data: ten synthetic wallet
//! addresses with seeded winnings, re-ranked after periodic bumps. The
//! connected player's own lifetime winnings can be spliced in when a
//! snapshot is taken.

use serde::{Deserialize, Serialize};

use crate::core::rng::DeterministicRng;

/// Number of board slots.
pub const BOARD_SIZE: usize = 10;

/// Winnings added to one random entry per live bump.
pub const BUMP_AMOUNT: u64 = 100;

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// One leaderboard row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Rank, 1-based, recomputed after every reorder.
    pub rank: u8,
    /// Shortened wallet address, `0x1234...CDEF` style.
    pub address: String,
    /// Lifetime winnings ($DUEL).
    pub winnings: u64,
    /// Whether this row is the connected player.
    pub is_user: bool,
}

/// The mock leaderboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Generate a fresh board of synthetic gladiators.
    ///
    /// Earlier slots are seeded richer (`5_000 * (BOARD_SIZE - i)` base
    /// plus a uniform roll), then the board is sorted and ranked.
    pub fn generate(rng: &mut DeterministicRng) -> Self {
        let mut entries: Vec<LeaderboardEntry> = (0..BOARD_SIZE)
            .map(|i| LeaderboardEntry {
                rank: 0,
                address: short_address(&random_address(rng)),
                winnings: rng.next_int(50_000) as u64 + 5_000 * (BOARD_SIZE - i) as u64,
                is_user: false,
            })
            .collect();

        sort_and_rank(&mut entries);
        Self { entries }
    }

    /// Live update: one random entry gains a fixed amount and the board
    /// is re-ranked.
    pub fn bump_random(&mut self, rng: &mut DeterministicRng) {
        let idx = rng.next_int(self.entries.len() as u32) as usize;
        self.entries[idx].winnings += BUMP_AMOUNT;
        sort_and_rank(&mut self.entries);
    }

    /// Ranked snapshot, optionally splicing in the connected player.
    ///
    /// The player's row replaces the tail entry when their winnings earn
    /// a slot; the result is always `BOARD_SIZE` rows.
    pub fn snapshot(&self, user: Option<(&str, u64)>) -> Vec<LeaderboardEntry> {
        let mut entries = self.entries.clone();

        if let Some((address, winnings)) = user {
            entries.push(LeaderboardEntry {
                rank: 0,
                address: address.to_string(),
                winnings,
                is_user: true,
            });
            sort_and_rank(&mut entries);
            entries.truncate(BOARD_SIZE);
        }

        entries
    }

    /// Current rows, ranked.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }
}

/// Generate a full 42-char synthetic address: `0x` + 40 uppercase hex.
fn random_address(rng: &mut DeterministicRng) -> String {
    let mut addr = String::with_capacity(42);
    addr.push_str("0x");
    for _ in 0..40 {
        let c = HEX_CHARS[rng.next_int(16) as usize] as char;
        addr.push(c);
    }
    addr
}

/// Shorten a full address the way the client renders it:
/// first 6 chars + "..." + last 4.
fn short_address(full: &str) -> String {
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

fn sort_and_rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.winnings.cmp(&a.winnings));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as u8;
    }
}
