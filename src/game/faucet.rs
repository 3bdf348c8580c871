//! Faucet
//!
//! Grants a fixed credit amount once per cooldown window. Pure: the caller
//! supplies the previous claim time and the current time, both in
//! milliseconds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FAUCET_AMOUNT, FAUCET_COOLDOWN_MS};

/// A successful faucet claim.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FaucetGrant {
    /// Credits granted.
    pub amount: u64,
    /// When the claim was made (milliseconds).
    pub claimed_at_ms: u64,
}

/// Faucet errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FaucetError {
    /// Claim attempted before the cooldown window elapsed. Non-fatal;
    /// carries the remaining wait in whole seconds, rounded up.
    #[error("faucet cooling down, {remaining_secs}s remaining")]
    CooldownActive {
        /// Seconds until the next claim can succeed.
        remaining_secs: u64,
    },
}

/// Attempt a faucet claim.
///
/// Succeeds when there was no previous claim, or when the cooldown window
/// has fully elapsed since the previous successful claim.
pub fn claim(last_claim_ms: Option<u64>, now_ms: u64) -> Result<FaucetGrant, FaucetError> {
    if let Some(last) = last_claim_ms {
        let elapsed = now_ms.saturating_sub(last);
        if elapsed < FAUCET_COOLDOWN_MS {
            let remaining_ms = FAUCET_COOLDOWN_MS - elapsed;
            return Err(FaucetError::CooldownActive {
                remaining_secs: remaining_ms.div_ceil(1000),
            });
        }
    }

    Ok(FaucetGrant {
        amount: FAUCET_AMOUNT,
        claimed_at_ms: now_ms,
    })
}
