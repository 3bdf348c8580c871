//! Core deterministic primitives.
//!
//! Everything in this module is platform-independent and free of system
//! time, I/O, and floating point. The game layer builds on these.

pub mod hash;
pub mod rng;

// Re-export core types
pub use hash::{commitment_digest, fake_block_number, short_digest};
pub use rng::DeterministicRng;
