pub mod block;
pub mod consensus;
pub mod hash;
pub mod model;

use chrono::Utc;

pub use block::Block;
pub use consensus::ConsensusResolver;
pub use model::Chain;

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// `previous_hash` carried by every genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Current wall-clock time as fractional Unix seconds (UTC).
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
