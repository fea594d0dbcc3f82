use serde_json::json;
use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// SHA-256 over the canonical JSON form of a block's sealed fields.
///
/// `serde_json` objects are key-sorted maps, so the preimage is identical no
/// matter in which order the fields were built.
pub fn block_digest(
    index: u64,
    transactions: &[Transaction],
    previous_hash: &str,
    timestamp: f64,
    nonce: u64,
) -> String {
    let preimage = json!({
        "index": index,
        "transactions": transactions,
        "previous_hash": previous_hash,
        "timestamp": timestamp,
        "nonce": nonce,
    });
    let mut hasher = Sha256::new();
    hasher.update(preimage.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// True when `hash` starts with `difficulty` hex zeros.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let wanted = difficulty as usize;
    hash.len() >= wanted && hash.bytes().take(wanted).all(|b| b == b'0')
}
