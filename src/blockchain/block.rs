use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::hash::{block_digest, meets_difficulty};
use super::now_secs;
use crate::error::ChainError;
use crate::transaction::Transaction;

/// A single block in the chain holding an ordered batch of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub timestamp: f64, // Unix seconds (UTC)
    pub nonce: u64,     // Proof-of-Work nonce
    pub hash: String,   // Empty until sealed
}

impl Block {
    /// Create a new, unsealed block stamped with the current time.
    /// Call `seal()` to perform PoW.
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Self::with_timestamp(index, transactions, previous_hash, now_secs())
    }

    pub fn with_timestamp(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: String,
        timestamp: f64,
    ) -> Self {
        Self {
            index,
            transactions,
            previous_hash,
            timestamp,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// Hash of the current field values, including the current nonce.
    pub fn compute_hash(&self) -> String {
        block_digest(
            self.index,
            &self.transactions,
            &self.previous_hash,
            self.timestamp,
            self.nonce,
        )
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex).
    ///
    /// Blocks the calling thread until a nonce is found; there is no
    /// iteration cap.
    pub fn seal(&mut self, difficulty: u32) {
        let started = Instant::now();
        loop {
            self.hash = self.compute_hash();
            if meets_difficulty(&self.hash, difficulty) {
                break;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
        info!(
            "sealed block #{} hash={}.. nonce={} ({:.2}s)",
            self.index,
            &self.hash[..self.hash.len().min(16)],
            self.nonce,
            started.elapsed().as_secs_f64()
        );
    }

    /// Transport shape: every field, `hash` included.
    pub fn to_record(&self) -> Value {
        json!({
            "index": self.index,
            "transactions": self.transactions,
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
            "nonce": self.nonce,
            "hash": self.hash,
        })
    }

    /// Rebuild a block from a transport record, trusting `nonce` and `hash`
    /// as given.
    pub fn from_record(record: &Value, position: usize) -> Result<Self, ChainError> {
        Block::deserialize(record).map_err(|e| ChainError::MalformedRecord {
            position,
            reason: e.to_string(),
        })
    }
}
