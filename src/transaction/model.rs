use serde::{Deserialize, Serialize};

use crate::blockchain::now_secs;

/// A donation from `sender` to `recipient`.
///
/// There is no account model: `amount` is recorded as given, without balance
/// or upper-bound checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: f64, // Unix seconds (UTC)
}

impl Transaction {
    /// Build a transaction stamped with the current time.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self::with_timestamp(sender, recipient, amount, now_secs())
    }

    pub fn with_timestamp(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
        timestamp: f64,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            timestamp,
        }
    }

    /// The system-marker transaction carried by every genesis block.
    pub fn genesis_marker() -> Self {
        Self::new("System", "Genesis", 0.0)
    }

    /// Seconds elapsed since this transaction was created.
    pub fn age_secs(&self, now: f64) -> f64 {
        (now - self.timestamp).max(0.0)
    }
}
