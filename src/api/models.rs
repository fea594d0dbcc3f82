use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Organizations that may receive donations.
pub const ORGANIZATIONS: [&str; 5] = [
    "Rotes Kreuz",
    "WWF",
    "Ärzte ohne Grenzen",
    "UNICEF",
    "Greenpeace",
];

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub blocks: usize,
    pub pending_transactions: usize,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Value>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Value,
}

/* ---------- TX API Models ---------- */

/// Inbound transaction. Peers forward the original timestamp; clients omit it.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: Option<f64>,
}

#[derive(Serialize)]
pub struct NewTransactionResponse {
    pub message: String,
    pub mempool_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mined_block: Option<u64>,
}

#[derive(Serialize)]
pub struct MempoolResponse {
    pub size: usize,
    pub transactions: Vec<crate::transaction::Transaction>,
}

#[derive(Serialize)]
pub struct OrganizationsResponse {
    pub organizations: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_donations: f64,
    pub donations_per_organization: BTreeMap<String, f64>,
    pub total_blocks: usize,
    pub pending_transactions: usize,
    pub chain_valid: bool,
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodeRequest {
    pub node_address: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterNodeResponse {
    pub message: String,
    pub total_peers: usize,
}

#[derive(Serialize)]
pub struct PeerListResponse {
    pub peers: Vec<String>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ConsensusResponse {
    pub message: String,
    pub replaced: bool,
    pub length: usize,
}
