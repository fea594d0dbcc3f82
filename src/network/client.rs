use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::PeerError;
use crate::transaction::Transaction;

/// Body of `GET <peer>/chain`. Blocks stay raw so that a malformed block is
/// judged by consensus rather than failing the fetch.
#[derive(Debug, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Value>,
    pub length: usize,
}

/// HTTP client for the peer protocol. Every call carries its own timeout.
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: Client,
    broadcast_timeout: Duration,
    fetch_timeout: Duration,
}

impl PeerClient {
    pub fn new(broadcast_timeout: Duration, fetch_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            broadcast_timeout,
            fetch_timeout,
        }
    }

    pub async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, PeerError> {
        let response = self
            .client
            .get(format!("{peer}/chain"))
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|source| http_error(peer, source))?;
        if !response.status().is_success() {
            return Err(PeerError::Status {
                peer: peer.to_string(),
                status: response.status(),
            });
        }
        response
            .json()
            .await
            .map_err(|source| http_error(peer, source))
    }

    pub async fn send_transaction(&self, peer: &str, tx: &Transaction) -> Result<(), PeerError> {
        self.post(peer, "/transactions/receive", &json!(tx)).await
    }

    pub async fn send_block_notice(&self, peer: &str) -> Result<(), PeerError> {
        self.post(peer, "/blocks/receive", &json!({})).await
    }

    async fn post(&self, peer: &str, endpoint: &str, body: &Value) -> Result<(), PeerError> {
        let response = self
            .client
            .post(format!("{peer}{endpoint}"))
            .json(body)
            .timeout(self.broadcast_timeout)
            .send()
            .await
            .map_err(|source| http_error(peer, source))?;
        if !response.status().is_success() {
            return Err(PeerError::Status {
                peer: peer.to_string(),
                status: response.status(),
            });
        }
        Ok(())
    }
}

fn http_error(peer: &str, source: reqwest::Error) -> PeerError {
    PeerError::Http {
        peer: peer.to_string(),
        source,
    }
}
