use std::sync::RwLock;

use futures::future::join_all;
use log::{debug, info, warn};

use super::client::{PeerChain, PeerClient};
use crate::blockchain::{Chain, ConsensusResolver};
use crate::error::PeerError;
use crate::transaction::Transaction;

/// Best-effort gossip and consensus rounds against a set of peers.
///
/// Each peer is its own failure domain: one peer timing out or erroring never
/// stops delivery to, or fetching from, the others.
#[derive(Debug, Clone)]
pub struct PeerSyncService {
    client: PeerClient,
}

impl PeerSyncService {
    pub fn new(client: PeerClient) -> Self {
        Self { client }
    }

    /// Push `tx` to every peer's intake endpoint. Returns how many accepted it.
    pub async fn broadcast_transaction(&self, peers: &[String], tx: &Transaction) -> usize {
        let sends = peers.iter().map(|peer| self.client.send_transaction(peer, tx));
        count_delivered("transaction", join_all(sends).await)
    }

    /// Tell every peer a new block exists; they pull it via consensus.
    pub async fn broadcast_block_notice(&self, peers: &[String]) -> usize {
        let sends = peers.iter().map(|peer| self.client.send_block_notice(peer));
        count_delivered("block notice", join_all(sends).await)
    }

    /// Fetch every peer's chain, then offer each to the resolver in peer
    /// order. Returns whether any candidate was adopted.
    ///
    /// The chain lock is only taken after all fetches complete.
    pub async fn run_consensus_round(&self, peers: &[String], chain: &RwLock<Chain>) -> bool {
        let fetches = peers.iter().map(|peer| async move {
            (peer.as_str(), self.client.fetch_chain(peer).await)
        });
        let responses: Vec<(&str, Result<PeerChain, PeerError>)> = join_all(fetches).await;

        let mut adopted = false;
        for (peer, response) in responses {
            let candidate = match response {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!("skipping peer in consensus round: {e}");
                    continue;
                }
            };
            if candidate.length != candidate.chain.len() {
                debug!(
                    "{peer} reported length {} for {} blocks",
                    candidate.length,
                    candidate.chain.len()
                );
            }
            let mut local = chain.write().expect("chain lock poisoned");
            if ConsensusResolver::try_adopt(&mut local, &candidate.chain) {
                info!("adopted chain from {peer} (length {})", local.len());
                adopted = true;
            }
        }
        adopted
    }
}

fn count_delivered(what: &str, outcomes: Vec<Result<(), PeerError>>) -> usize {
    let mut delivered = 0;
    for outcome in outcomes {
        match outcome {
            Ok(()) => delivered += 1,
            Err(e) => warn!("{what} not delivered: {e}"),
        }
    }
    debug!("{what} delivered to {delivered} peer(s)");
    delivered
}
