use std::sync::{Mutex, RwLock};

use log::{debug, info, warn};

use crate::blockchain::{Block, Chain, now_secs};
use crate::config::NodeConfig;
use crate::error::ChainError;
use crate::network::{PeerClient, PeerSet, PeerSyncService};
use crate::transaction::{Mempool, Transaction};

/// Shared node state: the chain, mempool and peer set, each behind its own
/// lock, plus a seal lock that admits one block production at a time.
///
/// Lock order, when more than one is needed: seal, mempool, chain.
pub struct AppState {
    pub chain: RwLock<Chain>,
    pub mempool: Mutex<Mempool>,
    pub peers: Mutex<PeerSet>,
    seal_lock: Mutex<()>,
    pub sync: PeerSyncService,
    pub config: NodeConfig,
}

impl AppState {
    /// Build the node state. Seals the genesis block, so this blocks for the
    /// duration of one PoW search at `config.difficulty`.
    pub fn new(config: NodeConfig) -> Self {
        let mut peers = PeerSet::new();
        for peer in &config.peers {
            if peers.register(peer) {
                info!("registered startup peer {peer}");
            }
        }
        Self {
            chain: RwLock::new(Chain::new(config.difficulty)),
            mempool: Mutex::new(Mempool::new(config.block_size)),
            peers: Mutex::new(peers),
            seal_lock: Mutex::new(()),
            sync: PeerSyncService::new(PeerClient::new(
                config.broadcast_timeout,
                config.fetch_timeout,
            )),
            config,
        }
    }

    /// Add `tx` to the mempool and, once the pool reaches the block size,
    /// mine it. Blocking; call from the blocking pool.
    ///
    /// Returns the new block when one was sealed. Losing a race for the
    /// pending transactions is not an error.
    pub fn accept_transaction(&self, tx: Transaction) -> Result<Option<Block>, ChainError> {
        let full = {
            let mut mempool = self.mempool.lock().expect("mempool lock poisoned");
            mempool.add(tx);
            debug!("transaction accepted (mempool size {})", mempool.size());
            mempool.is_full()
        };
        if !full {
            return Ok(None);
        }
        match self.mine_pending() {
            Ok(block) => Ok(Some(block)),
            Err(ChainError::EmptyMempool) | Err(ChainError::StaleTip { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Seal every pending transaction into a new block on the current tip.
    ///
    /// The PoW search runs holding only the seal lock, so readers and peer
    /// adoption proceed meanwhile. If the tip moved during the search the
    /// block is dropped and those of its transactions the new chain does not
    /// already hold go back to the mempool.
    pub fn mine_pending(&self) -> Result<Block, ChainError> {
        let _seal = self.seal_lock.lock().expect("seal lock poisoned");

        let (index, previous_hash, difficulty) = {
            let chain = self.chain.read().expect("chain lock poisoned");
            (
                chain.len() as u64,
                chain.latest()?.hash.clone(),
                chain.difficulty(),
            )
        };

        let transactions = self
            .mempool
            .lock()
            .expect("mempool lock poisoned")
            .drain()?;

        let mut block = Block::new(index, transactions, previous_hash);
        block.seal(difficulty);

        let mut chain = self.chain.write().expect("chain lock poisoned");
        if !chain.extends_tip(&block) {
            drop(chain);
            self.return_unsealed(block.transactions);
            return Err(ChainError::StaleTip { index });
        }
        let block = chain.append_sealed(block)?.clone();
        info!(
            "block #{} appended with {} transaction(s)",
            block.index,
            block.transactions.len()
        );
        Ok(block)
    }

    /// Put back transactions from a block that lost to an adopted chain,
    /// skipping any the adopted chain already sealed. Takes mempool then
    /// chain, the same order as the post-adoption prune, so whichever of the
    /// two runs second sees the other's result.
    fn return_unsealed(&self, transactions: Vec<Transaction>) {
        let mut mempool = self.mempool.lock().expect("mempool lock poisoned");
        let chain = self.chain.read().expect("chain lock poisoned");
        let total = transactions.len();
        let unsealed: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| !chain.transactions().any(|sealed| sealed == tx))
            .collect();
        warn!(
            "tip moved while sealing; returning {} of {total} transaction(s) to mempool",
            unsealed.len()
        );
        mempool.restore(unsealed);
    }

    /// True when the oldest pending transaction is older than the
    /// configured auto-mine age.
    pub fn has_stale_pending(&self) -> bool {
        let mempool = self.mempool.lock().expect("mempool lock poisoned");
        mempool
            .peek_oldest()
            .map(|tx| tx.age_secs(now_secs()) > self.config.auto_mine_age.as_secs_f64())
            .unwrap_or(false)
    }

    pub fn register_peer(&self, address: &str) -> (bool, usize) {
        let mut peers = self.peers.lock().expect("peers lock poisoned");
        let added = peers.register(address);
        (added, peers.len())
    }

    pub fn peer_list(&self) -> Vec<String> {
        self.peers.lock().expect("peers lock poisoned").list()
    }

    pub async fn broadcast_transaction(&self, tx: &Transaction) -> usize {
        let peers = self.peer_list();
        if peers.is_empty() {
            return 0;
        }
        self.sync.broadcast_transaction(&peers, tx).await
    }

    pub async fn announce_block(&self) -> usize {
        let peers = self.peer_list();
        if peers.is_empty() {
            return 0;
        }
        self.sync.broadcast_block_notice(&peers).await
    }

    /// One consensus round against every registered peer. After an adoption,
    /// pending transactions already sealed in the adopted chain are dropped.
    pub async fn sync_with_peers(&self) -> bool {
        let peers = self.peer_list();
        if peers.is_empty() {
            return false;
        }
        let adopted = self.sync.run_consensus_round(&peers, &self.chain).await;
        if adopted {
            let mut mempool = self.mempool.lock().expect("mempool lock poisoned");
            let chain = self.chain.read().expect("chain lock poisoned");
            let pruned = mempool.prune(|tx| chain.transactions().any(|sealed| sealed == tx));
            if pruned > 0 {
                info!("pruned {pruned} pending transaction(s) already in the adopted chain");
            }
        }
        adopted
    }
}

#[cfg(test)]
pub(crate) fn test_config(difficulty: u32, block_size: usize) -> NodeConfig {
    NodeConfig {
        difficulty,
        block_size,
        ..NodeConfig::default()
    }
}
