use std::collections::VecDeque;

use super::model::Transaction;
use crate::error::ChainError;

/// Pending transactions in arrival order, waiting to be sealed into a block.
#[derive(Debug)]
pub struct Mempool {
    pending: VecDeque<Transaction>,
    block_size: usize,
}

impl Mempool {
    /// `block_size` is the pending count at which the node should mine.
    pub fn new(block_size: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            block_size: block_size.max(1),
        }
    }

    pub fn add(&mut self, tx: Transaction) {
        self.pending.push_back(tx);
    }

    /// Take every pending transaction, leaving the pool empty.
    pub fn drain(&mut self) -> Result<Vec<Transaction>, ChainError> {
        if self.pending.is_empty() {
            return Err(ChainError::EmptyMempool);
        }
        Ok(self.pending.drain(..).collect())
    }

    /// Put transactions from an abandoned block back in front of anything
    /// that arrived while it was being sealed.
    pub fn restore(&mut self, txs: Vec<Transaction>) {
        for tx in txs.into_iter().rev() {
            self.pending.push_front(tx);
        }
    }

    /// Drop pending transactions for which `included` returns true.
    /// Returns how many were removed.
    pub fn prune<F>(&mut self, included: F) -> usize
    where
        F: Fn(&Transaction) -> bool,
    {
        let before = self.pending.len();
        self.pending.retain(|tx| !included(tx));
        before - self.pending.len()
    }

    pub fn size(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.block_size
    }

    pub fn peek_oldest(&self) -> Option<&Transaction> {
        self.pending.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }
}
