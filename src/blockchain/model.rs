use log::{info, warn};
use serde_json::Value;

use super::hash::meets_difficulty;
use super::{Block, GENESIS_PREVIOUS_HASH};
use crate::error::{ChainError, ValidationError};
use crate::transaction::Transaction;

/// In-memory chain of PoW-sealed blocks. Index 0 is always the genesis block.
#[derive(Debug, Clone)]
pub struct Chain {
    pub blocks: Vec<Block>,
    pub difficulty: u32,
}

impl Chain {
    /// Initialize a new chain with a sealed genesis block.
    pub fn new(difficulty: u32) -> Self {
        let mut chain = Self {
            blocks: Vec::new(),
            difficulty,
        };
        chain.create_genesis();
        chain
    }

    fn create_genesis(&mut self) {
        let mut genesis = Block::new(
            0,
            vec![Transaction::genesis_marker()],
            GENESIS_PREVIOUS_HASH.to_string(),
        );
        genesis.seal(self.difficulty);
        info!("genesis block created (difficulty {})", self.difficulty);
        self.blocks.push(genesis);
    }

    /// Return the last block in the chain.
    pub fn latest(&self) -> Result<&Block, ChainError> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// Seal `transactions` into a block on top of the current tip and append it.
    pub fn append_mined(&mut self, transactions: Vec<Transaction>) -> Result<&Block, ChainError> {
        let index = self.blocks.len() as u64;
        let previous_hash = self.latest()?.hash.clone();

        let mut block = Block::new(index, transactions, previous_hash);
        block.seal(self.difficulty);
        self.append_sealed(block)
    }

    /// Append a block that was sealed elsewhere, provided it still extends
    /// the current tip.
    pub fn append_sealed(&mut self, block: Block) -> Result<&Block, ChainError> {
        if !self.extends_tip(&block) {
            return Err(ChainError::StaleTip { index: block.index });
        }
        self.blocks.push(block);
        self.latest()
    }

    /// True when `block` sits directly on top of the current tip.
    pub fn extends_tip(&self, block: &Block) -> bool {
        match self.blocks.last() {
            Some(tip) => block.index == self.blocks.len() as u64 && block.previous_hash == tip.hash,
            None => false,
        }
    }

    /// Re-derive every block from index 1 on and report the first violation:
    /// payload tampering, then broken linkage, then missing work.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, pair) in self.blocks.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            let index = index + 1;

            if current.hash != current.compute_hash() {
                return Err(ValidationError::HashMismatch { index });
            }
            if current.previous_hash != prev.hash {
                return Err(ValidationError::BrokenLink { index });
            }
            if !meets_difficulty(&current.hash, self.difficulty) {
                return Err(ValidationError::InsufficientWork {
                    index,
                    difficulty: self.difficulty,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("chain validation failed: {e}");
                false
            }
        }
    }

    /// Rebuild a chain from transport records without re-sealing.
    /// Validity is established only by a later `validate()`.
    pub fn from_records(records: &[Value], difficulty: u32) -> Result<Self, ChainError> {
        if records.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        let mut blocks = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let block = Block::from_record(record, position)?;
            if block.index != position as u64 {
                return Err(ChainError::MalformedRecord {
                    position,
                    reason: format!("record carries index {}", block.index),
                });
            }
            blocks.push(block);
        }
        Ok(Self { blocks, difficulty })
    }

    pub fn to_records(&self) -> Vec<Value> {
        self.blocks.iter().map(Block::to_record).collect()
    }

    /// Every transaction sealed in the chain, genesis marker included.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.blocks.iter().flat_map(|b| b.transactions.iter())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}
