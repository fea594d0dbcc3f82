use thiserror::Error;

/// Why a chain failed re-validation. Only the first violation is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block {index}: stored hash does not match its contents")]
    HashMismatch { index: usize },
    #[error("block {index}: previous_hash does not match the predecessor's hash")]
    BrokenLink { index: usize },
    #[error("block {index}: hash does not satisfy difficulty {difficulty}")]
    InsufficientWork { index: usize, difficulty: u32 },
}

/// Errors raised by chain and mempool operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("no pending transactions to mine")]
    EmptyMempool,
    #[error("malformed block record at position {position}: {reason}")]
    MalformedRecord { position: usize, reason: String },
    #[error("block {index} no longer extends the chain tip")]
    StaleTip { index: u64 },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Errors talking to a single peer. Always handled per peer, never fatal.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("request to {peer} failed: {source}")]
    Http {
        peer: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{peer} responded with status {status}")]
    Status {
        peer: String,
        status: reqwest::StatusCode,
    },
}
