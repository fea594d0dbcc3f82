use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use super::Chain;
use crate::error::{ChainError, ValidationError};

/// Why a candidate chain was not adopted.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("malformed candidate: {0}")]
    Malformed(#[from] ChainError),
    #[error("candidate length {candidate} does not exceed local length {local}")]
    NotLonger { local: usize, candidate: usize },
    #[error("invalid candidate: {0}")]
    Invalid(#[from] ValidationError),
}

/// Longest-valid-chain rule. Equal-length candidates are never adopted.
pub struct ConsensusResolver;

impl ConsensusResolver {
    /// Decide whether `candidate_records` should replace `local`, without
    /// touching it. Returns the rebuilt candidate on success.
    pub fn evaluate(local: &Chain, candidate_records: &[Value]) -> Result<Chain, Rejection> {
        let candidate = Chain::from_records(candidate_records, local.difficulty())?;
        if candidate.len() <= local.len() {
            return Err(Rejection::NotLonger {
                local: local.len(),
                candidate: candidate.len(),
            });
        }
        candidate.validate()?;
        Ok(candidate)
    }

    /// Replace `local` wholesale with the candidate when it is strictly
    /// longer and valid. Garbage input is a rejection, never an error.
    pub fn try_adopt(local: &mut Chain, candidate_records: &[Value]) -> bool {
        match Self::evaluate(local, candidate_records) {
            Ok(candidate) => {
                info!(
                    "adopting candidate chain: length {} -> {}",
                    local.len(),
                    candidate.len()
                );
                *local = candidate;
                true
            }
            Err(rejection) => {
                debug!("candidate chain rejected: {rejection}");
                false
            }
        }
    }
}
