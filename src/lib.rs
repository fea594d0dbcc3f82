//! Append-only donation ledger replicated between nodes over HTTP gossip,
//! sealed with Proof-of-Work and reconciled by the longest valid chain.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod network;
pub mod state;
pub mod transaction;
