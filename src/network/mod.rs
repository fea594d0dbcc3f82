pub mod client;
pub mod peers;
pub mod sync;
pub mod tasks;

pub use client::{PeerChain, PeerClient};
pub use peers::PeerSet;
pub use sync::PeerSyncService;
