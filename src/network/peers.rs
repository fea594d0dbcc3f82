use std::collections::HashSet;

/// Manually registered peer base URLs. Never pruned automatically.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: HashSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Returns `false` when the address is blank or already
    /// known.
    pub fn register(&mut self, address: &str) -> bool {
        match normalize_address(address) {
            Some(addr) => self.peers.insert(addr),
            None => false,
        }
    }

    /// Snapshot of all peers, sorted for stable output.
    pub fn list(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.peers.iter().cloned().collect();
        peers.sort();
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Trim whitespace and trailing slashes so `http://x:5000/` and
/// `http://x:5000` are the same peer.
pub fn normalize_address(address: &str) -> Option<String> {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
