use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::DEFAULT_DIFFICULTY;

/// Node settings, read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    /// Pending transactions that trigger mining.
    pub block_size: usize,
    pub auto_mine_interval: Duration,
    /// Age of the oldest pending transaction that forces a block.
    pub auto_mine_age: Duration,
    pub sync_interval: Duration,
    pub broadcast_timeout: Duration,
    pub fetch_timeout: Duration,
    pub peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            difficulty: DEFAULT_DIFFICULTY,
            block_size: 5,
            auto_mine_interval: Duration::from_secs(30),
            auto_mine_age: Duration::from_secs(120),
            sync_interval: Duration::from_secs(60),
            broadcast_timeout: Duration::from_millis(2000),
            fetch_timeout: Duration::from_millis(5000),
            peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            difficulty: env_or("DIFFICULTY", defaults.difficulty),
            block_size: env_or("BLOCK_SIZE", defaults.block_size),
            auto_mine_interval: secs_or("AUTO_MINE_INTERVAL_SECS", defaults.auto_mine_interval),
            auto_mine_age: secs_or("AUTO_MINE_AGE_SECS", defaults.auto_mine_age),
            sync_interval: secs_or("SYNC_INTERVAL_SECS", defaults.sync_interval),
            broadcast_timeout: millis_or("BROADCAST_TIMEOUT_MS", defaults.broadcast_timeout),
            fetch_timeout: millis_or("FETCH_TIMEOUT_MS", defaults.fetch_timeout),
            peers: env::var("PEERS")
                .map(|raw| parse_peer_list(&raw))
                .unwrap_or_default(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

fn secs_or(key: &str, default: Duration) -> Duration {
    Duration::from_secs(env_or(key, default.as_secs()))
}

fn millis_or(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_or(key, default.as_millis() as u64))
}

fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
