use std::sync::Arc;

use actix_web::rt::{self, task::JoinHandle, time::interval};
use actix_web::web;
use log::{error, info, warn};

use crate::error::ChainError;
use crate::state::AppState;

/// Loop A: every `auto_mine_interval`, seal the mempool if its oldest
/// transaction is older than `auto_mine_age`, then notify peers.
pub fn spawn_auto_miner(state: Arc<AppState>) -> JoinHandle<()> {
    rt::spawn(async move {
        let mut ticker = interval(state.config.auto_mine_interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            if !state.has_stale_pending() {
                continue;
            }
            info!("auto-mine: pending transactions exceeded the age limit");
            let miner = Arc::clone(&state);
            match web::block(move || miner.mine_pending()).await {
                Ok(Ok(_)) => {
                    state.announce_block().await;
                }
                Ok(Err(ChainError::EmptyMempool)) => {}
                Ok(Err(e)) => warn!("auto-mine skipped: {e}"),
                Err(e) => error!("auto-mine worker failed: {e}"),
            }
        }
    })
}

/// Loop B: every `sync_interval`, run a consensus round against all peers.
pub fn spawn_auto_sync(state: Arc<AppState>) -> JoinHandle<()> {
    rt::spawn(async move {
        let mut ticker = interval(state.config.sync_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if state.peer_list().is_empty() {
                continue;
            }
            info!("auto-sync: starting consensus round");
            if state.sync_with_peers().await {
                info!("auto-sync: adopted a longer chain");
            }
        }
    })
}
