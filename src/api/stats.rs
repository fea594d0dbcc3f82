use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, get, web};

use super::models::{ORGANIZATIONS, OrganizationsResponse, StatsResponse};
use crate::state::AppState;

#[get("/organizations")]
pub async fn get_organizations() -> impl Responder {
    HttpResponse::Ok().json(OrganizationsResponse {
        organizations: ORGANIZATIONS.to_vec(),
    })
}

/// Donation totals over every block except genesis.
#[get("/stats")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let mut per_org: BTreeMap<String, f64> = ORGANIZATIONS
        .iter()
        .map(|org| (org.to_string(), 0.0))
        .collect();

    let (total_blocks, chain_valid) = {
        let chain = state.chain.read().expect("chain lock poisoned");
        for tx in chain.blocks.iter().skip(1).flat_map(|b| b.transactions.iter()) {
            if let Some(total) = per_org.get_mut(&tx.recipient) {
                *total += tx.amount;
            }
        }
        (chain.len(), chain.is_valid())
    };

    let pending_transactions = state.mempool.lock().expect("mempool lock poisoned").size();

    HttpResponse::Ok().json(StatsResponse {
        total_donations: per_org.values().sum(),
        donations_per_organization: per_org,
        total_blocks,
        pending_transactions,
        chain_valid,
    })
}
