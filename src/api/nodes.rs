use actix_web::{HttpResponse, Responder, get, post, rt, web};
use log::info;

use super::models::{
    ConsensusResponse, ErrorResponse, MessageResponse, PeerListResponse, RegisterNodeRequest,
    RegisterNodeResponse,
};
use crate::network::peers::normalize_address;
use crate::state::AppState;

/// Register a peer. Re-registering a known address is a no-op.
#[post("/nodes/register")]
pub async fn register_node(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodeRequest>,
) -> impl Responder {
    let address = body.node_address.as_deref().unwrap_or_default();
    if normalize_address(address).is_none() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("node_address required"));
    }

    let (added, total_peers) = state.register_peer(address);
    if added {
        info!("registered peer {}", address.trim());
    }
    HttpResponse::Created().json(RegisterNodeResponse {
        message: "node registered".to_string(),
        total_peers,
    })
}

#[get("/nodes/list")]
pub async fn list_nodes(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peer_list();
    HttpResponse::Ok().json(PeerListResponse {
        count: peers.len(),
        peers,
    })
}

/// Run a consensus round against every known peer.
#[post("/consensus")]
pub async fn consensus(state: web::Data<AppState>) -> impl Responder {
    let replaced = state.sync_with_peers().await;
    let length = state.chain.read().expect("chain lock poisoned").len();
    let message = if replaced {
        "chain replaced"
    } else {
        "local chain is authoritative"
    };
    HttpResponse::Ok().json(ConsensusResponse {
        message: message.to_string(),
        replaced,
        length,
    })
}

/// Block notice from a peer: pull chains and apply the longest valid one.
/// The round runs after the reply, so the sender's broadcast timeout only
/// covers delivery.
#[post("/blocks/receive")]
pub async fn receive_block(state: web::Data<AppState>) -> impl Responder {
    info!("block notice received, scheduling consensus");
    let state = state.into_inner();
    rt::spawn(async move {
        if state.sync_with_peers().await {
            info!("block notice: adopted a longer chain");
        }
    });
    HttpResponse::Ok().json(MessageResponse {
        message: "block notice received".to_string(),
    })
}
