use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info, warn};

use super::models::{
    ErrorResponse, MempoolResponse, MessageResponse, NewTransactionResponse, ORGANIZATIONS,
    TransactionRequest,
};
use crate::blockchain::Block;
use crate::state::AppState;
use crate::transaction::Transaction;

/// Submit a donation. Accepted transactions are gossiped to peers; a full
/// mempool is sealed right away and peers are told about the new block.
#[post("/transactions/new")]
pub async fn new_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionRequest>,
) -> impl Responder {
    let body = body.into_inner();
    if !ORGANIZATIONS.contains(&body.recipient.as_str()) {
        warn!("POST /transactions/new - unknown organization {:?}", body.recipient);
        return HttpResponse::BadRequest().json(ErrorResponse::new("unknown organization"));
    }

    let tx = Transaction::new(body.sender, body.recipient, body.amount);
    let mined = match intake(&state, tx.clone()).await {
        Ok(mined) => mined,
        Err(resp) => return resp,
    };

    state.broadcast_transaction(&tx).await;
    if let Some(block) = &mined {
        info!("threshold reached, sealed block #{}", block.index);
        state.announce_block().await;
    }

    let mempool_size = state.mempool.lock().expect("mempool lock poisoned").size();
    HttpResponse::Created().json(NewTransactionResponse {
        message: "transaction added".to_string(),
        mempool_size,
        mined_block: mined.map(|b| b.index),
    })
}

/// Peer intake. Never re-broadcasts the transaction.
#[post("/transactions/receive")]
pub async fn receive_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let tx = match body.timestamp {
        Some(ts) => Transaction::with_timestamp(body.sender, body.recipient, body.amount, ts),
        None => Transaction::new(body.sender, body.recipient, body.amount),
    };
    info!("received transaction from peer: {} -> {}", tx.sender, tx.recipient);

    match intake(&state, tx).await {
        Ok(Some(_)) => {
            state.announce_block().await;
        }
        Ok(None) => {}
        Err(resp) => return resp,
    }
    HttpResponse::Ok().json(MessageResponse {
        message: "transaction received".to_string(),
    })
}

/// List pending transactions.
#[get("/mempool")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    let mempool = state.mempool.lock().expect("mempool lock poisoned");
    HttpResponse::Ok().json(MempoolResponse {
        size: mempool.size(),
        transactions: mempool.iter().cloned().collect(),
    })
}

/// Add to the mempool on the blocking pool, since reaching the block size
/// seals a block there.
async fn intake(state: &web::Data<AppState>, tx: Transaction) -> Result<Option<Block>, HttpResponse> {
    let node = state.clone().into_inner();
    match web::block(move || node.accept_transaction(tx)).await {
        Ok(Ok(mined)) => Ok(mined),
        Ok(Err(e)) => {
            error!("transaction intake failed: {e}");
            Err(HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())))
        }
        Err(e) => {
            error!("intake worker failed: {e}");
            Err(HttpResponse::InternalServerError().json(ErrorResponse::new("intake failed")))
        }
    }
}
