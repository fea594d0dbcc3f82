use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{ChainResponse, ErrorResponse, MineResponse, ValidateResponse};
use crate::error::ChainError;
use crate::state::AppState;

/// Get the full blockchain in transport form. Also serves peer fetches.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.read().expect("chain lock poisoned");
    HttpResponse::Ok().json(ChainResponse {
        chain: chain.to_records(),
        length: chain.len(),
    })
}

/// Validate the whole chain.
#[get("/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.chain.read().expect("chain lock poisoned");
    let verdict = chain.validate();
    HttpResponse::Ok().json(ValidateResponse {
        valid: verdict.is_ok(),
        length: chain.len(),
        difficulty: chain.difficulty(),
        error: verdict.err().map(|e| e.to_string()),
    })
}

/// Seal all pending transactions into a block and notify peers.
#[post("/mine")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let miner = state.clone().into_inner();
    match web::block(move || miner.mine_pending()).await {
        Ok(Ok(block)) => {
            info!("manual mine sealed block #{}", block.index);
            state.announce_block().await;
            HttpResponse::Ok().json(MineResponse {
                message: "block mined".to_string(),
                block: block.to_record(),
            })
        }
        Ok(Err(e @ ChainError::EmptyMempool)) => {
            HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()))
        }
        Ok(Err(e @ ChainError::StaleTip { .. })) => {
            HttpResponse::Conflict().json(ErrorResponse::new(e.to_string()))
        }
        Ok(Err(e)) => {
            error!("mining failed: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
        Err(e) => {
            error!("mining worker failed: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("mining failed"))
        }
    }
}
