use actix_web::{HttpResponse, Responder, get, web};

use super::models::HealthResponse;
use crate::state::AppState;

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let blocks = state.chain.read().expect("chain lock poisoned").len();
    let pending_transactions = state.mempool.lock().expect("mempool lock poisoned").size();
    HttpResponse::Ok().json(HealthResponse {
        status: "running",
        blocks,
        pending_transactions,
    })
}
