use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use donation_ledger::config::NodeConfig;
use donation_ledger::state::AppState;
use donation_ledger::{api, network};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();
    let (host, port) = (config.host.clone(), config.port);
    info!(
        "starting ledger node at http://{host}:{port} (difficulty {}, block size {})",
        config.difficulty, config.block_size
    );

    let state = Arc::new(AppState::new(config));
    network::tasks::spawn_auto_miner(Arc::clone(&state));
    network::tasks::spawn_auto_sync(Arc::clone(&state));

    let data = web::Data::from(state);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
