mod chain;
mod health;
pub mod models;
mod nodes;
mod stats;
mod tx;

use actix_web::web::ServiceConfig;

/// Routes live at the root: peers call `/chain`, `/transactions/receive`,
/// `/blocks/receive` and `/nodes/register` on each other.
pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_chain)
        .service(chain::validate_chain)
        .service(chain::mine_block)
        .service(tx::new_transaction)
        .service(tx::receive_transaction)
        .service(tx::get_mempool)
        .service(stats::get_organizations)
        .service(stats::get_stats)
        .service(nodes::register_node)
        .service(nodes::list_nodes)
        .service(nodes::consensus)
        .service(nodes::receive_block);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::dev::ServerHandle;
    use actix_web::{App, HttpServer, http::StatusCode, rt, test, web};
    use serde_json::{Value, json};

    use super::init_routes;
    use super::models::ChainResponse;
    use crate::blockchain::now_secs;
    use crate::config::NodeConfig;
    use crate::network::tasks;
    use crate::state::{AppState, test_config};
    use crate::transaction::Transaction;

    fn node(difficulty: u32, block_size: usize) -> web::Data<AppState> {
        web::Data::new(AppState::new(test_config(difficulty, block_size)))
    }

    /// Serve `state` on an ephemeral port so other nodes can reach it.
    fn spawn_peer(state: web::Data<AppState>) -> (String, ServerHandle) {
        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(init_routes))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("bind ephemeral port");
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        rt::spawn(server);
        (format!("http://{addr}"), handle)
    }

    /// A node whose chain is `extra` blocks past genesis.
    fn longer_chain(extra: usize) -> web::Data<AppState> {
        let state = node(1, 5);
        {
            let mut chain = state.chain.write().unwrap();
            for i in 0..extra {
                chain
                    .append_mined(vec![Transaction::new("Bob", "WWF", i as f64)])
                    .unwrap();
            }
        }
        state
    }

    /// Poll until the chain reaches `length`, giving up after about 5s.
    async fn wait_for_length(state: &AppState, length: usize) -> bool {
        for _ in 0..100 {
            if state.chain.read().unwrap().len() == length {
                return true;
            }
            rt::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    fn donation(recipient: &str, amount: f64) -> Value {
        json!({ "sender": "Alice", "recipient": recipient, "amount": amount })
    }

    #[actix_web::test]
    async fn health_reports_genesis_only() {
        let app = test::init_service(App::new().app_data(node(1, 5)).configure(init_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["blocks"], 1);
        assert_eq!(body["pending_transactions"], 0);
    }

    #[actix_web::test]
    async fn unknown_organization_is_rejected() {
        let state = node(1, 5);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(donation("Some Shell Company", 10.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.mempool.lock().unwrap().size(), 0);
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected() {
        let app = test::init_service(App::new().app_data(node(1, 5)).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({ "sender": "Alice", "recipient": "WWF" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_web::test]
    async fn reaching_block_size_mines() {
        let state = node(1, 2);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(donation("WWF", 30.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["mempool_size"], 1);
        assert!(body.get("mined_block").is_none());

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(donation("UNICEF", 75.0))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mined_block"], 1);
        assert_eq!(body["mempool_size"], 0);
        assert_eq!(state.chain.read().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn manual_mine() {
        let state = node(1, 5);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post().uri("/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/transactions/receive")
            .set_json(donation("Greenpeace", 25.0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri("/mine").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["block"]["index"], 1);
        assert_eq!(body["block"]["transactions"][0]["amount"], 25.0);

        let req = test::TestRequest::get().uri("/validate").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["length"], 2);
    }

    #[actix_web::test]
    async fn stats_skip_genesis_and_sum_per_org() {
        let state = node(0, 2);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;
        for (org, amount) in [("WWF", 10.0), ("WWF", 5.5), ("UNICEF", 4.5)] {
            let req = test::TestRequest::post()
                .uri("/transactions/new")
                .set_json(donation(org, amount))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        // Two were sealed, one is still pending.
        assert_eq!(body["total_blocks"], 2);
        assert_eq!(body["pending_transactions"], 1);
        assert_eq!(body["total_donations"], 15.5);
        assert_eq!(body["donations_per_organization"]["WWF"], 15.5);
        assert_eq!(body["donations_per_organization"]["UNICEF"], 0.0);
        assert_eq!(body["chain_valid"], true);
    }

    #[actix_web::test]
    async fn peer_registration_is_idempotent() {
        let app = test::init_service(App::new().app_data(node(0, 5)).configure(init_routes)).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/nodes/register")
                .set_json(json!({ "node_address": "http://10.0.0.7:5000" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["total_peers"], 1);
        }

        let req = test::TestRequest::post()
            .uri("/nodes/register")
            .set_json(json!({ "node_address": "  " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/nodes/list").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["peers"][0], "http://10.0.0.7:5000");
    }

    #[actix_web::test]
    async fn consensus_adopts_longer_peer_chain_and_skips_dead_peers() {
        let long = longer_chain(4);
        let sealed = long.chain.read().unwrap().blocks[2].transactions[0].clone();
        let (peer_url, handle) = spawn_peer(long.clone());

        let short = node(1, 5);
        short.mempool.lock().unwrap().add(sealed);
        short.mempool.lock().unwrap().add(Transaction::new("Carol", "UNICEF", 9.0));
        short.register_peer("http://127.0.0.1:9");
        short.register_peer(&peer_url);
        let app = test::init_service(App::new().app_data(short.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post().uri("/consensus").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["replaced"], true);
        assert_eq!(body["length"], 5);
        assert_eq!(
            short.chain.read().unwrap().blocks,
            long.chain.read().unwrap().blocks
        );
        // The already-sealed transaction left the mempool; Carol's stayed.
        let pending: Vec<String> = short.mempool.lock().unwrap().iter().map(|t| t.sender.clone()).collect();
        assert_eq!(pending, vec!["Carol"]);

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn transactions_gossip_with_original_timestamp() {
        let remote = node(0, 5);
        let (peer_url, handle) = spawn_peer(remote.clone());

        let local = node(0, 5);
        local.register_peer(&peer_url);
        let app = test::init_service(App::new().app_data(local.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(donation("Ärzte ohne Grenzen", 100.0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let sent = local.mempool.lock().unwrap().peek_oldest().cloned().unwrap();
        let received = remote.mempool.lock().unwrap().peek_oldest().cloned().unwrap();
        assert_eq!(sent, received);
        assert_eq!(local.mempool.lock().unwrap().size(), 1);

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn chain_endpoint_serves_transport_records() {
        let app = test::init_service(App::new().app_data(node(1, 5)).configure(init_routes)).await;
        let req = test::TestRequest::get().uri("/chain").to_request();
        let body: ChainResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.length, 1);
        assert_eq!(body.chain[0]["previous_hash"], "0");
        assert!(body.chain[0]["hash"].as_str().unwrap().starts_with('0'));
    }

    #[actix_web::test]
    async fn fan_out_skips_dead_peer_and_reaches_live_one() {
        let remote = node(0, 5);
        let (peer_url, handle) = spawn_peer(remote.clone());

        let local = node(0, 5);
        local.register_peer("http://127.0.0.1:9");
        local.register_peer(&peer_url);

        let tx = Transaction::new("Dana", "Rotes Kreuz", 42.0);
        assert_eq!(local.broadcast_transaction(&tx).await, 1);
        assert_eq!(remote.mempool.lock().unwrap().peek_oldest(), Some(&tx));
        assert_eq!(local.announce_block().await, 1);

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn block_notice_replies_before_consensus_completes() {
        let long = longer_chain(3);
        let (peer_url, handle) = spawn_peer(long.clone());

        let state = node(1, 5);
        state.register_peer(&peer_url);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/blocks/receive")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        assert!(wait_for_length(&state, 4).await);
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn auto_sync_adopts_longer_peer_chain() {
        let long = longer_chain(2);
        let (peer_url, handle) = spawn_peer(long.clone());

        let state = Arc::new(AppState::new(NodeConfig {
            sync_interval: Duration::from_millis(50),
            ..test_config(1, 5)
        }));
        state.register_peer(&peer_url);
        let task = tasks::spawn_auto_sync(Arc::clone(&state));

        assert!(wait_for_length(&state, 3).await);
        task.abort();
        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn auto_miner_seals_aged_transactions() {
        let state = Arc::new(AppState::new(NodeConfig {
            auto_mine_interval: Duration::from_millis(50),
            auto_mine_age: Duration::from_secs(120),
            ..test_config(1, 5)
        }));
        let old = Transaction::with_timestamp("Old", "WWF", 7.0, now_secs() - 600.0);
        state.mempool.lock().unwrap().add(old.clone());
        let task = tasks::spawn_auto_miner(Arc::clone(&state));

        assert!(wait_for_length(&state, 2).await);
        task.abort();
        assert_eq!(state.chain.read().unwrap().blocks[1].transactions, vec![old]);
        assert!(state.mempool.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn block_notice_without_peers_is_harmless() {
        let state = node(0, 5);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/blocks/receive")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(state.chain.read().unwrap().len(), 1);
    }
}
