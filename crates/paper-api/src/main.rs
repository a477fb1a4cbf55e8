//! 모의투자 API 서버.
//!
//! Axum 기반 REST + WebSocket 서버를 시작합니다. 저장소, 캐시,
//! 브로드캐스트 허브는 모두 여기 컴포지션 루트가 구성해 소유합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use paper_api::routes::create_api_router;
use paper_api::state::AppState;
use paper_api::websocket::{websocket_router, Hub, StockFeed, WsState};
use paper_api::{setup_metrics_recorder, swagger_ui_router};
use paper_core::{init_logging, AppConfig, StockRecord};
use paper_ledger::{LedgerConfig, LedgerOperations, OrderExecutor};
use paper_store::{
    Cache, MemoryAccountStore, MemoryCache, MemoryStockStore, RedisCache, StockStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_default().context("failed to load configuration")?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("{e}"))?;

    let metrics_handle = setup_metrics_recorder();

    // 저장소: 시뮬레이션 서버이므로 인메모리 저장소를 사용한다
    let accounts = Arc::new(MemoryAccountStore::new());
    let stocks: Arc<dyn StockStore> = Arc::new(MemoryStockStore::new());
    seed_stocks(stocks.as_ref()).await?;

    // 캐시: Redis 연결 실패 시 인메모리로 대체 (캐시는 조언적)
    let cache: Arc<dyn Cache> = match RedisCache::connect(&config.redis).await {
        Ok(cache) => {
            info!("Redis 캐시 연결 성공");
            Arc::new(cache)
        }
        Err(e) => {
            warn!(error = %e, "Redis 연결 실패, 인메모리 캐시로 계속합니다");
            Arc::new(MemoryCache::new())
        }
    };

    let ledger = Arc::new(LedgerOperations::new(
        accounts.clone(),
        cache.clone(),
        LedgerConfig::from_app(&config),
    ));
    let executor = Arc::new(OrderExecutor::new(
        accounts.clone(),
        stocks.clone(),
        cache.clone(),
    ));

    // 허브는 컴포지션 루트가 소유하고, 핸들만 엔드포인트에 전달한다
    let (hub, hub_handle) = Hub::new();
    let shutdown = CancellationToken::new();
    let hub_task = tokio::spawn(hub.run(shutdown.clone()));

    let state = Arc::new(AppState::new(
        ledger,
        executor,
        stocks.clone(),
        cache,
        hub_handle.clone(),
    ));
    let ws_state = WsState::new(
        hub_handle,
        Arc::new(StockFeed::new(stocks)),
        config.stream.clone(),
    );

    let app = Router::new()
        .merge(create_api_router().with_state(state))
        .nest("/ws", websocket_router(ws_state))
        .merge(swagger_ui_router())
        .route("/metrics", get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server address")?;
    info!(%addr, "Paper trading server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("server error")?;

    // 허브 제어 루프까지 내려서 종료
    shutdown.cancel();
    let _ = hub_task.await;
    info!("Server stopped");

    Ok(())
}

/// ctrl-c를 기다렸다가 허브 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
    shutdown.cancel();
}

/// 데모 종목 시드.
async fn seed_stocks(stocks: &dyn StockStore) -> anyhow::Result<()> {
    let seeds = [
        ("aapl", "Apple Inc.", "AAPL", 182),
        ("tsla", "Tesla Inc.", "TSLA", 248),
        ("nvda", "NVIDIA Corp.", "NVDA", 131),
        ("amzn", "Amazon.com Inc.", "AMZN", 186),
    ];

    for (stock_id, name, sign, price) in seeds {
        stocks
            .create_stock(StockRecord {
                stock_id: stock_id.to_string(),
                name: name.to_string(),
                sign: sign.to_string(),
                image: None,
                price: Decimal::from(price as u32),
                created_at: Utc::now(),
                history: Vec::new(),
            })
            .await?;
    }

    info!(count = seeds.len(), "demo stocks seeded");
    Ok(())
}
