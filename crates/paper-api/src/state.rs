//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 컴포지션 루트가 한 번 구성하고 Arc로 래핑되어 모든 API
//! 핸들러에 주입됩니다. 허브를 포함해 전역 가변 상태는 없습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use paper_ledger::{LedgerOperations, OrderExecutor};
use paper_store::{Cache, StockStore};

use crate::websocket::HubHandle;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 원장 작업 - 입출금, 관심 종목, cache-aside 조회
    pub ledger: Arc<LedgerOperations>,

    /// 주문 실행기 - 매수/매도 검증 및 체결
    pub executor: Arc<OrderExecutor>,

    /// 종목 저장소 - 종목 목록/현재가/체결 내역 조회
    pub stocks: Arc<dyn StockStore>,

    /// 캐시 백엔드 (헬스 체크용)
    pub cache: Arc<dyn Cache>,

    /// 브로드캐스트 허브 핸들
    pub hub: HubHandle,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(
        ledger: Arc<LedgerOperations>,
        executor: Arc<OrderExecutor>,
        stocks: Arc<dyn StockStore>,
        cache: Arc<dyn Cache>,
        hub: HubHandle,
    ) -> Self {
        Self {
            ledger,
            executor,
            stocks,
            cache,
            hub,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 캐시 연결 상태 확인.
    pub async fn is_cache_healthy(&self) -> bool {
        self.cache.health_check().await.unwrap_or(false)
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 저장소와 캐시로 상태를 구성하고 허브 루프를 띄웁니다.
#[cfg(test)]
pub(crate) async fn create_test_state() -> Arc<AppState> {
    use paper_core::{NewAccount, StockRecord};
    use paper_ledger::LedgerConfig;
    use paper_store::{AccountStore, MemoryAccountStore, MemoryCache, MemoryStockStore};
    use rust_decimal_macros::dec;
    use tokio_util::sync::CancellationToken;

    use crate::websocket::Hub;

    let accounts = Arc::new(MemoryAccountStore::new());
    let stocks = Arc::new(MemoryStockStore::new());
    let cache = Arc::new(MemoryCache::new());

    accounts
        .create(NewAccount {
            user_id: "u-1".to_string(),
            name: "tester".to_string(),
            email: "tester@example.com".to_string(),
            profile_image: None,
        })
        .await
        .unwrap();
    stocks
        .create_stock(StockRecord {
            stock_id: "AAPL".to_string(),
            name: "Apple".to_string(),
            sign: "AAPL".to_string(),
            image: None,
            price: dec!(180),
            created_at: Utc::now(),
            history: Vec::new(),
        })
        .await
        .unwrap();

    let ledger = Arc::new(LedgerOperations::new(
        accounts.clone(),
        cache.clone(),
        LedgerConfig::default(),
    ));
    let executor = Arc::new(OrderExecutor::new(
        accounts.clone(),
        stocks.clone(),
        cache.clone(),
    ));

    let (hub, handle) = Hub::new();
    tokio::spawn(hub.run(CancellationToken::new()));

    Arc::new(AppState::new(ledger, executor, stocks, cache, handle))
}
