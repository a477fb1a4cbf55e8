//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/accounts` - 계좌 생성/조회/삭제
//! - `/api/v1/orders` - 매수/매도 주문
//! - `/api/v1/wallet` - 입출금, 잔고, 내역
//! - `/api/v1/favorites` - 관심 종목
//! - `/api/v1/stocks` - 종목 목록/현재가/체결/캔들

pub mod accounts;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod stocks;
pub mod wallet;

pub use accounts::{accounts_router, AccountResponse, CreateAccountRequest, CreateAccountResponse};
pub use favorites::favorites_router;
pub use health::{health_router, ComponentHealth, HealthResponse};
pub use orders::{orders_router, OrderAccepted, OrderBody};
pub use stocks::{stocks_router, StockDetailResponse, StockPriceResponse, StockSummaryItem};
pub use wallet::{wallet_router, BalanceHistoryItem, BalanceResponse, MoneyRequest, TradeHistoryItem};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/accounts", accounts_router())
        .nest("/api/v1/orders", orders_router())
        .nest("/api/v1/wallet", wallet_router())
        .nest("/api/v1/favorites", favorites_router())
        .nest("/api/v1/stocks", stocks_router())
}
