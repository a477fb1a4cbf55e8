//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    accounts::PositionInfo,
    stocks::{CandleItem, StockTradeItem},
    AccountResponse, BalanceHistoryItem, BalanceResponse, ComponentHealth, CreateAccountRequest,
    CreateAccountResponse, HealthResponse, MoneyRequest, OrderAccepted, OrderBody,
    StockDetailResponse, StockPriceResponse, StockSummaryItem, TradeHistoryItem,
};

/// Paper Trading API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paper Trading API",
        version = "0.1.0",
        description = r#"
# 모의투자 백엔드 REST API

현금 잔고와 종목 포지션을 관리하고, 매수/매도 주문을 처리하며,
WebSocket으로 실시간 업데이트를 제공합니다.

## 실시간 스트림

`GET /ws?room=<key>`로 접속합니다. 방 키:

- `price-{stockId}` - 현재가
- `tx-{stockId}` - 최근 체결 피드
- `graph-{stockId}` - 분 단위 캔들
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::accounts::create_account,
        crate::routes::accounts::get_account,
        crate::routes::accounts::delete_account,
        crate::routes::orders::buy_order,
        crate::routes::orders::sale_order,
        crate::routes::wallet::get_balance,
        crate::routes::wallet::deposit,
        crate::routes::wallet::withdraw,
        crate::routes::wallet::balance_history,
        crate::routes::wallet::trade_history,
        crate::routes::favorites::get_favorites,
        crate::routes::favorites::set_favorite,
        crate::routes::favorites::delete_favorite,
        crate::routes::stocks::list_stocks,
        crate::routes::stocks::get_stock,
        crate::routes::stocks::get_price,
        crate::routes::stocks::get_history,
        crate::routes::stocks::get_graph,
    ),
    components(schemas(
        ApiErrorResponse,
        HealthResponse,
        ComponentHealth,
        CreateAccountRequest,
        CreateAccountResponse,
        AccountResponse,
        PositionInfo,
        OrderBody,
        OrderAccepted,
        BalanceResponse,
        MoneyRequest,
        BalanceHistoryItem,
        TradeHistoryItem,
        StockSummaryItem,
        StockDetailResponse,
        StockPriceResponse,
        StockTradeItem,
        CandleItem,
    )),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "accounts", description = "계좌 관리"),
        (name = "orders", description = "주문 처리"),
        (name = "wallet", description = "입출금 및 내역"),
        (name = "favorites", description = "관심 종목"),
        (name = "stocks", description = "종목 조회"),
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
